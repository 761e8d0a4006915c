//! Shader source composition.
//!
//! Stage sources are referenced by path relative to a shader root. The
//! composer resolves `#include` directives, then prepends the `#version`
//! header, a define for the stage and any registered defines, so a single
//! file can serve several stages through `#ifdef VERTEX` / `#ifdef FRAGMENT`.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::backend::ShaderStage;
use crate::error::ShaderError;

/// A composed stage source ready for compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub stage: ShaderStage,
    pub source: String,
    /// Where the source came from, for diagnostics
    pub origin: String,
}

impl ShaderSource {
    pub fn new(stage: ShaderStage, source: impl Into<String>) -> Self {
        Self {
            stage,
            source: source.into(),
            origin: format!("<inline {}>", stage),
        }
    }

    pub fn vertex(source: impl Into<String>) -> Self {
        Self::new(ShaderStage::Vertex, source)
    }

    pub fn fragment(source: impl Into<String>) -> Self {
        Self::new(ShaderStage::Fragment, source)
    }

    pub fn geometry(source: impl Into<String>) -> Self {
        Self::new(ShaderStage::Geometry, source)
    }

    pub fn tess_control(source: impl Into<String>) -> Self {
        Self::new(ShaderStage::TessControl, source)
    }

    pub fn tess_evaluation(source: impl Into<String>) -> Self {
        Self::new(ShaderStage::TessEvaluation, source)
    }
}

/// Shader definition value for compile-time conditionals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderDef {
    /// Boolean definition (`#ifdef`, `#ifndef`).
    Bool(bool),
    /// Integer definition (`#if VAR == 5`).
    Int(i32),
    /// Unsigned integer definition.
    UInt(u32),
}

impl From<bool> for ShaderDef {
    fn from(v: bool) -> Self {
        ShaderDef::Bool(v)
    }
}

impl From<i32> for ShaderDef {
    fn from(v: i32) -> Self {
        ShaderDef::Int(v)
    }
}

impl From<u32> for ShaderDef {
    fn from(v: u32) -> Self {
        ShaderDef::UInt(v)
    }
}

/// Loads and composes stage sources.
#[derive(Debug, Clone)]
pub struct ShaderComposer {
    /// Directory stage identifiers and file includes are resolved against.
    pub root: PathBuf,
    /// Header placed on the first line, e.g. `#version 330 core`.
    pub version: Option<String>,
    /// Registered include sources: path -> source text.
    includes: HashMap<String, String>,
    defines: Vec<(String, ShaderDef)>,
}

impl Default for ShaderComposer {
    fn default() -> Self {
        Self::new("shaders")
    }
}

impl ShaderComposer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            version: None,
            includes: HashMap::new(),
            defines: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Register a single include source.
    ///
    /// The path is what appears in `#include "path"` directives. Registered
    /// includes take precedence over files under the root.
    pub fn register_include(&mut self, path: &str, source: &str) {
        self.includes.insert(path.to_string(), source.to_string());
    }

    /// Define a symbol for every composed stage. `Bool(false)` leaves it undefined.
    pub fn define(&mut self, name: &str, def: impl Into<ShaderDef>) {
        let def = def.into();
        match self.defines.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = def,
            None => self.defines.push((name.to_string(), def)),
        }
    }

    /// Load a stage source relative to the root and compose it.
    pub fn load(&self, path: &str, stage: ShaderStage) -> Result<ShaderSource, ShaderError> {
        let full = self.root.join(path);
        let text = read_source(&full)?;
        log::debug!("Loaded {} shader {}", stage, full.display());
        Ok(ShaderSource {
            stage,
            source: self.compose(&text, stage)?,
            origin: path.to_string(),
        })
    }

    /// Compose an in-memory stage source.
    pub fn compose(&self, source: &str, stage: ShaderStage) -> Result<String, ShaderError> {
        let mut included = HashSet::new();
        let resolved = self.resolve_includes(source, &mut included)?;

        let (version, body) = split_version(&resolved, self.version.as_deref());

        let mut out = String::with_capacity(body.len() + 128);
        if let Some(version) = version {
            out.push_str(version);
            out.push('\n');
        }
        for (name, value) in self.build_defines(stage) {
            if value.is_empty() {
                out.push_str(&format!("#define {}\n", name));
            } else {
                out.push_str(&format!("#define {} {}\n", name, value));
            }
        }
        out.push_str(body);
        Ok(out)
    }

    /// The stage define followed by the registered defines.
    pub fn build_defines(&self, stage: ShaderStage) -> Vec<(String, String)> {
        let mut defines = vec![(stage.define().to_string(), String::new())];
        for (name, def) in &self.defines {
            match def {
                ShaderDef::Bool(true) => defines.push((name.clone(), String::new())),
                ShaderDef::Bool(false) => {}
                ShaderDef::Int(v) => defines.push((name.clone(), v.to_string())),
                ShaderDef::UInt(v) => defines.push((name.clone(), v.to_string())),
            }
        }
        defines
    }

    /// Resolve `#include "path"` directives recursively.
    fn resolve_includes(
        &self,
        source: &str,
        included: &mut HashSet<String>,
    ) -> Result<String, ShaderError> {
        let mut result = String::with_capacity(source.len());

        for line in source.lines() {
            let Some(path) = parse_include_directive(line.trim()) else {
                result.push_str(line);
                result.push('\n');
                continue;
            };

            // Skip if already included (prevent double-inclusion)
            if !included.insert(path.to_string()) {
                continue;
            }

            let text = match self.includes.get(path) {
                Some(text) => text.clone(),
                None => {
                    let full = self.root.join(path);
                    if !full.is_file() {
                        return Err(ShaderError::IncludeNotFound(path.to_string()));
                    }
                    read_source(&full)?
                }
            };
            result.push_str(&self.resolve_includes(&text, included)?);
            result.push('\n');
        }

        Ok(result)
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|e| ShaderError::SourceUnreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Separate an existing `#version` line from the body. A configured header
/// wins over the one found in the source.
fn split_version<'a>(source: &'a str, configured: Option<&'a str>) -> (Option<&'a str>, &'a str) {
    let trimmed = source.trim_start();
    let (found, body) = if trimmed.starts_with("#version") {
        match trimmed.split_once('\n') {
            Some((line, rest)) => (Some(line.trim_end()), rest),
            None => (Some(trimmed.trim_end()), ""),
        }
    } else {
        (None, source)
    };
    (configured.or(found), body)
}

/// Parse a `#include "path"` directive, returning the path if found.
fn parse_include_directive(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("#include")?;
    let rest = rest.trim();
    // Support both #include "path" and #include <path>
    if let Some(inner) = rest.strip_prefix('"') {
        inner.strip_suffix('"')
    } else if let Some(inner) = rest.strip_prefix('<') {
        inner.strip_suffix('>')
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_resolution() {
        let mut composer = ShaderComposer::new("unused");
        composer.register_include(
            "common/math.glsl",
            "float saturate(float x) { return clamp(x, 0.0, 1.0); }",
        );

        let source = "#version 330 core\n#include \"common/math.glsl\"\nvoid main() {}\n";
        let composed = composer.compose(source, ShaderStage::Fragment).unwrap();

        assert!(composed.starts_with("#version 330 core\n#define FRAGMENT\n"));
        assert!(composed.contains("float saturate"));
        assert!(!composed.contains("#include"));
    }

    #[test]
    fn test_double_include_is_skipped() {
        let mut composer = ShaderComposer::new("unused");
        composer.register_include("a.glsl", "#include \"b.glsl\"\nfloat a;");
        composer.register_include("b.glsl", "float b;");

        let composed = composer
            .compose("#include \"a.glsl\"\n#include \"b.glsl\"\n", ShaderStage::Vertex)
            .unwrap();
        assert_eq!(composed.matches("float b;").count(), 1);
    }

    #[test]
    fn test_missing_include() {
        let composer = ShaderComposer::new("does/not/exist");
        let err = composer
            .compose("#include <nowhere.glsl>\n", ShaderStage::Vertex)
            .unwrap_err();
        assert_eq!(err, ShaderError::IncludeNotFound("nowhere.glsl".to_string()));
    }

    #[test]
    fn test_defines_and_configured_version() {
        let mut composer = ShaderComposer::new("unused").with_version("#version 410 core");
        composer.define("MAX_LIGHTS", 8);
        composer.define("USE_SHADOWS", true);
        composer.define("USE_FOG", false);

        let composed = composer
            .compose("#version 330\nvoid main() {}\n", ShaderStage::Vertex)
            .unwrap();
        let lines: Vec<_> = composed.lines().take(4).collect();
        assert_eq!(
            lines,
            vec![
                "#version 410 core",
                "#define VERTEX",
                "#define MAX_LIGHTS 8",
                "#define USE_SHADOWS",
            ]
        );
        assert!(!composed.contains("USE_FOG"));
    }

    #[test]
    fn test_parse_include_directive() {
        assert_eq!(parse_include_directive("#include \"a/b.glsl\""), Some("a/b.glsl"));
        assert_eq!(parse_include_directive("#include <c.glsl>"), Some("c.glsl"));
        assert_eq!(parse_include_directive("#include c.glsl"), None);
        assert_eq!(parse_include_directive("#define X"), None);
    }
}
