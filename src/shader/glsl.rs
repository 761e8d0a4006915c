//! Global declaration scanner for GLSL sources.
//!
//! Finds `uniform`, `in` and `out` declarations at file scope together with
//! their `layout(location = N)` qualifiers. Function bodies, interface blocks
//! and structs are skipped. Integer `#define`s are substituted into array
//! sizes and locations; every other preprocessor line is ignored.

use std::collections::HashMap;

/// Storage qualifier of a global declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Uniform,
    In,
    Out,
}

/// A single declared variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub storage: Storage,
    /// Type keyword as written (`vec4`, `sampler2D`, a struct name, ...)
    pub ty: String,
    pub name: String,
    /// Element count, 1 for non-arrays
    pub array_len: u32,
    /// Explicit `layout(location = N)`
    pub location: Option<u32>,
}

const SKIPPED_QUALIFIERS: &[&str] = &[
    "flat",
    "smooth",
    "noperspective",
    "centroid",
    "sample",
    "patch",
    "invariant",
    "precise",
    "highp",
    "mediump",
    "lowp",
    "readonly",
    "writeonly",
    "coherent",
    "volatile",
    "restrict",
];

/// Scan a stage source for its global declarations, in source order.
pub fn scan(source: &str) -> Vec<Declaration> {
    let (code, defines) = strip(source);
    let tokens = tokenize(&code);

    let mut declarations = Vec::new();
    let mut statement: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            ";" => {
                parse_statement(&statement, &defines, &mut declarations);
                statement.clear();
            }
            "{" => {
                i = skip_braces(&tokens, i);
                // A function definition ends at its closing brace, a block or
                // struct at the following semicolon.
                if !statement.contains(&"(") {
                    while i < tokens.len() && tokens[i] != ";" {
                        i += 1;
                    }
                }
                statement.clear();
            }
            token => statement.push(token),
        }
        i += 1;
    }
    declarations
}

/// Index of the brace closing the one opened at `open`.
fn skip_braces(tokens: &[&str], open: usize) -> usize {
    let mut depth = 0usize;
    let mut i = open;
    while i < tokens.len() {
        match tokens[i] {
            "{" => depth += 1,
            "}" => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
        i += 1;
    }
    i
}

fn parse_statement(tokens: &[&str], defines: &HashMap<String, u32>, out: &mut Vec<Declaration>) {
    let mut rest = tokens;
    let mut location = None;

    if rest.first() == Some(&"layout") && rest.get(1) == Some(&"(") {
        let Some(close) = rest.iter().position(|t| *t == ")") else {
            return;
        };
        location = layout_location(&rest[2..close], defines);
        rest = &rest[close + 1..];
    }

    while let Some(first) = rest.first() {
        if SKIPPED_QUALIFIERS.contains(first) {
            rest = &rest[1..];
        } else {
            break;
        }
    }

    let storage = match rest.first() {
        Some(&"uniform") => Storage::Uniform,
        Some(&"in") | Some(&"attribute") => Storage::In,
        Some(&"out") => Storage::Out,
        _ => return,
    };
    rest = &rest[1..];

    // Qualifiers may also follow the storage keyword
    while let Some(first) = rest.first() {
        if SKIPPED_QUALIFIERS.contains(first) {
            rest = &rest[1..];
        } else {
            break;
        }
    }

    // Prototypes and anything else carrying parentheses are not variables
    if rest.contains(&"(") {
        return;
    }

    let Some((ty, mut rest)) = rest.split_first() else {
        return;
    };

    loop {
        let Some((name, tail)) = rest.split_first() else {
            return;
        };
        if !is_identifier(name) {
            return;
        }
        rest = tail;

        let mut array_len = 1;
        if rest.first() == Some(&"[") {
            array_len = rest
                .get(1)
                .and_then(|size| resolve_int(size, defines))
                .unwrap_or(1);
            match rest.iter().position(|t| *t == "]") {
                Some(close) => rest = &rest[close + 1..],
                None => return,
            }
        }

        out.push(Declaration {
            storage,
            ty: ty.to_string(),
            name: name.to_string(),
            array_len,
            location,
        });

        // Only the first name of a list can carry the explicit location
        location = None;

        match rest.first() {
            Some(&",") => rest = &rest[1..],
            _ => return,
        }
    }
}

fn layout_location(qualifiers: &[&str], defines: &HashMap<String, u32>) -> Option<u32> {
    let index = qualifiers.iter().position(|t| *t == "location")?;
    if qualifiers.get(index + 1) != Some(&"=") {
        return None;
    }
    resolve_int(qualifiers.get(index + 2)?, defines)
}

fn resolve_int(token: &str, defines: &HashMap<String, u32>) -> Option<u32> {
    let digits = token.trim_end_matches(['u', 'U']);
    digits
        .parse()
        .ok()
        .or_else(|| defines.get(token).copied())
}

fn is_identifier(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
}

/// Remove comments and preprocessor lines, collecting integer defines.
fn strip(source: &str) -> (String, HashMap<String, u32>) {
    let mut code = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        code.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                code.push(' ');
            }
            c => code.push(c),
        }
    }

    let mut defines = HashMap::new();
    let mut stripped = String::with_capacity(code.len());
    for line in code.lines() {
        let trimmed = line.trim_start();
        if let Some(directive) = trimmed.strip_prefix('#') {
            let mut parts = directive.split_whitespace();
            if parts.next() == Some("define") {
                if let (Some(name), Some(value)) = (parts.next(), parts.next()) {
                    if let Ok(value) = value.parse() {
                        defines.insert(name.to_string(), value);
                    }
                }
            }
            stripped.push('\n');
            continue;
        }
        stripped.push_str(line);
        stripped.push('\n');
    }
    (stripped, defines)
}

fn tokenize(code: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let bytes = code.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
        } else if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' {
            let start = i;
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
            {
                i += 1;
            }
            tokens.push(&code[start..i]);
        } else {
            // Multi-byte characters only appear in identifiers GLSL rejects anyway
            let len = code[i..].chars().next().map_or(1, char::len_utf8);
            tokens.push(&code[i..i + len]);
            i += len;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(decls: &[Declaration], storage: Storage) -> Vec<&str> {
        decls
            .iter()
            .filter(|d| d.storage == storage)
            .map(|d| d.name.as_str())
            .collect()
    }

    #[test]
    fn test_scan_basic_stage() {
        let src = r#"
            #version 330 core
            layout(location = 0) in vec3 a_position;
            layout (location=2) in vec2 a_uv;
            uniform mat4 u_mvp;
            uniform sampler2D u_albedo;
            out vec2 v_uv;

            void main() {
                vec4 p = u_mvp * vec4(a_position, 1.0);
                gl_Position = p;
            }
        "#;
        let decls = scan(src);
        assert_eq!(names(&decls, Storage::In), vec!["a_position", "a_uv"]);
        assert_eq!(names(&decls, Storage::Uniform), vec!["u_mvp", "u_albedo"]);
        assert_eq!(names(&decls, Storage::Out), vec!["v_uv"]);
        assert_eq!(decls[1].location, Some(2));
        assert_eq!(decls[2].ty, "mat4");
    }

    #[test]
    fn test_scan_skips_comments_blocks_and_prototypes() {
        let src = r#"
            // uniform float commented;
            /* uniform float also_commented; */
            uniform Lights { vec4 position[4]; } lights;
            struct Material { vec3 albedo; float roughness; };
            vec3 shade(in vec3 n, out float k);
            flat in int v_id;
            uniform float u_time;
        "#;
        let decls = scan(src);
        assert_eq!(names(&decls, Storage::Uniform), vec!["u_time"]);
        assert_eq!(names(&decls, Storage::In), vec!["v_id"]);
    }

    #[test]
    fn test_scan_arrays_and_lists() {
        let src = r#"
            #define MAX_LIGHTS 8
            uniform vec4 u_lights[MAX_LIGHTS];
            uniform vec2 u_offsets[3], u_scale;
            layout(location = 1) out vec4 normal;
        "#;
        let decls = scan(src);
        assert_eq!(decls[0].array_len, 8);
        assert_eq!(decls[1].array_len, 3);
        assert_eq!(decls[2].name, "u_scale");
        assert_eq!(decls[2].array_len, 1);
        assert_eq!(decls[3].location, Some(1));
        assert_eq!(decls[3].storage, Storage::Out);
    }
}
