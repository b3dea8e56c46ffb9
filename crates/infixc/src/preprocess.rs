//! Line-oriented `#include` preprocessor, run once over raw source text
//! before tokenization.
//!
//! Unlike the brace/comma/semicolon tokenizer this is pure text
//! substitution: no macro parameters, no conditional compilation --
//! deliberately simpler than a module system.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use infix_common::Diagnostic;

#[derive(Debug, Clone)]
pub struct IncludeError {
    pub kind: IncludeErrorKind,
    pub row: u32,
}

#[derive(Debug, Clone)]
pub enum IncludeErrorKind {
    NotFound { path: String },
    Cycle { path: String },
}

impl fmt::Display for IncludeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IncludeErrorKind::NotFound { path } => write!(f, "include file not found: {path}"),
            IncludeErrorKind::Cycle { path } => write!(f, "include cycle detected at {path}"),
        }
    }
}

impl std::error::Error for IncludeError {}

impl Diagnostic for IncludeError {
    fn row(&self) -> u32 {
        self.row
    }
    fn col(&self) -> u32 {
        1
    }
    fn code(&self) -> &'static str {
        "E0401"
    }
}

/// The implicit `std.ifx` prologue every entry file is prepended with.
/// Shipped inside the compiler binary rather than resolved from
/// `include_dir`, so a fresh project needs no local copy of it.
pub const STD_PRELUDE: &str = include_str!("../include/std.ifx");

/// Preprocess the entry file: prepend the implicit `std.ifx` prologue,
/// then expand every `#include <path>` line, recursively, resolving
/// each path against `include_dir`.
pub fn preprocess(entry: &Path, include_dir: &Path) -> Result<String, IncludeError> {
    let mut visiting = HashSet::new();
    let body = expand_file(entry, include_dir, &mut visiting)?;
    Ok(format!("{STD_PRELUDE}\n{body}"))
}

fn expand_file(path: &Path, include_dir: &Path, visiting: &mut HashSet<PathBuf>) -> Result<String, IncludeError> {
    let source = std::fs::read_to_string(path)
        .map_err(|_| IncludeError { kind: IncludeErrorKind::NotFound { path: path.display().to_string() }, row: 0 })?;
    let canonical = path.canonicalize().expect("just read this file, so it exists");

    if !visiting.insert(canonical.clone()) {
        return Err(IncludeError { kind: IncludeErrorKind::Cycle { path: path.display().to_string() }, row: 0 });
    }

    let mut out = String::with_capacity(source.len());
    for (i, line) in source.lines().enumerate() {
        let row = (i + 1) as u32;
        match line.trim_start().strip_prefix("#include ") {
            Some(rest) => {
                let included = parse_include_target(rest, row)?;
                let included_path = include_dir.join(included);
                if !included_path.exists() {
                    visiting.remove(&canonical);
                    return Err(IncludeError {
                        kind: IncludeErrorKind::NotFound { path: included_path.display().to_string() },
                        row,
                    });
                }
                let expanded = expand_file(&included_path, include_dir, visiting)?;
                out.push_str(&expanded);
                out.push('\n');
            }
            None => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    visiting.remove(&canonical);
    Ok(out)
}

fn parse_include_target(rest: &str, row: u32) -> Result<&str, IncludeError> {
    let rest = rest.trim();
    let inner = rest
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .ok_or_else(|| IncludeError { kind: IncludeErrorKind::NotFound { path: rest.to_string() }, row })?;
    Ok(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn expands_a_single_include_and_keeps_the_implicit_prelude() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "helper.ifx", "y is i32;\n");
        let entry = write_file(dir.path(), "main.ifx", "#include <helper.ifx>\nprint(1);\n");

        let out = preprocess(&entry, dir.path()).unwrap();
        assert!(out.contains("extern(printf"));
        assert!(out.contains("y is i32;"));
        assert!(out.contains("print(1);"));
    }

    #[test]
    fn detects_a_self_include_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let entry = write_file(dir.path(), "main.ifx", "#include <main.ifx>\n");

        let err = preprocess(&entry, dir.path()).unwrap_err();
        assert!(matches!(err.kind, IncludeErrorKind::Cycle { .. }));
    }

    #[test]
    fn missing_include_is_reported_with_its_row() {
        let dir = tempfile::tempdir().unwrap();
        let entry = write_file(dir.path(), "main.ifx", "x is i32;\n#include <missing.ifx>\n");

        let err = preprocess(&entry, dir.path()).unwrap_err();
        assert!(matches!(err.kind, IncludeErrorKind::NotFound { .. }));
    }
}
