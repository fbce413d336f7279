use std::path::{Component, Path};

use anyhow::Context;

use qls_core::lint::{self, Severity};
use qls_core::{query, scope};

/// One-shot analysis mode: `qls-lsp --analyze [--errors-only] <file>` prints
/// a report and exits instead of starting the server. Returns `Ok(None)` when
/// no analysis was requested.
pub(crate) fn try_cli_analyze() -> anyhow::Result<Option<String>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() <= 1 {
        return Ok(None);
    }

    let Some(i) = args.iter().position(|a| a == "--analyze") else {
        return Ok(None);
    };

    let mut path_index = i + 1;
    while path_index < args.len() && args[path_index].starts_with("--") {
        path_index += 1;
    }

    let path = args.get(path_index).cloned().ok_or_else(|| {
        anyhow::anyhow!("Usage: qls-lsp --analyze [--errors-only] <relative-file-path>")
    })?;

    let errors_only = args.iter().any(|a| a == "--errors-only");
    let content = read_file_content(&path)?;

    let tokens = scope::analyze(&content);
    let diagnostics = lint::run(&tokens);

    if errors_only {
        let errors: Vec<String> = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| format!("Line {}: {}", d.span, d.message))
            .collect();
        if errors.is_empty() {
            return Ok(Some("No errors found".to_string()));
        }
        return Ok(Some(errors.join("\n")));
    }

    let output = serde_json::json!({
        "diagnostics": diagnostics,
        "outline": query::outline(&tokens),
    });
    Ok(Some(serde_json::to_string_pretty(&output)?))
}

pub(crate) fn is_safe_path(path: &str) -> bool {
    let path = Path::new(path);

    if path.as_os_str().is_empty() {
        return false;
    }
    if path.is_absolute() {
        return false;
    }
    if path.components().any(|c| c == Component::ParentDir) {
        return false;
    }

    let s = path.to_string_lossy();
    if s.chars().any(|c| matches!(c, '\0' | '\n' | '\r' | '\t')) {
        return false;
    }
    // Windows drive prefixes are not relative paths either.
    if s.as_bytes().get(1) == Some(&b':') {
        return false;
    }
    true
}

pub(crate) fn read_file_content(path: &str) -> anyhow::Result<String> {
    if !is_safe_path(path) {
        return Err(anyhow::anyhow!("Unsafe file path: {}", path));
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path))
}

#[cfg(test)]
mod tests {
    use super::is_safe_path;

    #[test]
    fn safe_paths() {
        assert!(is_safe_path("scripts/load.q"));
        assert!(!is_safe_path(""));
        assert!(!is_safe_path("/etc/passwd"));
        assert!(!is_safe_path("../outside.q"));
        assert!(!is_safe_path("C:file.q"));
    }
}
