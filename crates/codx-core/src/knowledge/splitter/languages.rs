//! File extension to language resolution.

use std::path::Path;

/// Resolve the language name for a path from its extension.
pub fn language_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension().and_then(|e| e.to_str())?;
    language_for_extension(ext)
}

/// Resolve the language name for a bare extension.
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    let language = match ext.to_lowercase().as_str() {
        "rs" => "rust",
        "py" | "pyi" => "python",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "java" => "java",
        "cs" => "csharp",
        "rb" => "ruby",
        "c" | "h" => "c",
        "cpp" | "cc" | "hpp" | "hh" => "cpp",
        "php" => "php",
        "swift" => "swift",
        "kt" | "kts" => "kotlin",
        "md" | "markdown" => "markdown",
        "html" | "htm" => "html",
        "css" | "scss" | "sass" => "css",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "xml" => "xml",
        "sh" | "bash" | "zsh" => "shell",
        "sql" => "sql",
        "txt" | "text" => "txt",
        _ => return None,
    };
    Some(language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_for_path() {
        assert_eq!(language_for_path(Path::new("src/lib.rs")), Some("rust"));
        assert_eq!(language_for_path(Path::new("app/main.py")), Some("python"));
        assert_eq!(language_for_path(Path::new("README.md")), Some("markdown"));
        assert_eq!(language_for_path(Path::new("Makefile")), None);
        assert_eq!(language_for_path(Path::new("data.unknown")), None);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(language_for_extension("RS"), Some("rust"));
        assert_eq!(language_for_extension("Py"), Some("python"));
    }
}
