//! Mirror filesystem helpers.
//!
//! Path resolution, directory listings and typed file reads for the tree
//! browser. Failures here mean "not browsable", not errors; the handler
//! decides what to render instead.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tokio::fs;

/// Placeholder served when a file cannot be loaded as text.
pub const UNLOADABLE_CONTENT: &str = "print 'I could not load the content'";

/// A file prepared for display.
#[derive(Debug, Clone)]
pub struct FileView {
    pub content: String,
    pub code_type: &'static str,
    pub code_type_script: &'static str,
}

impl FileView {
    /// The canned view for content that could not be loaded.
    pub fn unloadable() -> Self {
        Self {
            content: UNLOADABLE_CONTENT.to_string(),
            code_type: "py",
            code_type_script: "shBrushPython.js",
        }
    }
}

/// A link to a directory entry in the structure view.
#[derive(Debug, Clone, Serialize)]
pub struct EntryLink {
    pub name: String,
    pub url: String,
}

/// Resolve a request path against the mirror root.
///
/// Rejects absolute paths and any `..` component; `None` means the path
/// cannot be served.
pub fn resolve(root: &Path, rel: &str) -> Option<PathBuf> {
    let rel_path = Path::new(rel);
    for component in rel_path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(root.join(rel_path))
}

/// Whether the path is an existing directory.
pub async fn is_directory(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

/// List a directory as sorted directory and file links.
///
/// `base_url` is the browse URL of the directory itself; entry urls extend
/// it, with a trailing slash for subdirectories.
pub async fn directory_structure(
    path: &Path,
    base_url: &str,
) -> std::io::Result<(Vec<EntryLink>, Vec<EntryLink>)> {
    let base = base_url.trim_end_matches('/');
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    let mut entries = fs::read_dir(path).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let url = format!("{}/{}", base, name);
        if entry.file_type().await?.is_dir() {
            dirs.push(EntryLink {
                name,
                url: format!("{}/", url),
            });
        } else {
            files.push(EntryLink { name, url });
        }
    }

    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    files.sort_by(|a, b| a.name.cmp(&b.name));

    Ok((dirs, files))
}

/// Read a file for display, detecting its highlight type.
///
/// `None` for anything that cannot be shown as text: missing paths, common
/// binary types, non-UTF-8 content, I/O failures.
pub async fn read_with_type(path: &Path) -> Option<FileView> {
    if is_binary_mime(path) {
        return None;
    }

    let bytes = fs::read(path).await.ok()?;
    let content = String::from_utf8(bytes).ok()?;
    let (code_type, code_type_script) = highlight_type(path);

    Some(FileView {
        content,
        code_type,
        code_type_script,
    })
}

/// Highlight type and renderer brush for a path, by extension.
pub fn highlight_type(path: &Path) -> (&'static str, &'static str) {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "py" => ("py", "shBrushPython.js"),
        "js" => ("js", "shBrushJScript.js"),
        "java" => ("java", "shBrushJava.js"),
        "c" | "h" => ("c", "shBrushCpp.js"),
        "cpp" | "cc" | "cxx" | "hpp" => ("cpp", "shBrushCpp.js"),
        "cs" => ("csharp", "shBrushCSharp.js"),
        "rb" => ("ruby", "shBrushRuby.js"),
        "php" => ("php", "shBrushPhp.js"),
        "sql" => ("sql", "shBrushSql.js"),
        "sh" | "bash" => ("bash", "shBrushBash.js"),
        "xml" | "html" | "htm" => ("xml", "shBrushXml.js"),
        "css" => ("css", "shBrushCss.js"),
        "pl" | "pm" => ("perl", "shBrushPerl.js"),
        "scala" => ("scala", "shBrushScala.js"),
        "vb" => ("vb", "shBrushVb.js"),
        _ => ("plain", "shBrushPlain.js"),
    }
}

fn is_binary_mime(path: &Path) -> bool {
    use mime_guess::mime;

    mime_guess::from_path(path)
        .first()
        .map(|m| {
            let top = m.type_();
            top == mime::IMAGE || top == mime::AUDIO || top == mime::VIDEO || top == mime::FONT
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_joins_inside_root() {
        let resolved = resolve(Path::new("/mirror"), "src/app.py").unwrap();
        assert_eq!(resolved, PathBuf::from("/mirror/src/app.py"));
    }

    #[test]
    fn test_resolve_empty_is_root() {
        let resolved = resolve(Path::new("/mirror"), "").unwrap();
        assert_eq!(resolved, PathBuf::from("/mirror"));
    }

    #[test]
    fn test_resolve_rejects_parent_components() {
        assert!(resolve(Path::new("/mirror"), "../etc/passwd").is_none());
        assert!(resolve(Path::new("/mirror"), "src/../../etc").is_none());
    }

    #[test]
    fn test_resolve_rejects_absolute_paths() {
        assert!(resolve(Path::new("/mirror"), "/etc/passwd").is_none());
    }

    #[test]
    fn test_highlight_type_table() {
        assert_eq!(highlight_type(Path::new("a.py")), ("py", "shBrushPython.js"));
        assert_eq!(highlight_type(Path::new("a.JS")), ("js", "shBrushJScript.js"));
        assert_eq!(highlight_type(Path::new("a.hpp")), ("cpp", "shBrushCpp.js"));
        assert_eq!(highlight_type(Path::new("Makefile")), ("plain", "shBrushPlain.js"));
    }

    #[tokio::test]
    async fn test_read_with_type_on_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.py");
        tokio::fs::write(&path, "x = 1\n").await.unwrap();

        let view = read_with_type(&path).await.unwrap();
        assert_eq!(view.content, "x = 1\n");
        assert_eq!(view.code_type, "py");
    }

    #[tokio::test]
    async fn test_read_with_type_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_with_type(&dir.path().join("gone.py")).await.is_none());
    }

    #[tokio::test]
    async fn test_read_with_type_skips_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        tokio::fs::write(&path, b"fake png").await.unwrap();

        assert!(read_with_type(&path).await.is_none());
    }

    #[tokio::test]
    async fn test_read_with_type_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        tokio::fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).await.unwrap();

        assert!(read_with_type(&path).await.is_none());
    }

    #[tokio::test]
    async fn test_directory_structure_sorts_and_links() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join("zeta")).await.unwrap();
        tokio::fs::create_dir(dir.path().join("alpha")).await.unwrap();
        tokio::fs::write(dir.path().join("main.py"), "").await.unwrap();
        tokio::fs::write(dir.path().join("conf.py"), "").await.unwrap();

        let (dirs, files) = directory_structure(dir.path(), "/projects/demo/tree/src")
            .await
            .unwrap();

        let dir_names: Vec<&str> = dirs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(dir_names, vec!["alpha", "zeta"]);
        assert_eq!(dirs[0].url, "/projects/demo/tree/src/alpha/");

        let file_names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(file_names, vec!["conf.py", "main.py"]);
        assert_eq!(files[1].url, "/projects/demo/tree/src/main.py");
    }

    #[tokio::test]
    async fn test_is_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_directory(dir.path()).await);

        let file = dir.path().join("f.txt");
        tokio::fs::write(&file, "x").await.unwrap();
        assert!(!is_directory(&file).await);
        assert!(!is_directory(&dir.path().join("missing")).await);
    }

    #[test]
    fn test_unloadable_placeholder_shape() {
        let view = FileView::unloadable();
        assert_eq!(view.content, UNLOADABLE_CONTENT);
        assert_eq!(view.code_type, "py");
        assert_eq!(view.code_type_script, "shBrushPython.js");
    }
}
