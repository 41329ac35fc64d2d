//! Filesystem helpers shared by the build strategies.

use std::fs;
use std::io;
use std::path::Path;

/// Recursively copy the contents of `src` into `dst`, creating `dst` if
/// needed. Symlinks are followed; existing files are overwritten.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Top-level files in `dir` whose name ends with any of `suffixes`,
/// sorted for deterministic output.
pub fn files_with_suffix(dir: &Path, suffixes: &[&str]) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if suffixes.iter().any(|s| name.ends_with(s)) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_recursive() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("assets/css")).unwrap();
        fs::write(src.path().join("index.html"), "<html>").unwrap();
        fs::write(src.path().join("assets/css/site.css"), "body{}").unwrap();

        copy_dir_recursive(src.path(), dst.path()).unwrap();

        assert!(dst.path().join("index.html").exists());
        assert_eq!(
            fs::read_to_string(dst.path().join("assets/css/site.css")).unwrap(),
            "body{}"
        );
    }

    #[test]
    fn test_files_with_suffix_is_sorted_and_top_level_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.html"), "").unwrap();
        fs::write(dir.path().join("a.html"), "").unwrap();
        fs::write(dir.path().join("style.css"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/c.html"), "").unwrap();

        let html = files_with_suffix(dir.path(), &[".html"]).unwrap();
        assert_eq!(html, vec!["a.html", "b.html"]);
    }
}
