use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Extract the final path segment from a URL, dropping any query string.
pub fn filename_from_url(url: &str) -> String {
    let name = url
        .split('/')
        .next_back()
        .unwrap_or("")
        .split('?')
        .next()
        .unwrap_or("");
    if name.is_empty() {
        "download".to_string()
    } else {
        name.to_string()
    }
}

/// List the files in `dir` with the given extension, sorted by name so the
/// verifier and installer see a deterministic order.
pub fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read work directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| "Failed to read directory entry")?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url(
                "https://github.com/intel/compute-runtime/releases/download/20.20.16699/intel-opencl_20.20.16699_amd64.deb"
            ),
            "intel-opencl_20.20.16699_amd64.deb"
        );
        assert_eq!(
            filename_from_url("https://example.com/file.deb?token=abc"),
            "file.deb"
        );
        assert_eq!(filename_from_url(""), "download");
        assert_eq!(filename_from_url("https://example.com/downloads/"), "download");
    }

    #[test]
    fn test_files_with_extension_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.deb"), b"b").unwrap();
        fs::write(dir.path().join("a.deb"), b"a").unwrap();
        fs::write(dir.path().join("c.sum"), b"c").unwrap();
        fs::create_dir(dir.path().join("sub.deb")).unwrap();

        let debs = files_with_extension(dir.path(), "deb").unwrap();
        let names: Vec<_> = debs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.deb", "b.deb"]);

        let sums = files_with_extension(dir.path(), "sum").unwrap();
        assert_eq!(sums.len(), 1);
    }
}
