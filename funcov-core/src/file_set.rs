//! Mapping from unit paths to stable coverage keys
//!
//! The registry and the injected counter calls identify files by a
//! caller-visible key, not by raw paths. A [`FileSet`] strategy produces that
//! key; bundle region names go through the same strategy so bundle keys and
//! single-file keys agree.

use std::path::Path;

/// Strategy turning an on-disk path into the key used in the registry and in
/// injected calls.
pub trait FileSet {
    fn file_key(&self, root: &Path, path: &Path) -> String;
}

/// Keys are paths relative to the unit root, `/`-separated. Paths outside the
/// root pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleFileSet;

impl FileSet for SimpleFileSet {
    fn file_key(&self, root: &Path, path: &Path) -> String {
        let rel = path.strip_prefix(root).unwrap_or(path);
        normalize_separators(&rel.to_string_lossy())
    }
}

/// Keys are the final path component alone. Fits projects where every
/// instrumented file has a unique name.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasenameFileSet;

impl FileSet for BasenameFileSet {
    fn file_key(&self, _root: &Path, path: &Path) -> String {
        match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => normalize_separators(&path.to_string_lossy()),
        }
    }
}

fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_file_set_strips_root() {
        let keys = SimpleFileSet;
        assert_eq!(
            keys.file_key(Path::new("/proj"), Path::new("/proj/src/a.js")),
            "src/a.js"
        );
        assert_eq!(keys.file_key(Path::new("/proj"), Path::new("/proj/a.js")), "a.js");
    }

    #[test]
    fn test_simple_file_set_passes_outside_paths_through() {
        let keys = SimpleFileSet;
        assert_eq!(
            keys.file_key(Path::new("/proj"), Path::new("func1.js")),
            "func1.js",
            "bundle region names are often already relative"
        );
        assert_eq!(
            keys.file_key(Path::new("/proj"), Path::new("/other/b.js")),
            "/other/b.js"
        );
    }

    #[test]
    fn test_basename_file_set() {
        let keys = BasenameFileSet;
        assert_eq!(
            keys.file_key(Path::new("/proj"), Path::new("/proj/src/a.js")),
            "a.js"
        );
        assert_eq!(keys.file_key(Path::new("/proj"), Path::new("b.js")), "b.js");
    }

    #[test]
    fn test_separators_normalized() {
        let keys = SimpleFileSet;
        assert_eq!(
            keys.file_key(Path::new("/proj"), Path::new("src\\a.js")),
            "src/a.js"
        );
    }
}
