//! A single unit of source under instrumentation
//!
//! [`Source`] owns everything one processing run touches: the parsed module,
//! its private SWC source map, the location resolver, the exclusion predicate
//! and the coverage registry being filled. Units never share state, which is
//! what lets callers process many of them in parallel.

use std::path::{Path, PathBuf};

use anyhow::Result;
use swc_common::{sync::Lrc, SourceMap};
use swc_ecma_ast::Module;

use crate::coverage::{CoverageInfo, Position};
use crate::exclude::ExcludeSet;
use crate::file_set::FileSet;
use crate::locator::{BundleMap, Located, SourceLocator};
use crate::{codegen, parser};

pub struct Source {
    root: PathBuf,
    filename: PathBuf,
    pub(crate) source_map: Lrc<SourceMap>,
    pub(crate) module: Module,
    pub(crate) locator: SourceLocator,
    pub(crate) excludes: ExcludeSet,
    pub(crate) coverage: CoverageInfo,
}

impl Source {
    /// Parses `code` and prepares the unit for instrumentation.
    ///
    /// A `bundle_map` marks the unit as a bundle; its region names are run
    /// through `file_set` so they key the registry the same way standalone
    /// files do.
    pub fn new(
        root: &Path,
        filename: &Path,
        code: &str,
        excludes: &[String],
        file_set: &dyn FileSet,
        bundle_map: Option<BundleMap>,
    ) -> Result<Self> {
        let source_map: Lrc<SourceMap> = Default::default();
        let module = parser::parse_source(code, &source_map, &filename.to_string_lossy())?;
        let excludes = ExcludeSet::new(excludes)?;

        let unit_key = file_set.file_key(root, filename);
        let locator = match bundle_map {
            Some(map) => {
                let mut regions = map.into_regions();
                for region in &mut regions {
                    region.file = file_set.file_key(root, Path::new(&region.file));
                }
                SourceLocator::with_bundle(unit_key, BundleMap::new(regions))
            }
            None => SourceLocator::identity(unit_key),
        };

        Ok(Source {
            root: root.to_path_buf(),
            filename: filename.to_path_buf(),
            source_map,
            module,
            locator,
            excludes,
            coverage: CoverageInfo::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// The unit's own coverage key.
    pub fn file_key(&self) -> &str {
        self.locator.unit_file()
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Registry filled by instrumentation; empty until then.
    pub fn coverage_info(&self) -> &CoverageInfo {
        &self.coverage
    }

    pub fn into_coverage_info(self) -> CoverageInfo {
        self.coverage
    }

    /// Resolves a unit position to its original file.
    pub fn locate(&self, position: Position) -> Located {
        self.locator.resolve(position)
    }

    pub fn is_excluded(&self, file: &str) -> bool {
        self.excludes.is_excluded(file)
    }

    /// Prints the unit's (possibly instrumented) module.
    pub fn generate(&self) -> Result<String> {
        codegen::generate(&self.module, &self.source_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::BundleFile;
    use crate::file_set::SimpleFileSet;

    #[test]
    fn test_unit_key_comes_from_file_set() {
        let source = Source::new(
            Path::new("/proj"),
            Path::new("/proj/src/app.js"),
            "var x = 1;",
            &[],
            &SimpleFileSet,
            None,
        )
        .unwrap();
        assert_eq!(source.file_key(), "src/app.js");
        assert_eq!(source.root(), Path::new("/proj"));
        assert_eq!(source.filename(), Path::new("/proj/src/app.js"));
    }

    #[test]
    fn test_identity_locate_and_excludes() {
        let source = Source::new(
            Path::new("."),
            Path::new("1.js"),
            "var x = 1;",
            &["excluded.js".to_string()],
            &SimpleFileSet,
            None,
        )
        .unwrap();

        let located = source.locate(Position::new(1, 4));
        assert_eq!(located.file, "1.js");
        assert_eq!(located.position, Position::new(1, 4));

        assert!(source.is_excluded("excluded.js"));
        assert!(!source.is_excluded("1.js"));
        assert!(source.coverage_info().is_empty());
    }

    #[test]
    fn test_bundle_regions_are_keyed_like_files() {
        let mut bundle = BundleFile::new();
        bundle.write_file_content("/proj/func1.js", "var a = 1;\n");

        let source = Source::new(
            Path::new("/proj"),
            Path::new("/proj/bundle.js"),
            &bundle.render(),
            &[],
            &SimpleFileSet,
            Some(bundle.bundle_map()),
        )
        .unwrap();

        let located = source.locate(Position::new(1, 0));
        assert_eq!(located.file, "func1.js", "region names go through the file set");
    }

    #[test]
    fn test_parse_failures_surface() {
        let result = Source::new(
            Path::new("."),
            Path::new("broken.js"),
            "function (",
            &[],
            &SimpleFileSet,
            None,
        );
        assert!(result.is_err());
    }
}
