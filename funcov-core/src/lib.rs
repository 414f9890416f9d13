//! Funcov core library - function-level coverage instrumentation for JavaScript and TypeScript

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Instrumentation is strictly per-unit; units never share state
// - Function IDs depend only on document order within the unit
// - Registry names and coordinates always refer to original files
// - No global mutable state
// - Identical input yields identical output

pub mod bundle;
pub mod codegen;
pub mod counters;
pub mod coverage;
pub mod exclude;
pub mod file_set;
pub mod locator;
pub mod parser;
pub mod source;

pub use bundle::BundleFile;
pub use counters::{AnonymousNaming, FunctionCounters};
pub use coverage::{CoverageInfo, FileInfo, FunctionInfo, Location, Position, StatInfo};
pub use exclude::ExcludeSet;
pub use file_set::{BasenameFileSet, FileSet, SimpleFileSet};
pub use locator::{BundleMap, Located, MappedRegion, ResolutionError, SourceLocator};
pub use source::Source;

use std::path::Path;

use anyhow::Result;

/// Options for [`instrument`].
pub struct InstrumentOptions {
    /// Identifier the injected counter calls are made on.
    pub counter_object: String,
    /// Glob patterns for original files that must not be counted.
    pub excludes: Vec<String>,
    /// Numbering scheme for `(anonymous_K)` names.
    pub anonymous_naming: AnonymousNaming,
    /// Present when the unit is a concatenated bundle.
    pub bundle_map: Option<BundleMap>,
    /// Maps file paths and bundle region names to registry keys.
    pub file_set: Box<dyn FileSet>,
}

impl Default for InstrumentOptions {
    fn default() -> Self {
        InstrumentOptions {
            counter_object: "__funcov__".to_string(),
            excludes: Vec::new(),
            anonymous_naming: AnonymousNaming::default(),
            bundle_map: None,
            file_set: Box::new(SimpleFileSet),
        }
    }
}

/// Result of instrumenting one unit.
#[derive(Debug, Clone)]
pub struct Instrumented {
    /// The rewritten source text.
    pub code: String,
    /// Registry describing every counted function.
    pub coverage: CoverageInfo,
}

/// Parses, instruments and reprints one unit of source.
///
/// `root` anchors registry keys: `filename` and any bundle region names are
/// turned into keys by `options.file_set` relative to it.
pub fn instrument(
    root: &Path,
    filename: &Path,
    code: &str,
    options: InstrumentOptions,
) -> Result<Instrumented> {
    let InstrumentOptions {
        counter_object,
        excludes,
        anonymous_naming,
        bundle_map,
        file_set,
    } = options;

    let mut source = Source::new(root, filename, code, &excludes, &*file_set, bundle_map)?;
    FunctionCounters::with_anonymous_naming(counter_object, anonymous_naming)
        .process(&mut source)?;
    let code = source.generate()?;
    Ok(Instrumented {
        code,
        coverage: source.into_coverage_info(),
    })
}
