//! Resolution of unit positions back to original files
//!
//! A unit is either a single file (identity resolution) or a bundle built by
//! concatenating original files. For bundles, a [`BundleMap`] lists the
//! generated lines each original file contributed and [`SourceLocator`] maps
//! positions through it. Lookup is a binary search over regions sorted by
//! generated start.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coverage::Position;

/// Raised when a function's span cannot be attributed to a single original
/// file. Fatal for the unit being processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("function at {at} spans original files {start_file:?} and {end_file:?}")]
    CrossesFileBoundary {
        /// Start of the offending node, in generated coordinates.
        at: Position,
        start_file: String,
        end_file: String,
    },
}

/// One contiguous run of generated lines contributed by a single original
/// file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedRegion {
    /// Original file the region belongs to.
    pub file: String,
    /// First generated position covered by the region.
    pub generated_start: Position,
    /// Number of whole generated lines the region covers.
    pub line_count: u32,
    /// Where the region's content starts in the original file.
    pub original_start: Position,
}

impl MappedRegion {
    fn contains(&self, position: Position) -> bool {
        if position < self.generated_start {
            return false;
        }
        position.line < self.generated_start.line + self.line_count
    }

    /// Shifts a contained generated position into original-file coordinates.
    /// The column only shifts on the region's first line.
    fn project(&self, position: Position) -> Position {
        let line = self.original_start.line + (position.line - self.generated_start.line);
        let column = if position.line == self.generated_start.line {
            self.original_start.column + (position.column - self.generated_start.column)
        } else {
            position.column
        };
        Position::new(line, column)
    }
}

/// Mapping for a bundled unit: the regions its original files contributed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleMap {
    regions: Vec<MappedRegion>,
}

impl BundleMap {
    pub fn new(mut regions: Vec<MappedRegion>) -> Self {
        regions.sort_by_key(|r| r.generated_start);
        BundleMap { regions }
    }

    pub fn regions(&self) -> &[MappedRegion] {
        &self.regions
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub(crate) fn into_regions(self) -> Vec<MappedRegion> {
        self.regions
    }
}

/// A position resolved to its owning original file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub file: String,
    pub position: Position,
}

/// Resolves positions in a unit to original-file coordinates.
///
/// Without a bundle map this is the identity: every position belongs to the
/// unit's own file. With one, positions inside mapped regions move to the
/// contributing file, while positions in unmapped filler keep the unit's own
/// name with identity coordinates.
#[derive(Debug, Clone)]
pub struct SourceLocator {
    unit_file: String,
    regions: Vec<MappedRegion>,
}

impl SourceLocator {
    /// Identity resolution for a unit with no source map.
    pub fn identity(unit_file: impl Into<String>) -> Self {
        SourceLocator {
            unit_file: unit_file.into(),
            regions: Vec::new(),
        }
    }

    /// Resolution through a bundle map. Region file names are used as given;
    /// callers wanting file-set keys must map them first.
    pub fn with_bundle(unit_file: impl Into<String>, map: BundleMap) -> Self {
        SourceLocator {
            unit_file: unit_file.into(),
            regions: map.into_regions(),
        }
    }

    /// The unit's own coverage key.
    pub fn unit_file(&self) -> &str {
        &self.unit_file
    }

    pub fn resolve(&self, position: Position) -> Located {
        match self.region_at(position) {
            Some(region) => Located {
                file: region.file.clone(),
                position: region.project(position),
            },
            None => Located {
                file: self.unit_file.clone(),
                position,
            },
        }
    }

    fn region_at(&self, position: Position) -> Option<&MappedRegion> {
        let idx = self
            .regions
            .partition_point(|r| r.generated_start <= position);
        let candidate = self.regions[..idx].last()?;
        candidate.contains(position).then_some(candidate)
    }
}
