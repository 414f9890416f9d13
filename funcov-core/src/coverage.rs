//! Coverage registry data model
//!
//! Output of one instrumentation run: a registry of every original file that
//! received at least one counter, with the functions discovered in it. All
//! recorded locations are expressed in the coordinates of the original file,
//! never in the coordinates of a generated bundle.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A point in a source file. Lines are 1-based, columns are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Span of a function-like node. `end` points one column past the closing
/// brace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

impl Location {
    pub fn new(start: Position, end: Position) -> Self {
        Location { start, end }
    }
}

/// One discovered function. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub id: u32,
    pub name: String,
    pub location: Location,
}

/// Statement registry for one file.
///
/// Every counted function contributes exactly one statement, its injected
/// counter call, so the IDs here mirror the owning file's function IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatInfo {
    ids: Vec<u32>,
}

impl StatInfo {
    pub fn function_ids(&self) -> &[u32] {
        &self.ids
    }

    fn add(&mut self, id: u32) {
        self.ids.push(id);
    }
}

/// Per-file coverage record. Created lazily on the first counted function of
/// that file; never merged or deleted during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    name: String,
    ids: Vec<u32>,
    functions: BTreeMap<u32, FunctionInfo>,
    stat: StatInfo,
}

impl FileInfo {
    fn new(name: &str) -> Self {
        FileInfo {
            name: name.to_string(),
            ids: Vec::new(),
            functions: BTreeMap::new(),
            stat: StatInfo::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Function IDs in discovery order, always `1..=N` with no gaps.
    pub fn function_ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn function_info(&self, id: u32) -> Option<&FunctionInfo> {
        self.functions.get(&id)
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionInfo> {
        self.functions.values()
    }

    pub fn stat_info(&self) -> &StatInfo {
        &self.stat
    }

    /// Records a function and returns its newly assigned ID.
    pub(crate) fn add_function(&mut self, name: String, location: Location) -> u32 {
        let id = self.ids.len() as u32 + 1;
        self.ids.push(id);
        self.stat.add(id);
        self.functions.insert(id, FunctionInfo { id, name, location });
        id
    }
}

/// Registry mapping original file names to their per-file records.
///
/// Lookup of a file with no recorded functions (excluded files included)
/// returns `None`. Iteration order is sorted by file name so repeated runs
/// produce identical output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageInfo {
    files: BTreeMap<String, FileInfo>,
}

impl CoverageInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_info(&self, name: &str) -> Option<&FileInfo> {
        self.files.get(name)
    }

    pub fn files(&self) -> impl Iterator<Item = &FileInfo> {
        self.files.values()
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub(crate) fn file_info_mut(&mut self, name: &str) -> &mut FileInfo {
        self.files
            .entry(name.to_string())
            .or_insert_with(|| FileInfo::new(name))
    }
}
