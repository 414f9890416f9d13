//! Line-oriented bundle builder
//!
//! Produces the text/map pairs bundled units are made of: callers append raw
//! filler lines or whole original-file contents, then take the concatenated
//! text plus the [`BundleMap`] recording which lines came from where.

use crate::coverage::Position;
use crate::locator::{BundleMap, MappedRegion};

/// Builder for a concatenated unit and its bundle map.
#[derive(Debug, Default)]
pub struct BundleFile {
    lines: Vec<String>,
    regions: Vec<MappedRegion>,
}

impl BundleFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends unmapped lines (bundler boilerplate).
    pub fn write_content(&mut self, text: &str) {
        self.push_lines(text);
    }

    /// Appends an original file's content and records its mapped region.
    pub fn write_file_content(&mut self, file: &str, text: &str) {
        let start_line = self.lines.len() as u32 + 1;
        let count = self.push_lines(text);
        if count > 0 {
            self.regions.push(MappedRegion {
                file: file.to_string(),
                generated_start: Position::new(start_line, 0),
                line_count: count,
                original_start: Position::new(1, 0),
            });
        }
    }

    /// The concatenated unit text.
    pub fn render(&self) -> String {
        let mut text = self.lines.join("\n");
        if !self.lines.is_empty() {
            text.push('\n');
        }
        text
    }

    pub fn bundle_map(&self) -> BundleMap {
        BundleMap::new(self.regions.clone())
    }

    fn push_lines(&mut self, text: &str) -> u32 {
        if text.is_empty() {
            return 0;
        }
        let body = text.strip_suffix('\n').unwrap_or(text);
        let mut count = 0;
        for line in body.split('\n') {
            self.lines.push(line.to_string());
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenates_files_and_records_regions() {
        let mut bundle = BundleFile::new();
        bundle.write_content("// header\n// more header\n");
        bundle.write_file_content("a.js", "var a = 1;\nvar b = 2;\n");
        bundle.write_content("// between\n");
        bundle.write_file_content("b.js", "var c = 3;\n");

        let text = bundle.render();
        assert_eq!(text.lines().count(), 6);
        assert!(text.starts_with("// header\n"));

        let map = bundle.bundle_map();
        let regions = map.regions();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].file, "a.js");
        assert_eq!(regions[0].generated_start, Position::new(3, 0));
        assert_eq!(regions[0].line_count, 2);
        assert_eq!(regions[1].file, "b.js");
        assert_eq!(regions[1].generated_start, Position::new(6, 0));
        assert_eq!(regions[1].line_count, 1);
    }

    #[test]
    fn test_missing_trailing_newline_still_counts_last_line() {
        let mut bundle = BundleFile::new();
        bundle.write_file_content("a.js", "var a = 1;\nvar b = 2;");

        assert_eq!(bundle.bundle_map().regions()[0].line_count, 2);
        assert_eq!(bundle.render(), "var a = 1;\nvar b = 2;\n");
    }

    #[test]
    fn test_empty_content_adds_nothing() {
        let mut bundle = BundleFile::new();
        bundle.write_content("");
        bundle.write_file_content("a.js", "");

        assert!(bundle.render().is_empty());
        assert!(bundle.bundle_map().is_empty());
    }
}
