//! Structure Splitter: turn flat markup into header-scoped sections.
//!
//! A section boundary occurs at every markdown header of level 1–3 (`# `,
//! `## `, `### `); deeper headings (`####` and beyond) are ordinary body
//! content. Each section carries a [`HeaderPath`]: the most recently seen
//! header text at each of the three levels, carried forward from earlier
//! sections. A new header at level L overwrites level L and clears every
//! deeper level, so the path always reflects the document's current nesting
//! context.
//!
//! The splitter is a plain `Iterator`: lazy, finite, and restartable (call
//! [`split_sections`] again for a fresh pass). It never fails. Degenerate
//! input with no headers yields a single section spanning the whole
//! document, and content before the first header becomes a section with an
//! empty header path.

use serde::{Deserialize, Serialize};
use std::iter::Peekable;
use std::str::Lines;

/// The most recent header text at each of levels 1–3.
///
/// Sparse: only levels actually seen so far are populated. Setting a level
/// clears all deeper levels (a new `## B` forgets any tracked `### C` but
/// keeps the tracked `# A`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPath {
    /// Level-1 header text, if one has been seen.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub h1: Option<String>,
    /// Level-2 header text, if one has been seen since the last level-1 header.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub h2: Option<String>,
    /// Level-3 header text, if one has been seen since the last level-1/2 header.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub h3: Option<String>,
}

impl HeaderPath {
    /// True when no level is populated (content before the first header).
    pub fn is_empty(&self) -> bool {
        self.h1.is_none() && self.h2.is_none() && self.h3.is_none()
    }

    /// Record a header at `level` (1–3), clearing all deeper levels.
    pub fn set(&mut self, level: u8, text: impl Into<String>) {
        match level {
            1 => {
                self.h1 = Some(text.into());
                self.h2 = None;
                self.h3 = None;
            }
            2 => {
                self.h2 = Some(text.into());
                self.h3 = None;
            }
            3 => {
                self.h3 = Some(text.into());
            }
            _ => {}
        }
    }

    /// The deepest populated level, as `(level, text)`.
    pub fn deepest(&self) -> Option<(u8, &str)> {
        if let Some(t) = self.h3.as_deref() {
            return Some((3, t));
        }
        if let Some(t) = self.h2.as_deref() {
            return Some((2, t));
        }
        self.h1.as_deref().map(|t| (1, t))
    }

    /// Render the deepest level as a markdown heading line, e.g. `## Methods`.
    ///
    /// Only the deepest header is re-emitted, the document's most specific
    /// context at this point. The full path stays available to prompts via
    /// [`HeaderPath::to_prompt_json`].
    pub fn heading(&self) -> Option<String> {
        self.deepest()
            .map(|(level, text)| format!("{} {}", "#".repeat(level as usize), text))
    }

    /// Encode the path as a compact JSON object for prompt interpolation,
    /// keyed `"Header 1"`–`"Header 3"`, omitting absent levels.
    pub fn to_prompt_json(&self) -> String {
        let mut map = serde_json::Map::new();
        if let Some(t) = &self.h1 {
            map.insert("Header 1".to_string(), serde_json::Value::String(t.clone()));
        }
        if let Some(t) = &self.h2 {
            map.insert("Header 2".to_string(), serde_json::Value::String(t.clone()));
        }
        if let Some(t) = &self.h3 {
            map.insert("Header 3".to_string(), serde_json::Value::String(t.clone()));
        }
        serde_json::Value::Object(map).to_string()
    }
}

/// One header-scoped span of the source document.
///
/// Immutable once produced; `index` is 1-based document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// 1-based position in document order.
    pub index: usize,
    /// Header context carried forward to this section.
    pub header_path: HeaderPath,
    /// Body lines (header lines excluded), joined with `\n`.
    pub body: String,
}

/// Split markup into sections. Each call returns a fresh iterator.
pub fn split_sections(markup: &str) -> SectionSplitter<'_> {
    SectionSplitter {
        lines: markup.lines().peekable(),
        path: HeaderPath::default(),
        next_index: 1,
        preamble_done: false,
    }
}

/// Lazy iterator over [`Section`]s, in document order.
pub struct SectionSplitter<'a> {
    lines: Peekable<Lines<'a>>,
    path: HeaderPath,
    next_index: usize,
    preamble_done: bool,
}

/// Parse a line as a level-1..3 markdown header: `#`–`###` followed by
/// whitespace. Deeper or malformed headings are body content.
fn parse_header(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 3 {
        return None;
    }
    let rest = &line[hashes..];
    rest.strip_prefix([' ', '\t'])
        .map(|text| (hashes as u8, text.trim()))
}

impl SectionSplitter<'_> {
    /// Consume body lines up to (not including) the next header line.
    fn take_body(&mut self) -> String {
        let mut body_lines: Vec<&str> = Vec::new();
        while let Some(line) = self.lines.peek() {
            if parse_header(line).is_some() {
                break;
            }
            body_lines.push(line);
            self.lines.next();
        }
        body_lines.join("\n")
    }

    fn emit(&mut self, body: String) -> Section {
        let index = self.next_index;
        self.next_index += 1;
        Section {
            index,
            header_path: self.path.clone(),
            body,
        }
    }
}

impl Iterator for SectionSplitter<'_> {
    type Item = Section;

    fn next(&mut self) -> Option<Section> {
        if !self.preamble_done {
            self.preamble_done = true;
            let body = self.take_body();
            // Content before the first header is its own section with an
            // empty path; a whitespace-only preamble is dropped.
            if !body.trim().is_empty() {
                return Some(self.emit(body));
            }
        }

        let header_line = self.lines.next()?;
        let (level, text) = parse_header(header_line)
            .unwrap_or((1, header_line.trim_start_matches('#').trim()));
        self.path.set(level, text);
        let body = self.take_body();
        Some(self.emit(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_LEVEL_DOC: &str = "\
# A
alpha body
## B
beta body
### C
gamma body";

    #[test]
    fn no_headers_yields_single_whole_document_section() {
        let doc = "just a paragraph\nand another line";
        let sections: Vec<Section> = split_sections(doc).collect();
        assert_eq!(sections.len(), 1);
        assert!(sections[0].header_path.is_empty());
        assert_eq!(sections[0].body, doc);
    }

    #[test]
    fn bodies_partition_non_header_lines_losslessly() {
        let doc = "intro line\n\n# A\nalpha\n\nmore alpha\n## B\n\nbeta\n### C\ngamma\n#### not a boundary\ntail";
        let expected: Vec<&str> = doc.lines().filter(|l| parse_header(l).is_none()).collect();
        let got: Vec<String> = split_sections(doc)
            .flat_map(|s| s.body.split('\n').map(String::from).collect::<Vec<_>>())
            .collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn header_clears_deeper_levels_and_keeps_shallower() {
        let doc = "# A\nx\n## B\ny\n### C\nz\n## D\nw";
        let sections: Vec<Section> = split_sections(doc).collect();
        assert_eq!(sections.len(), 4);

        let c = &sections[2].header_path;
        assert_eq!(c.h1.as_deref(), Some("A"));
        assert_eq!(c.h2.as_deref(), Some("B"));
        assert_eq!(c.h3.as_deref(), Some("C"));

        // "## D" clears the tracked level 3 but keeps level 1.
        let d = &sections[3].header_path;
        assert_eq!(d.h1.as_deref(), Some("A"));
        assert_eq!(d.h2.as_deref(), Some("D"));
        assert_eq!(d.h3, None);
    }

    #[test]
    fn preamble_gets_empty_header_path() {
        let doc = "leading abstract text\n# Introduction\nbody";
        let sections: Vec<Section> = split_sections(doc).collect();
        assert_eq!(sections.len(), 2);
        assert!(sections[0].header_path.is_empty());
        assert_eq!(sections[0].body, "leading abstract text");
        assert_eq!(sections[1].header_path.h1.as_deref(), Some("Introduction"));
    }

    #[test]
    fn level_four_heading_is_body_content() {
        let doc = "# A\n#### subsub\ntext";
        let sections: Vec<Section> = split_sections(doc).collect();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, "#### subsub\ntext");
    }

    #[test]
    fn hash_without_space_is_body_content() {
        let doc = "# A\n#hashtag not a heading";
        let sections: Vec<Section> = split_sections(doc).collect();
        assert_eq!(sections.len(), 1);
        assert!(sections[0].body.contains("#hashtag"));
    }

    #[test]
    fn splitter_is_restartable() {
        let first: Vec<Section> = split_sections(THREE_LEVEL_DOC).collect();
        let second: Vec<Section> = split_sections(THREE_LEVEL_DOC).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_yields_no_sections() {
        assert_eq!(split_sections("").count(), 0);
        assert_eq!(split_sections("  \n\n  ").count(), 0);
    }

    #[test]
    fn indices_are_one_based_document_order() {
        let indices: Vec<usize> = split_sections(THREE_LEVEL_DOC).map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn heading_renders_deepest_level_only() {
        let sections: Vec<Section> = split_sections(THREE_LEVEL_DOC).collect();
        assert_eq!(sections[0].header_path.heading().as_deref(), Some("# A"));
        assert_eq!(sections[1].header_path.heading().as_deref(), Some("## B"));
        assert_eq!(sections[2].header_path.heading().as_deref(), Some("### C"));
    }

    #[test]
    fn prompt_json_uses_langchain_style_keys() {
        let mut path = HeaderPath::default();
        path.set(1, "Intro");
        path.set(2, "Background");
        let json = path.to_prompt_json();
        assert!(json.contains("\"Header 1\":\"Intro\""), "got: {json}");
        assert!(json.contains("\"Header 2\":\"Background\""), "got: {json}");
        assert!(!json.contains("Header 3"));
    }
}
