//! Segment-based flat paths.
//!
//! A flat key is a sequence of segments, each a field name or a list
//! index, rendered with a configurable separator (default `:`). Keeping
//! the segments instead of a raw delimited string means index
//! generalization and list grouping never have to re-split rendered keys,
//! so separators and regex metacharacters inside field names stay inert.

use regex::Regex;

/// Regex fragment standing in for one list index in a generalized key.
pub const INDEX_PATTERN: &str = r"\d+";

/// One path segment: a map field name or a sequence position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    Name(String),
    Index(usize),
}

/// A flat document key as an owned segment sequence.
///
/// The empty path addresses a top-level scalar document and renders as "".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn root() -> Self {
        Path::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Path { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Child path with a field-name segment appended.
    pub fn child_name(&self, name: &str) -> Path {
        let mut segments = self.segments.clone();
        segments.push(Segment::Name(name.to_string()));
        Path { segments }
    }

    /// Child path with a list-index segment appended.
    pub fn child_index(&self, index: usize) -> Path {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Path { segments }
    }

    /// Concatenation of `self` and `tail`.
    pub fn join(&self, tail: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(tail.segments.iter().cloned());
        Path { segments }
    }

    /// True iff the path contains at least one index segment, i.e. the
    /// key addresses something inside a list.
    pub fn is_indexed(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Index(_)))
    }

    /// Rendered key: segments joined by `separator`.
    pub fn render(&self, separator: char) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push(separator);
            }
            match segment {
                Segment::Name(name) => out.push_str(name),
                Segment::Index(index) => out.push_str(&index.to_string()),
            }
        }
        out
    }

    /// Index-generalized regex pattern for the rendered key: name
    /// segments and the separator are escaped, every index segment
    /// becomes [`INDEX_PATTERN`].
    pub fn generalized(&self, separator: char) -> String {
        let sep = regex::escape(&separator.to_string());
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push_str(&sep);
            }
            match segment {
                Segment::Name(name) => out.push_str(&regex::escape(name)),
                Segment::Index(_) => out.push_str(INDEX_PATTERN),
            }
        }
        out
    }

    /// Splits an indexed key into its enclosing list-item path and the
    /// field path local to that item.
    ///
    /// The split happens at the last index segment, so keys inside nested
    /// lists group under the innermost item. A key ending in its index (a
    /// bare list element) splits before that index: the item path is the
    /// list container and the field is the index segment itself, which is
    /// what lets a list-of-scalars shape generalize to a single
    /// index-bearing field.
    ///
    /// Returns `None` for non-indexed keys.
    pub fn split_at_item(&self) -> Option<(Path, Path)> {
        let last_index = self
            .segments
            .iter()
            .rposition(|s| matches!(s, Segment::Index(_)))?;

        let boundary = if last_index == self.segments.len() - 1 {
            last_index
        } else {
            last_index + 1
        };

        Some((
            Path::from_segments(self.segments[..boundary].to_vec()),
            Path::from_segments(self.segments[boundary..].to_vec()),
        ))
    }
}

/// Whether `pattern` matches `key` over its whole length.
///
/// Non-compiling patterns match nothing.
pub fn full_match(pattern: &str, key: &str) -> bool {
    match Regex::new(&format!("^(?:{})$", pattern)) {
        Ok(re) => re.is_match(key),
        Err(_) => false,
    }
}
