use crate::content::model::ContentDocument;
use crate::frame::composer::{SUMMARY_HEADER, SUMMARY_MAX_KEY_POINTS};

/// Default character budget of a [`ContentSummary`].
pub const SUMMARY_DEFAULT_MAX_CHARS: usize = 500;
/// Appended when a summary is cut at its budget.
pub const SUMMARY_TRUNCATION_MARK: &str = "...";
const SUMMARY_ITEM_PREFIX: &str = "  - ";

/// Plain-text digest of a document for listings and previews.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentSummary(String);

impl ContentSummary {
    /// Description, a `Key Points:` line, then up to five `  - ` items, one per line.
    ///
    /// Text longer than `max_chars` characters is cut to `max_chars` and gets `...` appended.
    pub fn build(doc: &ContentDocument, max_chars: usize) -> Self {
        let mut out = doc.description.clone();
        out.push('\n');
        out.push_str(SUMMARY_HEADER);
        for point in doc.key_points.iter().take(SUMMARY_MAX_KEY_POINTS) {
            out.push('\n');
            out.push_str(SUMMARY_ITEM_PREFIX);
            out.push_str(point);
        }

        if let Some((cut, _)) = out.char_indices().nth(max_chars) {
            out.truncate(cut);
            out.push_str(SUMMARY_TRUNCATION_MARK);
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_truncated(&self) -> bool {
        self.0.ends_with(SUMMARY_TRUNCATION_MARK)
    }
}

impl std::fmt::Display for ContentSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
