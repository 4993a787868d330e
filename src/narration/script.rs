use crate::content::model::ContentDocument;

/// Narration text for one video, derived deterministically from a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NarrationScript(String);

impl NarrationScript {
    /// Description, then each section's title and content in order.
    ///
    /// Key points are left out; they only appear on the summary frame. Nothing is truncated.
    pub fn build(doc: &ContentDocument) -> Self {
        let mut parts: Vec<String> = Vec::with_capacity(1 + doc.sections.len() * 2);
        parts.push(doc.description.clone());
        for section in &doc.sections {
            parts.push(format!("\n{}", section.title));
            parts.push(section.content.clone());
        }
        Self(parts.join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for NarrationScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
