//! Tolerant extraction of a [`ContentDocument`] from free-form generator output.
//!
//! Generators are asked for JSON but routinely wrap it in prose or ignore the instruction
//! altogether. Parsing therefore never fails: it either decodes the embedded object or builds a
//! fallback document from the raw text.

use serde::Deserialize;

use crate::content::model::{ContentDocument, ContentRequest, Section, null_as_default};

/// Number of raw-text characters used as description for fallback documents.
pub const FALLBACK_DESCRIPTION_CHARS: usize = 200;
/// Title of the single section a fallback document carries.
pub const FALLBACK_SECTION_TITLE: &str = "Content";

/// Which path produced a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseOutcome {
    /// The embedded JSON object decoded.
    Parsed,
    /// Decoding failed and the document was built from the raw text.
    Fallback,
}

/// Parser result. Both variants carry a valid document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedContent {
    Parsed(ContentDocument),
    Fallback(ContentDocument),
}

impl ParsedContent {
    pub fn document(&self) -> &ContentDocument {
        match self {
            Self::Parsed(d) | Self::Fallback(d) => d,
        }
    }

    pub fn into_document(self) -> ContentDocument {
        match self {
            Self::Parsed(d) | Self::Fallback(d) => d,
        }
    }

    pub fn outcome(&self) -> ParseOutcome {
        match self {
            Self::Parsed(_) => ParseOutcome::Parsed,
            Self::Fallback(_) => ParseOutcome::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

#[derive(Deserialize)]
struct RawContent {
    #[serde(default, deserialize_with = "null_as_default")]
    title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    sections: Vec<Section>,
    #[serde(default, deserialize_with = "null_as_default")]
    key_points: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    learning_objectives: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    fun_facts: Vec<String>,
}

/// Parse generator output for `request`.
pub fn parse_response(raw_text: &str, request: &ContentRequest) -> ParsedContent {
    let Some(json) = embedded_object(raw_text) else {
        tracing::warn!(
            target: "slidecast::parse",
            topic = %request.topic,
            raw_len = raw_text.len(),
            "no JSON object in generator response, using fallback document"
        );
        return ParsedContent::Fallback(fallback_document(raw_text, request));
    };

    match serde_json::from_str::<RawContent>(json) {
        Ok(raw) => ParsedContent::Parsed(normalize(raw, raw_text, request)),
        Err(e) => {
            tracing::warn!(
                target: "slidecast::parse",
                topic = %request.topic,
                error = %e,
                "failed to decode generator JSON, using fallback document"
            );
            ParsedContent::Fallback(fallback_document(raw_text, request))
        }
    }
}

/// Slice from the first `{` to the last `}` inclusive, if they are in that order.
fn embedded_object(raw_text: &str) -> Option<&str> {
    let start = raw_text.find('{')?;
    let end = raw_text.rfind('}')?;
    (start < end).then(|| &raw_text[start..=end])
}

fn fallback_title(topic: &str) -> String {
    format!("Learning {topic}")
}

fn leading_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn fallback_document(raw_text: &str, request: &ContentRequest) -> ContentDocument {
    let title = fallback_title(&request.topic);
    let mut description = leading_chars(raw_text, FALLBACK_DESCRIPTION_CHARS);
    if description.trim().is_empty() {
        description = title.clone();
    }

    ContentDocument {
        topic: request.topic.clone(),
        title,
        description,
        sections: vec![Section::new(FALLBACK_SECTION_TITLE, raw_text)],
        key_points: Vec::new(),
        learning_objectives: Vec::new(),
        fun_facts: Vec::new(),
        language: request.language.clone(),
        depth: request.depth,
    }
}

// A decoded object may still be missing required text. Fill the gaps so the document
// invariants hold; complete objects pass through untouched.
fn normalize(raw: RawContent, raw_text: &str, request: &ContentRequest) -> ContentDocument {
    let title = if raw.title.trim().is_empty() {
        fallback_title(&request.topic)
    } else {
        raw.title
    };

    let description = if !raw.description.trim().is_empty() {
        raw.description
    } else {
        let lead = leading_chars(raw_text, FALLBACK_DESCRIPTION_CHARS);
        if lead.trim().is_empty() {
            title.clone()
        } else {
            lead
        }
    };

    let sections = if raw.sections.is_empty() {
        vec![Section::new(FALLBACK_SECTION_TITLE, description.clone())]
    } else {
        raw.sections
    };

    ContentDocument {
        topic: request.topic.clone(),
        title,
        description,
        sections,
        key_points: raw.key_points,
        learning_objectives: raw.learning_objectives,
        fun_facts: raw.fun_facts,
        language: request.language.clone(),
        depth: request.depth,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/parse.rs"]
mod tests;
