use serde::{Deserialize, Deserializer, Serialize};

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Requested content complexity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Basic,
    #[default]
    Intermediate,
    Advanced,
}

impl Depth {
    pub const ALL: [Depth; 3] = [Depth::Basic, Depth::Intermediate, Depth::Advanced];

    pub fn as_str(self) -> &'static str {
        match self {
            Depth::Basic => "basic",
            Depth::Intermediate => "intermediate",
            Depth::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Depth {
    type Err = SlidecastError;

    fn from_str(s: &str) -> SlidecastResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Depth::Basic),
            "intermediate" => Ok(Depth::Intermediate),
            "advanced" => Ok(Depth::Advanced),
            other => Err(SlidecastError::validation(format!(
                "unknown depth '{other}' (expected basic, intermediate or advanced)"
            ))),
        }
    }
}

/// What a caller asked to generate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRequest {
    pub topic: String,
    pub language: String,
    pub depth: Depth,
}

impl ContentRequest {
    /// Build a request, rejecting blank topics and language codes.
    pub fn new(
        topic: impl Into<String>,
        language: impl Into<String>,
        depth: Depth,
    ) -> SlidecastResult<Self> {
        let topic = topic.into().trim().to_string();
        let language = language.into().trim().to_string();
        if topic.is_empty() {
            return Err(SlidecastError::validation("topic must be non-empty"));
        }
        if language.is_empty() {
            return Err(SlidecastError::validation("language must be non-empty"));
        }
        Ok(Self {
            topic,
            language,
            depth,
        })
    }
}

/// Decode an explicit JSON `null` as `T::default()`.
///
/// Pair with `#[serde(default)]` so absent and `null` fields behave the same.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One titled section of a lesson, in presentation order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_points: Vec<String>,
}

impl Section {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            key_points: Vec::new(),
        }
    }
}

/// Structured educational content for one topic.
///
/// Invariants once produced by the parser: `title` and `description` are non-empty and
/// `sections` holds at least one entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDocument {
    pub topic: String,
    pub title: String,
    pub description: String,
    pub sections: Vec<Section>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_points: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub learning_objectives: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fun_facts: Vec<String>,
    pub language: String,
    pub depth: Depth,
}

impl ContentDocument {
    /// Load a previously generated document from JSON.
    pub fn from_json_str(s: &str) -> SlidecastResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| SlidecastError::validation(format!("invalid content document: {e}")))
    }

    pub fn from_path(path: &std::path::Path) -> SlidecastResult<Self> {
        use anyhow::Context as _;
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read content document '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Number of frames a slideshow of this document renders: title, sections, summary.
    pub fn frame_count(&self) -> usize {
        self.sections.len() + 2
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/model.rs"]
mod tests;
