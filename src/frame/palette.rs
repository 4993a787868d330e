use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgb8;
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Visual style of a video. Only changes colors, never layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Experimental,
    Professional,
    Casual,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Experimental, Style::Professional, Style::Casual];

    pub fn as_str(self) -> &'static str {
        match self {
            Style::Experimental => "experimental",
            Style::Professional => "professional",
            Style::Casual => "casual",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Style::Experimental => Palette {
                title: ColorPair::new(Rgb8::new(67, 126, 234), Rgb8::WHITE),
                section: ColorPair::new(Rgb8::new(248, 249, 250), Rgb8::new(51, 51, 51)),
                summary: ColorPair::new(Rgb8::new(118, 75, 162), Rgb8::WHITE),
            },
            Style::Professional => Palette {
                title: ColorPair::new(Rgb8::new(24, 40, 72), Rgb8::WHITE),
                section: ColorPair::new(Rgb8::WHITE, Rgb8::new(33, 37, 41)),
                summary: ColorPair::new(Rgb8::new(44, 62, 80), Rgb8::new(236, 240, 241)),
            },
            Style::Casual => Palette {
                title: ColorPair::new(Rgb8::new(255, 159, 67), Rgb8::new(45, 52, 54)),
                section: ColorPair::new(Rgb8::new(255, 248, 231), Rgb8::new(45, 52, 54)),
                summary: ColorPair::new(Rgb8::new(0, 184, 148), Rgb8::WHITE),
            },
        }
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Style {
    type Err = SlidecastError;

    fn from_str(s: &str) -> SlidecastResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "experimental" => Ok(Style::Experimental),
            "professional" => Ok(Style::Professional),
            "casual" => Ok(Style::Casual),
            other => Err(SlidecastError::validation(format!(
                "unknown style '{other}' (expected experimental, professional or casual)"
            ))),
        }
    }
}

/// Background / text color pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorPair {
    pub background: Rgb8,
    pub text: Rgb8,
}

impl ColorPair {
    pub const fn new(background: Rgb8, text: Rgb8) -> Self {
        Self { background, text }
    }
}

/// Colors for each frame role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub title: ColorPair,
    pub section: ColorPair,
    pub summary: ColorPair,
}
