//! Text measurement and rasterization.
//!
//! [`ParleyRasterizer`] shapes text with Parley and paints glyph runs with `vello_cpu`. Font
//! resolution happens once at construction and never fails: the preferred font file, then a
//! system face found through `fontdb`, then no font at all (text is measured as empty and
//! frames render background only).

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::foundation::core::Rgb8;
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Font parameters for one block of text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    pub size_px: f32,
    /// Lines wrap at this width when set; rendered sprites are no wider.
    pub wrap_width_px: Option<f32>,
    /// Rendered sprites are clipped to this height; lines starting below it are skipped.
    pub max_height_px: Option<f32>,
}

/// Measured extent of a laid-out text block.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextBounds {
    pub width: f32,
    pub height: f32,
}

impl TextBounds {
    /// Pixel size of a sprite that fully covers these bounds.
    pub fn pixel_size(self) -> (u32, u32) {
        (ceil_px(self.width), ceil_px(self.height))
    }
}

fn ceil_px(v: f32) -> u32 {
    if v.is_finite() && v > 0.0 {
        v.ceil() as u32
    } else {
        0
    }
}

/// Rendered text in premultiplied RGBA8, tightly packed, row-major.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextSprite {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Vec<u8>,
}

impl TextSprite {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Text measurement / rendering capability.
pub trait TextRasterizer {
    fn measure(&mut self, text: &str, font: &FontSpec) -> TextBounds;
    fn render(&mut self, text: &str, font: &FontSpec, color: Rgb8) -> SlidecastResult<TextSprite>;
}

impl<T: TextRasterizer + ?Sized> TextRasterizer for Box<T> {
    fn measure(&mut self, text: &str, font: &FontSpec) -> TextBounds {
        (**self).measure(text, font)
    }

    fn render(&mut self, text: &str, font: &FontSpec, color: Rgb8) -> SlidecastResult<TextSprite> {
        (**self).render(text, font, color)
    }
}

/// Where the active font came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    Preferred(PathBuf),
    System(String),
    Unavailable,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

struct LoadedFont {
    family: String,
    data: vello_cpu::peniko::FontData,
}

/// Parley + vello_cpu text rasterizer.
pub struct ParleyRasterizer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    font: Option<LoadedFont>,
    source: FontSource,
}

impl ParleyRasterizer {
    /// Resolve fonts, preferring `preferred` when it is readable.
    pub fn new(preferred: Option<&Path>) -> Self {
        let mut font_ctx = parley::FontContext::default();
        let mut resolved = None;

        if let Some(path) = preferred {
            match std::fs::read(path) {
                Ok(bytes) => match register(&mut font_ctx, bytes, 0) {
                    Some(font) => resolved = Some((font, FontSource::Preferred(path.into()))),
                    None => tracing::warn!(
                        path = %path.display(),
                        "preferred font has no usable family, falling back"
                    ),
                },
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "preferred font unavailable, falling back"
                ),
            }
        }

        if resolved.is_none()
            && let Some((bytes, index)) = system_sans_serif_face()
            && let Some(font) = register(&mut font_ctx, bytes, index)
        {
            let family = font.family.clone();
            resolved = Some((font, FontSource::System(family)));
        }

        let (font, source) = match resolved {
            Some((font, source)) => (Some(font), source),
            None => {
                tracing::warn!("no renderable font found; frames will contain no text");
                (None, FontSource::Unavailable)
            }
        };

        Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            font,
            source,
        }
    }

    pub fn font_source(&self) -> &FontSource {
        &self.source
    }

    fn layout(
        &mut self,
        text: &str,
        font: &FontSpec,
        brush: TextBrushRgba8,
    ) -> Option<parley::Layout<TextBrushRgba8>> {
        let family = self.font.as_ref()?.family.clone();
        if !font.size_px.is_finite() || font.size_px <= 0.0 {
            return None;
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(font.wrap_width_px);
        layout.align(
            font.wrap_width_px,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Some(layout)
    }
}

impl TextRasterizer for ParleyRasterizer {
    fn measure(&mut self, text: &str, font: &FontSpec) -> TextBounds {
        match self.layout(text, font, TextBrushRgba8::default()) {
            Some(layout) => TextBounds {
                width: layout.width(),
                height: layout.height(),
            },
            None => TextBounds::default(),
        }
    }

    fn render(&mut self, text: &str, font: &FontSpec, color: Rgb8) -> SlidecastResult<TextSprite> {
        let brush = TextBrushRgba8 {
            r: color.r,
            g: color.g,
            b: color.b,
            a: 255,
        };
        let Some(layout) = self.layout(text, font, brush) else {
            return Ok(TextSprite::empty());
        };
        let Some(loaded) = self.font.as_ref() else {
            return Ok(TextSprite::empty());
        };

        let (mut w, mut h) = TextBounds {
            width: layout.width(),
            height: layout.height(),
        }
        .pixel_size();
        if let Some(max) = font.wrap_width_px {
            w = w.min(ceil_px(max));
        }
        if let Some(max) = font.max_height_px {
            h = h.min(ceil_px(max));
        }
        if w == 0 || h == 0 {
            return Ok(TextSprite::empty());
        }
        let (w16, h16) = match (u16::try_from(w), u16::try_from(h)) {
            (Ok(w16), Ok(h16)) => (w16, h16),
            _ => {
                return Err(SlidecastError::validation(format!(
                    "text block {w}x{h} exceeds raster limits"
                )));
            }
        };

        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        for line in layout.lines() {
            if line.metrics().min_coord >= f32::from(h16) {
                break;
            }
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&loaded.data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.render_to_pixmap(&mut pixmap);
        Ok(TextSprite {
            width: w,
            height: h,
            rgba8_premul: pixmap.data_as_u8_slice().to_vec(),
        })
    }
}

fn register(font_ctx: &mut parley::FontContext, bytes: Vec<u8>, index: u32) -> Option<LoadedFont> {
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
    let family_id = families.first().map(|(id, _)| *id)?;
    let family = font_ctx.collection.family_name(family_id)?.to_string();
    let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), index);
    Some(LoadedFont { family, data })
}

/// Bytes and face index of a system sans-serif face, or of any system face at all.
fn system_sans_serif_face() -> Option<(Vec<u8>, u32)> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    let query = usvg::fontdb::Query {
        families: &[usvg::fontdb::Family::SansSerif],
        ..usvg::fontdb::Query::default()
    };
    let id = db.query(&query).or_else(|| db.faces().next().map(|f| f.id))?;
    db.with_face_data(id, |data, index| (data.to_vec(), index))
}

#[cfg(test)]
#[path = "../../tests/unit/frame/text.rs"]
mod tests;
