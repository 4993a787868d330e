use image::RgbImage;

use crate::content::model::ContentDocument;
use crate::foundation::config::FrameConfig;
use crate::foundation::error::{SlidecastError, SlidecastResult, SynthesisStage};
use crate::foundation::math::over_opaque_rgb8;
use crate::frame::palette::{ColorPair, Style};
use crate::frame::text::{FontSpec, TextRasterizer, TextSprite};

/// Characters of section content shown on a section frame.
pub const SECTION_PREVIEW_CHARS: usize = 200;
/// Appended to every section preview, whether or not it was truncated.
pub const SECTION_ELLIPSIS: &str = "...";
pub const SUMMARY_MAX_KEY_POINTS: usize = 5;
pub const SUMMARY_BULLET: &str = "• ";
pub const SUMMARY_HEADER: &str = "Key Points:";

/// What a frame shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameRole {
    Title,
    /// Index into `ContentDocument::sections`.
    Section(usize),
    Summary,
}

/// One still image of the slideshow.
#[derive(Clone, Debug)]
pub struct Frame {
    pub role: FrameRole,
    pub caption: String,
    pub image: RgbImage,
}

/// Renders the title, section and summary frames of a document.
pub struct FrameComposer<R> {
    config: FrameConfig,
    rasterizer: R,
}

impl<R: TextRasterizer> FrameComposer<R> {
    pub fn new(config: FrameConfig, rasterizer: R) -> Self {
        Self { config, rasterizer }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn rasterizer_mut(&mut self) -> &mut R {
        &mut self.rasterizer
    }

    /// Produce exactly `2 + doc.sections.len()` frames in presentation order.
    #[tracing::instrument(skip(self, doc), fields(sections = doc.sections.len()))]
    pub fn compose(&mut self, doc: &ContentDocument, style: Style) -> SlidecastResult<Vec<Frame>> {
        self.config.canvas.validate().map_err(|e| e.at_stage(SynthesisStage::Frame))?;
        let palette = style.palette();

        let mut frames = Vec::with_capacity(doc.frame_count());
        frames.push(self.render_frame(
            FrameRole::Title,
            doc.title.clone(),
            self.config.title_font_px,
            palette.title,
        )?);
        for (i, section) in doc.sections.iter().enumerate() {
            frames.push(self.render_frame(
                FrameRole::Section(i),
                section_caption(&section.title, &section.content),
                self.config.section_font_px,
                palette.section,
            )?);
        }
        frames.push(self.render_frame(
            FrameRole::Summary,
            summary_caption(&doc.key_points),
            self.config.summary_font_px,
            palette.summary,
        )?);

        tracing::debug!(frames = frames.len(), %style, "frames composed");
        Ok(frames)
    }

    fn render_frame(
        &mut self,
        role: FrameRole,
        caption: String,
        size_px: f32,
        colors: ColorPair,
    ) -> SlidecastResult<Frame> {
        let canvas = self.config.canvas;
        let wrap = canvas.width as f32 - 2.0 * self.config.margin_px as f32;
        let font = FontSpec {
            size_px,
            wrap_width_px: Some(wrap.max(1.0)),
            max_height_px: Some(canvas.height as f32),
        };

        let mut image = RgbImage::from_pixel(canvas.width, canvas.height, colors.background.to_image());
        let sprite = self
            .rasterizer
            .render(&caption, &font, colors.text)
            .map_err(|e| e.at_stage(SynthesisStage::Frame))?;
        if !sprite.is_empty() {
            blit_centered(&mut image, &sprite)?;
        }
        Ok(Frame {
            role,
            caption,
            image,
        })
    }
}

/// `"{title}\n\n{preview}..."` with the preview capped at [`SECTION_PREVIEW_CHARS`].
pub fn section_caption(title: &str, content: &str) -> String {
    let preview: String = content.chars().take(SECTION_PREVIEW_CHARS).collect();
    format!("{title}\n\n{preview}{SECTION_ELLIPSIS}")
}

pub fn summary_caption(key_points: &[String]) -> String {
    let mut out = String::from(SUMMARY_HEADER);
    for point in key_points.iter().take(SUMMARY_MAX_KEY_POINTS) {
        out.push('\n');
        out.push_str(SUMMARY_BULLET);
        out.push_str(point);
    }
    out
}

/// Composite `sprite` centred on `dst`; parts outside the canvas are clipped.
fn blit_centered(dst: &mut RgbImage, sprite: &TextSprite) -> SlidecastResult<()> {
    let expected = (sprite.width as usize) * (sprite.height as usize) * 4;
    if sprite.rgba8_premul.len() != expected {
        return Err(SlidecastError::synthesis(
            SynthesisStage::Frame,
            format!(
                "text sprite {}x{} has {} bytes, expected {expected}",
                sprite.width,
                sprite.height,
                sprite.rgba8_premul.len()
            ),
        ));
    }

    let (dw, dh) = (i64::from(dst.width()), i64::from(dst.height()));
    let ox = (dw - i64::from(sprite.width)) / 2;
    let oy = (dh - i64::from(sprite.height)) / 2;
    let dst_stride = dst.width() as usize * 3;
    let buf: &mut [u8] = &mut **dst;

    for sy in 0..i64::from(sprite.height) {
        let y = oy + sy;
        if !(0..dh).contains(&y) {
            continue;
        }
        for sx in 0..i64::from(sprite.width) {
            let x = ox + sx;
            if !(0..dw).contains(&x) {
                continue;
            }
            let si = ((sy * i64::from(sprite.width) + sx) * 4) as usize;
            let di = y as usize * dst_stride + x as usize * 3;
            over_opaque_rgb8(&mut buf[di..di + 3], &sprite.rgba8_premul[si..si + 4]);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/frame/composer.rs"]
mod tests;
