use super::*;
use crate::content::model::{Depth, Section};
use crate::foundation::core::{Canvas, Rgb8};
use crate::frame::text::TextBounds;

/// Paints an opaque block whose size depends on the text length and records what it saw.
#[derive(Default)]
struct BlockRasterizer {
    calls: Vec<(String, FontSpec, Rgb8)>,
}

impl TextRasterizer for BlockRasterizer {
    fn measure(&mut self, text: &str, _font: &FontSpec) -> TextBounds {
        TextBounds {
            width: (text.chars().count().min(20) * 2) as f32,
            height: 4.0,
        }
    }

    fn render(&mut self, text: &str, font: &FontSpec, color: Rgb8) -> SlidecastResult<TextSprite> {
        self.calls.push((text.to_string(), *font, color));
        let (width, height) = self.measure(text, font).pixel_size();
        let px = [color.r, color.g, color.b, 255];
        Ok(TextSprite {
            width,
            height,
            rgba8_premul: px.repeat((width * height) as usize),
        })
    }
}

struct FailingRasterizer;

impl TextRasterizer for FailingRasterizer {
    fn measure(&mut self, _text: &str, _font: &FontSpec) -> TextBounds {
        TextBounds::default()
    }

    fn render(&mut self, _: &str, _: &FontSpec, _: Rgb8) -> SlidecastResult<TextSprite> {
        Err(SlidecastError::validation("glyph cache exploded"))
    }
}

fn small_config() -> FrameConfig {
    FrameConfig {
        canvas: Canvas::new(64, 32).unwrap(),
        font_path: None,
        margin_px: 4,
        ..FrameConfig::default()
    }
}

fn doc_with(sections: usize, key_points: usize) -> ContentDocument {
    ContentDocument {
        topic: "Rust".into(),
        title: "Learning Rust".into(),
        description: "A systems language.".into(),
        sections: (0..sections)
            .map(|i| Section::new(format!("Part {i}"), format!("Body of part {i}.")))
            .collect(),
        key_points: (0..key_points).map(|i| format!("point {i}")).collect(),
        learning_objectives: vec![],
        fun_facts: vec![],
        language: "en".into(),
        depth: Depth::Basic,
    }
}

#[test]
fn frame_count_is_sections_plus_two() {
    for n in [0usize, 1, 5, 20] {
        let mut composer = FrameComposer::new(small_config(), BlockRasterizer::default());
        let frames = composer.compose(&doc_with(n, 3), Style::default()).unwrap();
        assert_eq!(frames.len(), n + 2, "sections = {n}");
        assert_eq!(frames[0].role, FrameRole::Title);
        assert_eq!(frames[n + 1].role, FrameRole::Summary);
        for (i, f) in frames[1..=n].iter().enumerate() {
            assert_eq!(f.role, FrameRole::Section(i));
        }
    }
}

#[test]
fn every_frame_matches_the_canvas() {
    let mut composer = FrameComposer::new(small_config(), BlockRasterizer::default());
    for f in composer.compose(&doc_with(3, 2), Style::Casual).unwrap() {
        assert_eq!(f.image.dimensions(), (64, 32));
    }
}

#[test]
fn summary_keeps_first_five_key_points() {
    let mut composer = FrameComposer::new(small_config(), BlockRasterizer::default());
    let frames = composer.compose(&doc_with(1, 8), Style::default()).unwrap();
    let summary = &frames.last().unwrap().caption;

    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines[0], "Key Points:");
    assert_eq!(lines.len(), 1 + SUMMARY_MAX_KEY_POINTS);
    for (i, line) in lines[1..].iter().enumerate() {
        assert_eq!(*line, format!("• point {i}"));
    }
}

#[test]
fn summary_without_key_points_is_header_only() {
    assert_eq!(summary_caption(&[]), SUMMARY_HEADER);
}

#[test]
fn section_preview_truncates_on_characters() {
    let content = "é".repeat(250);
    let caption = section_caption("Accents", &content);
    let (title, body) = caption.split_once("\n\n").unwrap();
    assert_eq!(title, "Accents");
    assert!(body.ends_with(SECTION_ELLIPSIS));
    assert_eq!(
        body.trim_end_matches(SECTION_ELLIPSIS).chars().count(),
        SECTION_PREVIEW_CHARS
    );
}

#[test]
fn short_section_still_gets_ellipsis() {
    assert_eq!(section_caption("T", "short"), "T\n\nshort...");
}

#[test]
fn style_changes_colors_not_captions() {
    let doc = doc_with(2, 2);
    let mut a = FrameComposer::new(small_config(), BlockRasterizer::default());
    let mut b = FrameComposer::new(small_config(), BlockRasterizer::default());
    let fa = a.compose(&doc, Style::Experimental).unwrap();
    let fb = b.compose(&doc, Style::Professional).unwrap();

    let captions = |fs: &[Frame]| fs.iter().map(|f| f.caption.clone()).collect::<Vec<_>>();
    assert_eq!(captions(&fa), captions(&fb));
    assert_ne!(fa[0].image, fb[0].image);
}

#[test]
fn text_is_centred_on_background() {
    let mut composer = FrameComposer::new(small_config(), BlockRasterizer::default());
    let doc = doc_with(0, 0);
    let frames = composer.compose(&doc, Style::Experimental).unwrap();
    let title = &frames[0].image;
    let palette = Style::Experimental.palette();

    // "Learning Rust" is 13 chars -> 26x4 block centred on 64x32.
    assert_eq!(*title.get_pixel(0, 0), palette.title.background.to_image());
    assert_eq!(*title.get_pixel(19, 14), palette.title.text.to_image());
    assert_eq!(*title.get_pixel(44, 17), palette.title.text.to_image());
    assert_eq!(*title.get_pixel(18, 14), palette.title.background.to_image());
    assert_eq!(*title.get_pixel(45, 14), palette.title.background.to_image());
}

#[test]
fn fonts_and_wrap_width_follow_config() {
    let mut composer = FrameComposer::new(small_config(), BlockRasterizer::default());
    composer.compose(&doc_with(1, 1), Style::default()).unwrap();
    let calls = &composer.rasterizer_mut().calls;
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].1.size_px, 80.0);
    assert_eq!(calls[1].1.size_px, 40.0);
    assert_eq!(calls[2].1.size_px, 50.0);
    assert!(calls.iter().all(|(_, f, _)| f.wrap_width_px == Some(56.0)));
    assert!(calls.iter().all(|(_, f, _)| f.max_height_px == Some(32.0)));
}

#[test]
fn raster_failure_is_a_frame_error() {
    let mut composer = FrameComposer::new(small_config(), FailingRasterizer);
    let err = composer.compose(&doc_with(1, 1), Style::default()).unwrap_err();
    assert!(matches!(
        err,
        SlidecastError::Synthesis {
            stage: SynthesisStage::Frame,
            ..
        }
    ));
}

#[test]
fn oversized_sprite_is_clipped() {
    let mut img = RgbImage::new(4, 4);
    let sprite = TextSprite {
        width: 8,
        height: 8,
        rgba8_premul: [9u8, 9, 9, 255].repeat(64),
    };
    blit_centered(&mut img, &sprite).unwrap();
    assert!(img.pixels().all(|p| p.0 == [9, 9, 9]));
}

#[test]
fn very_long_title_still_composes() {
    let mut composer = FrameComposer::new(
        small_config(),
        crate::frame::text::ParleyRasterizer::new(None),
    );
    let mut doc = doc_with(1, 1);
    doc.title = "word ".repeat(8000);
    let frames = composer.compose(&doc, Style::default()).unwrap();
    assert_eq!(frames.len(), 3);
    assert!(frames.iter().all(|f| f.image.dimensions() == (64, 32)));
}
