use super::*;

#[test]
fn pixel_size_rounds_up_and_clamps() {
    let b = TextBounds {
        width: 10.2,
        height: 3.0,
    };
    assert_eq!(b.pixel_size(), (11, 3));
    let neg = TextBounds {
        width: -4.0,
        height: f32::NAN,
    };
    assert_eq!(neg.pixel_size(), (0, 0));
}

#[test]
fn empty_sprite_reports_empty() {
    assert!(TextSprite::empty().is_empty());
    let s = TextSprite {
        width: 1,
        height: 1,
        rgba8_premul: vec![0, 0, 0, 0],
    };
    assert!(!s.is_empty());
}

#[test]
fn missing_preferred_font_falls_back_without_error() {
    let dir = tempfile::tempdir().unwrap();
    let r = ParleyRasterizer::new(Some(&dir.path().join("nope.ttf")));
    assert!(!matches!(r.font_source(), FontSource::Preferred(_)));
}

#[test]
fn garbage_font_file_is_not_preferred() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ttf");
    std::fs::write(&path, b"not a font").unwrap();
    let r = ParleyRasterizer::new(Some(&path));
    assert!(!matches!(r.font_source(), FontSource::Preferred(_)));
}

#[test]
fn render_sprite_matches_measured_bounds() {
    let mut r = ParleyRasterizer::new(None);
    let font = FontSpec {
        size_px: 32.0,
        wrap_width_px: Some(400.0),
        max_height_px: None,
    };
    let sprite = r.render("Hello", &font, Rgb8::WHITE).unwrap();
    if *r.font_source() == FontSource::Unavailable {
        assert!(sprite.is_empty());
        assert_eq!(r.measure("Hello", &font), TextBounds::default());
        return;
    }
    let (w, h) = r.measure("Hello", &font).pixel_size();
    assert_eq!((sprite.width, sprite.height), (w, h));
    assert_eq!(sprite.rgba8_premul.len(), (w * h * 4) as usize);
    assert!(sprite.rgba8_premul.chunks_exact(4).any(|px| px[3] > 0));
}

#[test]
fn non_positive_size_renders_nothing() {
    let mut r = ParleyRasterizer::new(None);
    let font = FontSpec {
        size_px: 0.0,
        wrap_width_px: None,
        max_height_px: None,
    };
    assert!(r.render("Hello", &font, Rgb8::BLACK).unwrap().is_empty());
}

#[test]
fn oversized_text_is_clipped_to_the_frame() {
    let mut r = ParleyRasterizer::new(None);
    let font = FontSpec {
        size_px: 80.0,
        wrap_width_px: Some(1728.0),
        max_height_px: Some(1080.0),
    };
    let text = "word ".repeat(8000);
    let sprite = r.render(&text, &font, Rgb8::WHITE).unwrap();
    if *r.font_source() == FontSource::Unavailable {
        assert!(sprite.is_empty());
        return;
    }
    assert!(r.measure(&text, &font).height > 1080.0);
    assert_eq!(sprite.height, 1080);
    assert!(sprite.width <= 1728);
    assert_eq!(
        sprite.rgba8_premul.len(),
        (sprite.width * sprite.height * 4) as usize
    );
    assert!(sprite.rgba8_premul.chunks_exact(4).any(|px| px[3] > 0));
}
