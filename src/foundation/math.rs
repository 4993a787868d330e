pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Composite one premultiplied RGBA8 pixel over an opaque RGB8 pixel.
pub(crate) fn over_opaque_rgb8(dst: &mut [u8], src_premul: &[u8]) {
    let a = u16::from(src_premul[3]);
    if a == 0 {
        return;
    }
    if a == 255 {
        dst.copy_from_slice(&src_premul[..3]);
        return;
    }
    let inv = 255 - a;
    for c in 0..3 {
        let v = u16::from(src_premul[c]) + mul_div255_u16(u16::from(dst[c]), inv);
        dst[c] = v.min(255) as u8;
    }
}
