use crate::error::{PicblendError, PicblendResult};

/// Straight-alpha RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// Source-over for straight-alpha pixels.
///
/// `out_a = sa + da * (1 - sa)`; color channels are alpha-weighted and
/// un-premultiplied back so buffers stay straight-alpha end to end (surfaces
/// are exported to PNG as-is).
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let sa = src[3] as u32;
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }

    let da = dst[3] as u32;
    let inv = 255 - sa;
    let out_a = sa * 255 + da * inv; // scaled by 255

    if out_a == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let sc = src[i] as u32 * sa * 255;
        let dc = dst[i] as u32 * da * inv;
        out[i] = ((sc + dc + out_a / 2) / out_a) as u8;
    }
    out[3] = ((out_a + 127) / 255) as u8;
    out
}

/// Blends `src` over `dst` in place. Both must be equal-length RGBA8 buffers.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> PicblendResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PicblendError::validation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}
