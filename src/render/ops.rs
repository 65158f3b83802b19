use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::foundation::math::mul_div255_u8;

/// Premultiplied `src over dst`, in place.
pub(crate) fn premul_over_in_place(dst: &mut [u8], src: &[u8]) -> FlipbookResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FlipbookError::invariant(
            "premul_over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = u16::from(s[3]);
        if sa == 0 {
            continue;
        }
        if sa == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - sa;
        for c in 0..4 {
            d[c] = s[c].saturating_add(mul_div255_u8(u16::from(d[c]), inv));
        }
    }
    Ok(())
}

/// Premultiplied `dst out mask`: scales every dst pixel by `1 - mask.alpha`, in place.
pub(crate) fn premul_dst_out_in_place(dst: &mut [u8], mask: &[u8]) -> FlipbookResult<()> {
    if dst.len() != mask.len() || !dst.len().is_multiple_of(4) {
        return Err(FlipbookError::invariant(
            "premul_dst_out_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, m) in dst.chunks_exact_mut(4).zip(mask.chunks_exact(4)) {
        let ma = u16::from(m[3]);
        if ma == 0 {
            continue;
        }
        let keep = 255 - ma;
        for c in d.iter_mut() {
            *c = mul_div255_u8(u16::from(*c), keep);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/ops.rs"]
mod tests;
