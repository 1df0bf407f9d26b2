use super::{Framebuffer, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CompositeError {
    #[error("region {0:?} is not byte aligned")]
    Unaligned(Region),
    #[error("region {0:?} exceeds the framebuffer")]
    OutOfBounds(Region),
}

/// Pixel data of one region, rows packed back to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubBuffer {
    pub region: Region,
    pub width_bytes: usize,
    pub data: Vec<u8>,
}

/// Copy the rows covered by `region` out of the framebuffer.
///
/// Only whole bytes are copied, so `region.x` and `region.width` must be
/// multiples of 8 (damage tracking guarantees 16).
pub fn extract(fb: &Framebuffer, region: Region) -> Result<SubBuffer, CompositeError> {
    let bpp = Framebuffer::BITS_PER_PIXEL;
    let x_bits = region.x as usize * bpp;
    let width_bits = region.width as usize * bpp;
    if x_bits % 8 != 0 || width_bits % 8 != 0 {
        return Err(CompositeError::Unaligned(region));
    }

    let stride = fb.stride();
    let x_bytes = x_bits / 8;
    let width_bytes = width_bits / 8;
    if x_bytes + width_bytes > stride
        || region.y as usize + region.height as usize > fb.height() as usize
    {
        return Err(CompositeError::OutOfBounds(region));
    }

    let src = fb.as_bytes();
    let mut data = Vec::with_capacity(width_bytes * region.height as usize);
    for k in 0..region.height as usize {
        let start = x_bytes + (region.y as usize + k) * stride;
        data.extend_from_slice(&src[start..start + width_bytes]);
    }

    Ok(SubBuffer {
        region,
        width_bytes,
        data,
    })
}
