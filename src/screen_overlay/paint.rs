use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, PrimitiveStyle},
};

use super::Framebuffer;

/// Largest brush radius; the circle rasterizer squares 32-bit distances.
pub const MAX_RADIUS: u32 = 8191;

/// Brush painting into the framebuffer.
pub trait Paint: Send {
    fn fill_circle(&self, fb: &mut Framebuffer, center: Point, radius: u32, color: BinaryColor);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SolidBrush;

impl Paint for SolidBrush {
    fn fill_circle(&self, fb: &mut Framebuffer, center: Point, radius: u32, color: BinaryColor) {
        let diameter = radius.min(MAX_RADIUS).saturating_mul(2).saturating_add(1);
        let Ok(()) = Circle::with_center(center, diameter)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(fb);
    }
}
