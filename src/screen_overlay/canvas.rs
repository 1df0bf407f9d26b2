use embedded_graphics::{pixelcolor::BinaryColor, prelude::Point};

use super::paint::MAX_RADIUS;
use super::{CompositeError, DamageRect, Framebuffer, Paint, SolidBrush, SubBuffer, extract};
use crate::event_model::TransformedPoint;

/// Ink color of the brush.
pub const INK: BinaryColor = BinaryColor::Off;

/// The framebuffer together with the damage it has accumulated.
///
/// Painting and damage registration happen in one call, as do extraction and
/// reset, so a caller holding one lock around the canvas never sees pixels
/// without their damage or the other way round.
pub struct Canvas<P = SolidBrush> {
    framebuffer: Framebuffer,
    damage: DamageRect,
    brush: P,
    radius: u32,
}

impl<P: Paint> Canvas<P> {
    pub fn new(width: u32, height: u32, radius: u32, brush: P) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
            damage: DamageRect::empty(width, height),
            brush,
            radius: radius.min(MAX_RADIUS),
        }
    }

    pub fn paint(&mut self, point: &TransformedPoint) {
        let center = Point::new(point.x.round() as i32, point.y.round() as i32);
        self.brush
            .fill_circle(&mut self.framebuffer, center, self.radius, INK);
        self.damage.accumulate(point.x, point.y, self.radius);
    }

    /// Extract the damaged region and start over. `None` when nothing was
    /// painted since the last call.
    pub fn take_damage(&mut self) -> Result<Option<SubBuffer>, CompositeError> {
        let Some(region) = self.damage.region() else {
            return Ok(None);
        };
        self.damage.reset();
        extract(&self.framebuffer, region).map(Some)
    }

    pub fn damage(&self) -> &DamageRect {
        &self.damage
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_model::ToolType;
    use crate::screen_overlay::Region;

    fn point(x: f64, y: f64) -> TransformedPoint {
        TransformedPoint {
            x,
            y,
            touch_down: true,
            pressure: 0,
            tool: ToolType::Pen,
        }
    }

    #[test]
    fn paint_then_take_returns_the_stroke() {
        let mut canvas = Canvas::new(256, 128, 4, SolidBrush);
        canvas.paint(&point(40.0, 30.0));

        let sub = canvas.take_damage().unwrap().unwrap();
        assert_eq!(
            sub.region,
            Region {
                x: 32,
                y: 26,
                width: 16,
                height: 9
            }
        );
        // center row, center pixel 40 is bit 0 of the second byte
        let row = 30 - 26;
        assert_eq!(sub.data[row * sub.width_bytes + 1] & 0x80, 0);
        assert!(canvas.damage().is_empty());
        assert_eq!(canvas.take_damage().unwrap(), None);
    }

    #[test]
    fn oversized_brush_inks_whole_panel() {
        let mut canvas = Canvas::new(64, 32, u32::MAX, SolidBrush);
        canvas.paint(&point(10.0, 10.0));

        assert!(canvas.framebuffer().as_bytes().iter().all(|&b| b == 0));
        let sub = canvas.take_damage().unwrap().unwrap();
        assert_eq!(
            sub.region,
            Region {
                x: 0,
                y: 0,
                width: 64,
                height: 32
            }
        );
    }

    #[test]
    fn nothing_painted_means_no_refresh() {
        let mut canvas = Canvas::new(64, 64, 4, SolidBrush);
        assert_eq!(canvas.take_damage().unwrap(), None);
    }
}
