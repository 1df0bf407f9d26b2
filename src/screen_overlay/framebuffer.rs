use std::convert::Infallible;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*, primitives::Rectangle};

/// Off-screen 1 bit per pixel image of the whole panel.
///
/// Pixels are packed MSB first, rows are `stride` bytes apart. A set bit is
/// white (`BinaryColor::On`), a cleared bit is ink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl Framebuffer {
    pub const BITS_PER_PIXEL: usize = 1;

    /// A blank (white) framebuffer.
    pub fn new(width: u32, height: u32) -> Self {
        let stride = (width as usize).div_ceil(8);
        Self {
            width,
            height,
            stride,
            data: vec![0xFF; stride * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<BinaryColor> {
        let (idx, mask) = self.locate(x, y)?;
        Some(if self.data[idx] & mask != 0 {
            BinaryColor::On
        } else {
            BinaryColor::Off
        })
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: BinaryColor) {
        if let Some((idx, mask)) = self.locate(x, y) {
            match color {
                BinaryColor::On => self.data[idx] |= mask,
                BinaryColor::Off => self.data[idx] &= !mask,
            }
        }
    }

    fn locate(&self, x: u32, y: u32) -> Option<(usize, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.stride + x as usize / 8;
        Some((idx, 0x80 >> (x % 8)))
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            self.set_pixel(point.x as u32, point.y as u32, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        for point in area.points() {
            self.set_pixel(point.x as u32, point.y as u32, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.data.fill(match color {
            BinaryColor::On => 0xFF,
            BinaryColor::Off => 0x00,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_fill_is_clipped_to_panel() {
        let mut fb = Framebuffer::new(16, 4);
        let area = Rectangle::new(Point::new(-100, 2), Size::new(1_000_000, 1_000_000));
        fb.fill_solid(&area, BinaryColor::Off).unwrap();
        assert_eq!(fb.as_bytes(), &[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0]);
    }

    #[test]
    fn stride_rounds_up_to_whole_bytes() {
        let fb = Framebuffer::new(13, 2);
        assert_eq!(fb.stride(), 2);
        assert_eq!(fb.as_bytes().len(), 4);
        assert!(fb.as_bytes().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn pixels_are_msb_first() {
        let mut fb = Framebuffer::new(16, 2);
        fb.set_pixel(0, 0, BinaryColor::Off);
        fb.set_pixel(9, 1, BinaryColor::Off);
        assert_eq!(fb.as_bytes(), &[0x7F, 0xFF, 0xFF, 0xBF]);
        assert_eq!(fb.pixel(9, 1), Some(BinaryColor::Off));
        assert_eq!(fb.pixel(8, 1), Some(BinaryColor::On));
        assert_eq!(fb.pixel(16, 0), None);
    }

    #[test]
    fn out_of_range_pixels_are_dropped() {
        let mut fb = Framebuffer::new(8, 1);
        fb.draw_iter([Pixel(Point::new(-1, 0), BinaryColor::Off), Pixel(Point::new(8, 0), BinaryColor::Off)])
            .unwrap();
        assert_eq!(fb.as_bytes(), &[0xFF]);
    }
}
