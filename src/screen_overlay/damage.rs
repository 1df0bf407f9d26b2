//! Running bounding box of panel pixels changed since the last refresh.
//!
//! Horizontal bounds are widened to 16-pixel blocks because the panel
//! controller only accepts partial updates on that column granularity.
//! Vertical bounds are addressed per row and stay exact. This is a property
//! of the target controller, not of damage tracking in general.

/// Column block size of a partial refresh.
pub const X_ALIGN: i32 = 16;

/// A rectangle handed to the compositor and the refresh service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Dirty rectangle accumulator.
///
/// `max_x` is exclusive (a block boundary), `max_y` is the last dirty row.
/// The empty state keeps `max_x == 0 && max_y == 0` and the minima at the
/// panel extent so the next point establishes real bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
    panel_width: i32,
    panel_height: i32,
}

impl DamageRect {
    pub fn empty(panel_width: u32, panel_height: u32) -> Self {
        let mut rect = Self {
            min_x: 0,
            min_y: 0,
            max_x: 0,
            max_y: 0,
            panel_width: panel_width as i32,
            panel_height: panel_height as i32,
        };
        rect.reset();
        rect
    }

    pub fn reset(&mut self) {
        self.min_x = self.panel_width;
        self.min_y = self.panel_height;
        self.max_x = 0;
        self.max_y = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.max_x == 0 || self.max_y == 0
    }

    /// Grow to cover a brush of `radius` centered on `(x, y)`.
    pub fn accumulate(&mut self, x: f64, y: f64, radius: u32) {
        if self.panel_width <= 0 || self.panel_height <= 0 {
            return;
        }

        let r = f64::from(radius);
        let left = (x - r).floor() as i32;
        let right = (x + r).ceil() as i32;
        let top = (y - r).floor() as i32;
        let bottom = (y + r).ceil() as i32;

        if right < 0 || left >= self.panel_width || bottom < 0 || top >= self.panel_height {
            return;
        }

        let left = align_down(left).clamp(0, self.panel_width);
        let right = align_up(right).clamp(0, self.panel_width);
        let top = top.clamp(0, self.panel_height - 1);
        let bottom = bottom.clamp(0, self.panel_height - 1);

        self.min_x = self.min_x.min(left);
        self.max_x = self.max_x.max(right);
        self.min_y = self.min_y.min(top);
        self.max_y = self.max_y.max(bottom);
    }

    pub fn region(&self) -> Option<Region> {
        if self.is_empty() {
            return None;
        }
        Some(Region {
            x: self.min_x as u32,
            y: self.min_y as u32,
            width: (self.max_x - self.min_x) as u32,
            height: (self.max_y - self.min_y + 1) as u32,
        })
    }
}

fn align_down(v: i32) -> i32 {
    v.div_euclid(X_ALIGN) * X_ALIGN
}

fn align_up(v: i32) -> i32 {
    v.saturating_add(X_ALIGN - 1).div_euclid(X_ALIGN) * X_ALIGN
}
