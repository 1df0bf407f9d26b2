//! Sensor to display mapping.
//!
//! Flips are defined in the sensor's native axes and are applied before the
//! optional transpose. Swapping that order mirrors the wrong display axis
//! whenever the sensor is not square.

use crate::config::DeviceInfo;
use crate::event_model::{RawSample, TransformedPoint};
use crate::tablet_driver::DeviceFeatures;

/// Pressure is a 12-bit quantity carried in a 16-bit field.
pub const PRESSURE_MASK: u16 = 0x0FFF;

pub fn transform(raw: &RawSample, features: &DeviceFeatures, cfg: &DeviceInfo) -> TransformedPoint {
    let mut raw_x = raw.x.min(features.x_max);
    let mut raw_y = raw.y.min(features.y_max);

    if cfg.flip_x {
        raw_x = features.x_max - raw_x;
    }
    if cfg.flip_y {
        raw_y = features.y_max - raw_y;
    }

    let (x, y) = if cfg.transpose_xy {
        (raw_y, raw_x)
    } else {
        (raw_x, raw_y)
    };

    TransformedPoint {
        x: f64::from(x) * cfg.x_scale + cfg.x_offset,
        y: f64::from(y) * cfg.y_scale + cfg.y_offset,
        touch_down: i32::from(raw.hover_height) <= cfg.touchdown_height,
        pressure: raw.pressure & PRESSURE_MASK,
        tool: raw.tool,
    }
}
