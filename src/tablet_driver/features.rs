use num_enum::{FromPrimitive, IntoPrimitive};

use super::{DecodeError, check_len, i16_le, u16_le};

/// `distance_max` value reported by parts that measure hover height.
pub const DISTANCE_MAX: u8 = 255;

const X_MAX_AT: usize = 3;
const Y_MAX_AT: usize = 5;
const PRESSURE_MAX_AT: usize = 11;
const FW_VERSION_AT: usize = 13;
const DISTANCE_MAX_AT: usize = 16;
const TILT_X_MAX_AT: usize = 17;
const TILT_Y_MAX_AT: usize = 19;

/// Capability tier of the digitizer IC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Generation {
    /// G9 or earlier: neither tilt nor hover height in pen reports.
    #[default]
    Base = 0,
    /// G12 and later: tilt and hover height are present.
    WithHeight = 1,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSupport {
    pub distance: bool,
    pub tilt: bool,
}

/// What the digitizer reported about itself. Immutable once negotiated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceFeatures {
    pub x_max: u16,
    pub y_max: u16,
    pub pressure_max: u16,
    pub fw_version: u16,
    pub distance_max: u8,
    pub tilt_x_max: i16,
    pub tilt_y_max: i16,
    pub support: FeatureSupport,
    pub generation: Generation,
}

/// Parse the 22-byte answer to the feature query.
pub fn negotiate_features(bytes: &[u8]) -> Result<DeviceFeatures, DecodeError> {
    let buf = check_len(bytes)?;

    let distance_max = buf[DISTANCE_MAX_AT];
    let tilt_x_max = i16_le(buf, TILT_X_MAX_AT);
    let tilt_y_max = i16_le(buf, TILT_Y_MAX_AT);
    let support = FeatureSupport {
        distance: distance_max != 0,
        tilt: tilt_x_max != 0 && tilt_y_max != 0,
    };

    Ok(DeviceFeatures {
        x_max: u16_le(buf, X_MAX_AT),
        y_max: u16_le(buf, Y_MAX_AT),
        pressure_max: u16_le(buf, PRESSURE_MAX_AT),
        fw_version: u16_le(buf, FW_VERSION_AT),
        distance_max,
        tilt_x_max,
        tilt_y_max,
        support,
        generation: detect_generation(support, distance_max),
    })
}

/// Generation detection as shipped by the vendor driver. The first branch
/// assigns the same tag as the fallback and cannot change the outcome: only
/// `distance_max == DISTANCE_MAX` selects `WithHeight`. A part with tilt but a
/// smaller distance range stays `Base` and its tilt fields are never read.
/// Kept as-is until hardware shows which behavior is intended.
fn detect_generation(support: FeatureSupport, distance_max: u8) -> Generation {
    let mut generation = Generation::Base;

    if !support.distance && !support.tilt {
        generation = Generation::Base;
    } else if distance_max == DISTANCE_MAX {
        generation = Generation::WithHeight;
    }

    generation
}
