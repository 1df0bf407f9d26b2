use std::sync::Mutex;

use crate::config::{DebugMode, DeviceInfo};
use crate::input_devices::Transport;
use crate::input_devices::digitizer::{Digitizer, DigitizerError};
use crate::screen_mapping::transform;
use crate::screen_overlay::{Canvas, Paint};
use crate::tablet_driver::{Decoded, DeviceFeatures};

use super::lock;

/// What one pass of the sampling loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The pen was down and a dab was painted.
    Painted,
    /// A sample arrived but the pen was above the touchdown height.
    Hovering,
    /// The device had nothing new.
    Ignored,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplerStats {
    pub painted: u64,
    pub hovering: u64,
    pub ignored: u64,
    pub transport_errors: u64,
    pub decode_errors: u64,
}

impl SamplerStats {
    pub fn record(&mut self, outcome: &Result<Step, DigitizerError>) {
        match outcome {
            Ok(Step::Painted) => self.painted += 1,
            Ok(Step::Hovering) => self.hovering += 1,
            Ok(Step::Ignored) => self.ignored += 1,
            Err(DigitizerError::Transport(_)) => self.transport_errors += 1,
            Err(DigitizerError::Decode(_)) => self.decode_errors += 1,
        }
    }
}

/// Read, decode and map one sample, painting it when the pen is down.
pub fn sample_once<T: Transport, P: Paint>(
    digitizer: &mut Digitizer<T>,
    features: &DeviceFeatures,
    cfg: &DeviceInfo,
    canvas: &Mutex<Canvas<P>>,
) -> Result<Step, DigitizerError> {
    let raw = match digitizer.read_sample(features)? {
        Decoded::Sample(raw) => raw,
        Decoded::Ignored => return Ok(Step::Ignored),
    };

    if cfg.debug_mode == DebugMode::PrintSamples {
        tracing::info!("{:7} , {:7}, {:7}", raw.x, raw.y, raw.hover_height);
    }

    let point = transform(&raw, features, cfg);
    tracing::trace!(?point);
    if !point.touch_down {
        return Ok(Step::Hovering);
    }

    lock(canvas).paint(&point);
    Ok(Step::Painted)
}
