use crate::event_model::{PenButtons, RawSample, Tilt, ToolType};

use super::{DecodeError, DeviceFeatures, Generation, REPORT_SIZE, check_len, i16_le, u16_le};

/// Observed header of a valid pen report. Undocumented by the vendor.
pub const PEN_REPORT_HEADER: [u8; 3] = [0x13, 0x00, 0x1a];

pub const TIP_SWITCH: u8 = 0x01;
pub const BARREL_SWITCH: u8 = 0x02;
pub const ERASER: u8 = 0x04;
pub const INVERT: u8 = 0x08;
pub const BARREL_SWITCH_2: u8 = 0x10;
pub const IN_PROXIMITY: u8 = 0x20;

/// Declared length of a G12 pen report, which carries an 8-bit height.
pub const LEN_G12: u8 = 15;
/// Minimum declared length of a G14+ pen report, which carries a 16-bit height.
pub const LEN_AG14: u8 = 17;

const STATUS_AT: usize = 3;
const X_AT: usize = 4;
const Y_AT: usize = 6;
const PRESSURE_AT: usize = 8;
const SHORT_HEIGHT_AT: usize = 10;
const TILT_X_AT: usize = 11;
const TILT_Y_AT: usize = 13;
const LONG_HEIGHT_AT: usize = 15;

/// Outcome of decoding one pen report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Sample(RawSample),
    /// Header did not match; the device had nothing new.
    Ignored,
}

/// Per-connection decoder state.
///
/// The digitizer only identifies the tool when the pen enters proximity, so
/// the tool is latched on that edge and carried until the pen leaves.
#[derive(Debug, Clone, Default)]
pub struct DecoderSession {
    in_proximity: bool,
    tool: ToolType,
    last: Option<RawSample>,
}

impl DecoderSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_proximity(&self) -> bool {
        self.in_proximity
    }

    pub fn tool(&self) -> ToolType {
        self.tool
    }

    /// Last successfully decoded sample. Ignored and rejected reports do not
    /// touch it.
    pub fn last_sample(&self) -> Option<&RawSample> {
        self.last.as_ref()
    }
}

/// Decode one 22-byte pen report.
pub fn decode_sample(
    bytes: &[u8],
    features: &DeviceFeatures,
    session: &mut DecoderSession,
) -> Result<Decoded, DecodeError> {
    let buf = check_len(bytes)?;

    if buf[..3] != PEN_REPORT_HEADER {
        return Ok(Decoded::Ignored);
    }

    let status = buf[STATUS_AT];
    let eraser = status & ERASER != 0;
    let invert = status & INVERT != 0;
    let in_proximity = status & IN_PROXIMITY != 0;

    if !session.in_proximity {
        session.tool = if eraser || invert {
            ToolType::Eraser
        } else {
            ToolType::Pen
        };
    }
    session.in_proximity = in_proximity;

    let mut sample = RawSample {
        tip_switch: status & TIP_SWITCH != 0,
        eraser,
        invert,
        in_proximity,
        buttons: PenButtons {
            barrel: status & BARREL_SWITCH != 0,
            barrel2: status & BARREL_SWITCH_2 != 0,
        },
        x: u16_le(buf, X_AT),
        y: u16_le(buf, Y_AT),
        pressure: u16_le(buf, PRESSURE_AT),
        tilt: Tilt::default(),
        hover_height: 0,
        tool: session.tool,
    };

    if features.generation == Generation::WithHeight {
        sample.tilt = Tilt {
            x: i16_le(buf, TILT_X_AT),
            y: i16_le(buf, TILT_Y_AT),
        };
        sample.hover_height = hover_height(buf);
    }

    session.last = Some(sample);
    Ok(Decoded::Sample(sample))
}

/// Hover height, located by the declared report length in byte 0.
fn hover_height(buf: &[u8; REPORT_SIZE]) -> i16 {
    let declared_len = buf[0];
    if declared_len == LEN_G12 {
        i16::from(buf[SHORT_HEIGHT_AT])
    } else if declared_len >= LEN_AG14 {
        // reported as a negative distance
        i16_le(buf, LONG_HEIGHT_AT).wrapping_neg()
    } else {
        0
    }
}
