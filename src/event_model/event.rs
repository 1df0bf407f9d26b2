use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tilt {
    pub x: i16,
    pub y: i16,
}

/// Tool reported by the digitizer, numbered with the Linux input event codes
/// `BTN_TOOL_PEN` and `BTN_TOOL_RUBBER`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum ToolType {
    #[default]
    Pen = 0x140,
    Eraser = 0x141,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PenButtons {
    pub barrel: bool,
    pub barrel2: bool,
}

/// One decoded sample report, still in sensor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawSample {
    pub tip_switch: bool,
    pub eraser: bool,
    pub invert: bool,
    pub in_proximity: bool,
    pub buttons: PenButtons,
    pub x: u16,
    pub y: u16,
    /// Raw 16-bit field; only the low 12 bits carry pressure.
    pub pressure: u16,
    pub tilt: Tilt,
    /// Positive distance above the sensor surface.
    pub hover_height: i16,
    pub tool: ToolType,
}

/// A sample mapped into display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformedPoint {
    pub x: f64,
    pub y: f64,
    pub touch_down: bool,
    pub pressure: u16,
    pub tool: ToolType,
}
