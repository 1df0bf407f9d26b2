pub mod event;

pub use event::{PenButtons, RawSample, Tilt, ToolType, TransformedPoint};
