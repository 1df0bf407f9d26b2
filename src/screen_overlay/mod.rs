/// Refresh backend that only logs, for running without a panel driver.
pub mod backend_log;
/// Refresh backend that records calls in memory.
pub mod backend_memory;
pub mod canvas;
pub mod compositor;
pub mod damage;
pub mod framebuffer;
pub mod paint;

pub use backend_log::TracingRefresh;
pub use backend_memory::{RecordingRefresh, RefreshCall};
pub use canvas::Canvas;
pub use compositor::{CompositeError, SubBuffer, extract};
pub use damage::{DamageRect, Region};
pub use framebuffer::Framebuffer;
pub use paint::{Paint, SolidBrush};

/// The panel controller's partial update. Display semantics of `mode` and
/// `hold` belong to the controller; they are passed through untouched.
pub trait RefreshService: Send {
    fn refresh(&mut self, buffer: &[u8], region: Region, mode: u16, hold: bool) -> anyhow::Result<()>;
}
