use crate::screen_overlay::{RefreshService, Region};

/// Logs each partial refresh instead of driving a panel.
#[derive(Debug, Default)]
pub struct TracingRefresh {
    count: u64,
}

impl TracingRefresh {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RefreshService for TracingRefresh {
    fn refresh(&mut self, buffer: &[u8], region: Region, mode: u16, hold: bool) -> anyhow::Result<()> {
        self.count += 1;
        tracing::debug!(
            "refresh #{} x={} y={} w={} h={} mode={mode} hold={hold} ({} bytes)",
            self.count,
            region.x,
            region.y,
            region.width,
            region.height,
            buffer.len()
        );
        Ok(())
    }
}
