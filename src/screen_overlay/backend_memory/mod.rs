use std::sync::{Arc, Mutex};

use crate::screen_overlay::{RefreshService, Region};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCall {
    pub region: Region,
    pub mode: u16,
    pub hold: bool,
    pub buffer: Vec<u8>,
}

/// Keeps every refresh it is given. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingRefresh {
    calls: Arc<Mutex<Vec<RefreshCall>>>,
}

impl RecordingRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RefreshCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl RefreshService for RecordingRefresh {
    fn refresh(&mut self, buffer: &[u8], region: Region, mode: u16, hold: bool) -> anyhow::Result<()> {
        let call = RefreshCall {
            region,
            mode,
            hold,
            buffer: buffer.to_vec(),
        };
        self.calls
            .lock()
            .map_err(|_| anyhow::anyhow!("refresh record poisoned"))?
            .push(call);
        Ok(())
    }
}
