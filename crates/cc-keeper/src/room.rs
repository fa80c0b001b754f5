use cc_core::Timestamp;
use tokio::sync::{Mutex, MutexGuard};

use crate::machine::RoomMachine;

/// Everything tracked about one connected room (spec.md §3 `Room`, §4.5
/// `RoomExt`). The mutex is the room's exclusivity lock: every RPC must
/// acquire it, and a request that finds it already held answers
/// `ErrLocked` rather than waiting.
pub struct RoomExt {
    pub display_name: String,
    inner: Mutex<RoomInner>,
}

pub struct RoomInner {
    pub last_seen: Timestamp,
    pub machine: RoomMachine,
}

impl RoomExt {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            inner: Mutex::new(RoomInner {
                last_seen: Timestamp::now(),
                machine: RoomMachine::new(),
            }),
        }
    }

    /// Non-blocking acquire. `None` means the room is busy with another
    /// RPC right now.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, RoomInner>> {
        self.inner.try_lock().ok()
    }
}

impl RoomInner {
    pub fn touch(&mut self) {
        self.last_seen = Timestamp::now();
    }
}
