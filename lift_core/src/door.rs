//! Door dwell timer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use lift_traits::{Clock, ElevatorIo};

use crate::error::Result;
use crate::hw_error::{fire_and_forget, read_input};

/// Default dwell before the door closes on its own.
pub const DEFAULT_OPEN_INTERVAL: Duration = Duration::from_secs(3);

/// Keeps the door open for a bounded interval, restarted by obstruction.
pub struct DoorTimer {
    is_open: bool,
    deadline: Instant,
    open_interval: Duration,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl core::fmt::Debug for DoorTimer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DoorTimer")
            .field("is_open", &self.is_open)
            .field("open_interval", &self.open_interval)
            .field("remaining", &self.remaining())
            .finish()
    }
}

impl DoorTimer {
    pub fn new(open_interval: Duration, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let deadline = clock.now();
        Self {
            is_open: false,
            deadline,
            open_interval,
            clock,
        }
    }

    /// Open the door (or keep it open) and restart the full dwell.
    pub fn request_open_and_autoclose<I: ElevatorIo + ?Sized>(&mut self, io: &mut I) {
        fire_and_forget(io.set_door(true), "set_door");
        if !self.is_open {
            tracing::debug!(interval_ms = self.open_interval.as_millis() as u64, "door open");
        }
        self.is_open = true;
        self.deadline = self.clock.now() + self.open_interval;
    }

    /// Close the door once the dwell has run out. An obstruction restarts it.
    pub fn update<I: ElevatorIo + ?Sized>(&mut self, io: &mut I) -> Result<()> {
        if !self.is_open {
            return Ok(());
        }
        let now = self.clock.now();
        if read_input(io.obstruction_signal(), "reading obstruction signal")? {
            self.deadline = now + self.open_interval;
            tracing::trace!("door obstructed, dwell restarted");
        } else if now >= self.deadline {
            fire_and_forget(io.set_door(false), "set_door");
            self.is_open = false;
            tracing::debug!("door closed");
        }
        Ok(())
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Time left before the door closes; zero when closed.
    pub fn remaining(&self) -> Duration {
        if !self.is_open {
            return Duration::ZERO;
        }
        self.deadline.saturating_duration_since(self.clock.now())
    }

    pub fn open_interval(&self) -> Duration {
        self.open_interval
    }
}
