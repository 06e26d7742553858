use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use rsvp_core::clock::{Clock, SystemClock};
use rsvp_core::config::{Settings, ValidationConfig};

/// Time-dependent inputs shared by every operation that looks at "now".
#[derive(Debug, Clone)]
pub struct ServiceContext {
    clock: Arc<dyn Clock>,
    start_time_tolerance: TimeDelta,
}

impl ServiceContext {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, validation: &ValidationConfig) -> Self {
        Self {
            clock,
            start_time_tolerance: validation.start_time_tolerance(),
        }
    }

    /// Wall clock plus the configured tolerances.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(Arc::new(SystemClock), &settings.validation)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub const fn start_time_tolerance(&self) -> TimeDelta {
        self.start_time_tolerance
    }
}
