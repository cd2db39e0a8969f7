//! Application state for shared services

use std::fmt::Debug;
use std::sync::Arc;

use chrono::NaiveTime;

use crate::domain::{Cache, RestaurantRepository};
use crate::infrastructure::services::DiscoveryService;

/// Source of the current time of day
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> NaiveTime;
}

/// Server's local wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        chrono::Local::now().time()
    }
}

/// Always reports the same time
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}

/// Application state containing shared services
#[derive(Debug, Clone)]
pub struct AppState {
    pub discovery: Arc<DiscoveryService>,
    pub repository: Arc<dyn RestaurantRepository>,
    pub cache: Option<Arc<dyn Cache>>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        discovery: Arc<DiscoveryService>,
        repository: Arc<dyn RestaurantRepository>,
        cache: Option<Arc<dyn Cache>>,
    ) -> Self {
        Self {
            discovery,
            repository,
            cache,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
