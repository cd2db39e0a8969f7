//! Time-of-day dependent serving radius

use chrono::{NaiveTime, Timelike};

pub const PEAK_RADIUS_KM: f64 = 3.0;
pub const NORMAL_RADIUS_KM: f64 = 5.0;

const fn secs(h: u32, m: u32, s: u32) -> u32 {
    h * 3600 + m * 60 + s
}

/// Peak windows as (start, end) seconds from midnight, both exclusive
const PEAK_WINDOWS: [(u32, u32); 3] = [
    (secs(7, 59, 59), secs(10, 0, 1)),
    (secs(12, 59, 59), secs(14, 0, 1)),
    (secs(18, 59, 59), secs(21, 0, 1)),
];

/// Maps the time of day to the radius restaurants can deliver within
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServingRadiusPolicy {
    pub peak_radius_km: f64,
    pub normal_radius_km: f64,
}

impl Default for ServingRadiusPolicy {
    fn default() -> Self {
        Self {
            peak_radius_km: PEAK_RADIUS_KM,
            normal_radius_km: NORMAL_RADIUS_KM,
        }
    }
}

impl ServingRadiusPolicy {
    pub fn new(peak_radius_km: f64, normal_radius_km: f64) -> Self {
        Self {
            peak_radius_km,
            normal_radius_km,
        }
    }

    pub fn is_peak(time: NaiveTime) -> bool {
        PEAK_WINDOWS
            .iter()
            .any(|&(start, end)| strictly_between(time, start, end))
    }

    pub fn radius_for(&self, time: NaiveTime) -> f64 {
        if Self::is_peak(time) {
            self.peak_radius_km
        } else {
            self.normal_radius_km
        }
    }
}

fn strictly_between(time: NaiveTime, start: u32, end: u32) -> bool {
    let secs = time.num_seconds_from_midnight();
    let after_start = secs > start || (secs == start && time.nanosecond() > 0);

    after_start && secs < end
}
