//! Schedule Module
//!
//! The interval schedule every review decision is made against:
//! - Ordered stage intervals walked by successful reviews
//! - One rolling interval for graduated items
//! - Minute-granular storage with a day-granular legacy surface

mod config;
mod duration;

pub use config::{
    DEFAULT_ROLLING_MINUTES, DEFAULT_STAGE_DAYS, DEFAULT_STAGE_MINUTES, ScheduleConfig,
    normalize_stage_minutes,
};
pub use duration::{
    IntervalUnit, MAX_INTERVAL_MINUTES, MIN_PER_DAY, MIN_PER_HOUR, ParseIntervalError,
    best_unit, describe_schedule, format_duration, parse_interval_token, parse_schedule,
};
