//! Recurrence expansion and calendar mapping for habits and tasks.
//!
//! This crate turns declarative schedules into date-keyed content:
//! - `schedule` and `resolve` describe and interpret schedules
//! - `expand` and `combine` compute per-view mappings
//! - `cache` and `aggregate` serve them to a calendar
//!
//! Expansion is pure and synchronous; the only I/O lives in `config`.

pub mod aggregate;
pub mod cache;
pub mod combine;
pub mod config;
pub mod date_range;
pub mod error;
pub mod expand;
pub mod occurrence;
pub mod resolve;
pub mod schedule;
pub mod store;

pub use aggregate::{CalendarAggregator, DayItem, DaySummary};
pub use cache::{CacheStats, MappingCache};
pub use combine::{ViewType, combine_for_view};
pub use config::HabitCalConfig;
pub use date_range::DateRange;
pub use error::{HabitCalError, HabitCalResult};
pub use expand::{ExpandOptions, expand_daily, expand_monthly, expand_weekly};
pub use occurrence::{Mapping, Occurrence, ReminderDisplay, StepDisplay, StepTiming};
pub use schedule::{
    ClockTime, DayEntry, DayOfMonth, DayStep, MonthEntry, MonthStep, Reminder, RepeatBound,
    ScheduleDefinition, Span, StartTime, WeekEntry, WeekStep,
};
pub use store::{
    ChangeKind, EntityKind, MemoryStore, ScheduleStore, StoreChanges, StoreSnapshot, TrackedItem,
};
