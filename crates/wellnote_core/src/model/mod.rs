//! Journal domain model.
//!
//! # Responsibility
//! - Define the value records stored by the journal (sleep, meal, exercise,
//!   settings).
//! - Own text validation for calendar-day keys and wall-clock times.
//!
//! # Invariants
//! - Records are plain values; mutation is always whole-record replacement.
//! - Every date that reaches storage went through `DayKey` parsing.

pub mod day;
pub mod entry;
pub mod settings;
