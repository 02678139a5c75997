//! Streak tracking with grace-day recovery.
//!
//! [`StreakEngine`] converts chronological completions per (user, goal)
//! into streak counters. Short gaps are bridged from a grace-day budget
//! managed by [`GracePolicy`]; longer gaps and non-chronological input
//! reset the streak to one.

mod engine;
mod grace;
mod policy;
mod repository;
mod risk;
mod state;

pub use engine::{ResetReason, StreakEngine, StreakTransition, StreakUpdate};
pub use grace::{GraceOutcome, GraceRejection};
pub use policy::{GracePolicy, DAYS_PER_WEEK};
pub use repository::{InMemoryStreakRepository, StreakRepository};
pub use risk::StreakAtRisk;
pub use state::{CompletionEvent, StreakKey, StreakState};
