//! Host-side glue between a [`StreakRepository`] and the [`StreakEngine`].
//!
//! Every write runs load → transition → save for a single key. Writes take
//! `&mut self`, so one tracker is a single writer; hosts sharing a tracker
//! across threads wrap it in a `Mutex`.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::achievements::{AchievementSignals, ActivityKind};
use crate::error::Result;
use crate::streak::{
    CompletionEvent, GraceOutcome, StreakAtRisk, StreakEngine, StreakKey, StreakRepository,
    StreakState, StreakUpdate,
};

/// Applies completions to persisted streak state.
pub struct StreakTracker<R: StreakRepository> {
    engine: StreakEngine,
    repository: R,
}

impl<R: StreakRepository> StreakTracker<R> {
    /// Tracker with the default engine.
    pub fn new(repository: R) -> Self {
        Self::with_engine(StreakEngine::new(), repository)
    }

    pub fn with_engine(engine: StreakEngine, repository: R) -> Self {
        Self { engine, repository }
    }

    pub fn engine(&self) -> &StreakEngine {
        &self.engine
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    /// Apply one completion event.
    ///
    /// Missed days are not fed to the engine (they only show up as gaps),
    /// so `Ok(None)` is returned for them.
    pub fn record(&mut self, event: &CompletionEvent) -> Result<Option<StreakUpdate>> {
        if !event.achieved {
            tracing::trace!(key = %event.key(), date = %event.date, "skipping missed day");
            return Ok(None);
        }

        let key = event.key();
        let prior = self.repository.load(&key)?;
        let update = self.engine.step(prior.as_ref(), &key, event.date);
        self.repository.save(&update.state)?;
        Ok(Some(update))
    }

    /// Apply events in the order given; returns how many advanced a streak
    /// or started a new one.
    pub fn replay<'a, I>(&mut self, events: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a CompletionEvent>,
    {
        let mut applied = 0;
        for event in events {
            if self.record(event)?.is_some() {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Spend a grace day on `missed_date`.
    ///
    /// Business-rule rejections come back as an unsuccessful outcome;
    /// only storage failures are errors.
    pub fn use_grace_day(&mut self, key: &StreakKey, missed_date: NaiveDate) -> Result<GraceOutcome> {
        let prior = self.repository.load(key)?;
        let result = self.engine.use_grace_day(prior.as_ref(), missed_date);

        match &result {
            Ok(state) => self.repository.save(state)?,
            Err(rejection) => {
                tracing::debug!(%key, %missed_date, %rejection, "grace day rejected");
            }
        }

        Ok(GraceOutcome::from(result))
    }

    pub fn state(&self, key: &StreakKey) -> Result<Option<StreakState>> {
        self.repository.load(key)
    }

    pub fn states_for_user(&self, user_id: &str) -> Result<Vec<StreakState>> {
        self.repository.load_for_user(user_id)
    }

    /// Streaks recoverable by a completion today, across all users.
    pub fn streaks_at_risk(&self, today: NaiveDate) -> Result<Vec<StreakAtRisk>> {
        let states = self.repository.load_all()?;
        Ok(self.engine.streaks_at_risk(&states, today))
    }

    /// Achievement signals for one user.
    pub fn signals_for_user(
        &self,
        user_id: &str,
        activity_counts: BTreeMap<ActivityKind, u32>,
        today: NaiveDate,
    ) -> Result<AchievementSignals> {
        let states = self.states_for_user(user_id)?;
        Ok(AchievementSignals::from_states(&states, activity_counts, today))
    }
}
