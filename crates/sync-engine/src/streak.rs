//! Day-boundary derived state: study streak and quote-of-the-day
//!
//! Pure calendar arithmetic, no I/O. The streak rules are driven entirely
//! by whole-day differences so they are idempotent under repeated app
//! opens on the same day.

use chrono::NaiveDate;

/// What happens to the streak when a day boundary is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTransition {
    /// No study ever recorded; a session today starts a streak of 1
    Start,
    /// Already counted today; no change
    Keep,
    /// Consecutive day; streak increments
    Extend,
    /// A day was missed; streak resets to 0
    Reset,
}

impl StreakTransition {
    /// Applies this transition to a streak value
    pub fn apply(self, streak: u32) -> u32 {
        match self {
            Self::Start => 1,
            Self::Keep => streak,
            Self::Extend => streak.saturating_add(1),
            Self::Reset => 0,
        }
    }
}

/// Evaluates the streak transition for `today` given the last study date
pub fn streak_transition(last_study: Option<NaiveDate>, today: NaiveDate) -> StreakTransition {
    let Some(last) = last_study else {
        return StreakTransition::Start;
    };

    match (today - last).num_days() {
        0 => StreakTransition::Keep,
        1 => StreakTransition::Extend,
        d if d > 1 => StreakTransition::Reset,
        // Clock moved backwards; treat as already counted
        _ => StreakTransition::Keep,
    }
}

/// Returns true if the quote of the day has not been refreshed today
pub fn quote_is_stale(last_quote_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    last_quote_date != Some(today)
}
