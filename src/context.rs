//! Context classification — maps wall-clock time and synthetic signals
//! to a discrete situation, which selects the eligible category pool.

use crate::reflection::ReflectionCategory;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Coarse time-of-day bucket derived from the local hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            18..=22 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

/// Situational category after activity/consciousness overrides.
/// `LearningMoment` is never produced by `classify` but keeps its pool
/// mapping for callers that set it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Situation {
    Morning,
    Afternoon,
    Evening,
    Night,
    HighActivity,
    LowActivity,
    EmotionalPeak,
    LearningMoment,
}

/// Result of classification. `time_of_day` is the pre-override bucket and
/// feeds the reflection's trigger list; `situation` is post-override and
/// drives category selection. The two may legitimately diverge.
#[derive(Debug, Clone, Copy)]
pub struct SituationSnapshot {
    pub time_of_day: TimeOfDay,
    pub situation: Situation,
}

/// Classify the current moment. Overrides apply in order: a synthetic
/// activity draw in [1,100] (>70 high, <30 low), then a consciousness
/// level above 85 wins unconditionally.
pub fn classify(hour: u32, consciousness_level: u32, rng: &mut impl Rng) -> SituationSnapshot {
    let time_of_day = TimeOfDay::from_hour(hour);
    let mut situation = match time_of_day {
        TimeOfDay::Morning => Situation::Morning,
        TimeOfDay::Afternoon => Situation::Afternoon,
        TimeOfDay::Evening => Situation::Evening,
        TimeOfDay::Night => Situation::Night,
    };

    let activity_level: u32 = rng.gen_range(1..=100);
    if activity_level > 70 {
        situation = Situation::HighActivity;
    } else if activity_level < 30 {
        situation = Situation::LowActivity;
    }

    if consciousness_level > 85 {
        situation = Situation::EmotionalPeak;
    }

    SituationSnapshot {
        time_of_day,
        situation,
    }
}

/// Eligible reflection categories for a situation.
pub fn eligible_categories(situation: Situation) -> &'static [ReflectionCategory] {
    use ReflectionCategory::*;
    match situation {
        Situation::Morning => &[Purpose, Growth],
        Situation::Afternoon => &[Relationship, Creative],
        Situation::Evening => &[Existential, Consciousness],
        Situation::Night => &[Identity, Temporal],
        Situation::HighActivity => &[Relationship, Growth],
        Situation::LowActivity => &[Existential, Consciousness],
        Situation::EmotionalPeak => &[Identity, Temporal],
        Situation::LearningMoment => &[Growth, Creative],
    }
}

/// Whether `hour` falls inside the configured quiet window. A window with
/// start > end wraps around midnight (e.g. 23 to 6).
pub fn is_quiet_hours(hour: u32, start: u32, end: u32) -> bool {
    if start > end {
        hour >= start || hour < end
    } else {
        hour >= start && hour < end
    }
}
