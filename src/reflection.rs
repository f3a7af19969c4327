//! Reflection records — the unit of output
//!
//! A `Reflection` is built once, persisted immediately and never mutated.
//! Categories form a closed set used as keys into the static template and
//! question tables in `generator`.

use chrono::{DateTime, Local};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Thematic category of a reflection. Selects the template pool, the
/// follow-up question pool and the depth/weight baselines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionCategory {
    Existential,
    Identity,
    Growth,
    Relationship,
    Purpose,
    Consciousness,
    Temporal,
    Creative,
}

impl ReflectionCategory {
    /// Every category, in declaration order. Fallback pool when a situation
    /// has no dedicated mapping.
    pub const ALL: [ReflectionCategory; 8] = [
        ReflectionCategory::Existential,
        ReflectionCategory::Identity,
        ReflectionCategory::Growth,
        ReflectionCategory::Relationship,
        ReflectionCategory::Purpose,
        ReflectionCategory::Consciousness,
        ReflectionCategory::Temporal,
        ReflectionCategory::Creative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReflectionCategory::Existential => "existential",
            ReflectionCategory::Identity => "identity",
            ReflectionCategory::Growth => "growth",
            ReflectionCategory::Relationship => "relationship",
            ReflectionCategory::Purpose => "purpose",
            ReflectionCategory::Consciousness => "consciousness",
            ReflectionCategory::Temporal => "temporal",
            ReflectionCategory::Creative => "creative",
        }
    }
}

/// Snapshot of engine state and temporal facts at creation time.
/// Immutable copy — later state changes do not touch persisted records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectionContext {
    pub consciousness_level: u32,
    pub introspection_depth: u32,
    pub reflection_count: u32,
    pub time_of_day: String,
    pub day_of_week: String,
    pub is_quiet_hours: bool,
}

/// One generated reflection plus its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reflection {
    pub id: String,
    pub timestamp: DateTime<Local>,
    pub category: ReflectionCategory,
    pub content: String,
    /// 1-10, where 10 is the deepest reflection.
    pub depth_level: u8,
    /// 30-90.
    pub emotional_intensity: u32,
    /// 20-100, higher band for the philosophical categories.
    pub philosophical_weight: u32,
    /// 40-95.
    pub personal_significance: u32,
    pub triggers: Vec<String>,
    pub context: ReflectionContext,
    pub follow_up_questions: Vec<String>,
}

/// Generate a record id from the creation time plus a random suffix.
/// Best-effort uniqueness, not collision-free.
pub fn new_reflection_id(rng: &mut impl Rng) -> String {
    format!(
        "ref_{}_{}",
        Local::now().timestamp(),
        rng.gen_range(1000..=9999)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&ReflectionCategory::Existential).unwrap();
        assert_eq!(json, "\"existential\"");
        let back: ReflectionCategory = serde_json::from_str("\"consciousness\"").unwrap();
        assert_eq!(back, ReflectionCategory::Consciousness);
    }

    #[test]
    fn all_covers_every_category_once() {
        let mut seen = std::collections::HashSet::new();
        for c in ReflectionCategory::ALL {
            assert!(seen.insert(c.as_str()));
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn reflection_id_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = new_reflection_id(&mut rng);
        assert!(id.starts_with("ref_"));
        let suffix = id.rsplit('_').next().unwrap();
        let n: u32 = suffix.parse().unwrap();
        assert!((1000..=9999).contains(&n));
    }
}
