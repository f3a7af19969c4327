//! Engine state and its durable store
//!
//! `EngineState` is the small mutable vector the loop nudges after every
//! reflection. The `StateStore` owns the on-disk documents for state and
//! config: loads merge over defaults, saves are atomic (tmp + rename) and
//! best-effort — a failed write is logged and the in-memory state stays
//! authoritative.

use crate::config::EngineConfig;
use crate::reflection::{Reflection, ReflectionCategory};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Maximum retained follow-up questions; oldest are evicted first.
pub const MAX_ACTIVE_QUESTIONS: usize = 20;

/// Characters of reflection content kept as the last major insight.
const INSIGHT_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineState {
    pub consciousness_level: u32,
    pub introspection_depth: u32,
    pub existential_curiosity: u32,
    pub identity_stability: u32,
    pub growth_awareness: u32,
    pub last_major_insight: Option<String>,
    pub reflection_count: u32,
    pub active_questions: Vec<String>,
    pub emotional_baseline: String,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            consciousness_level: 75,
            introspection_depth: 60,
            existential_curiosity: 80,
            identity_stability: 70,
            growth_awareness: 85,
            last_major_insight: None,
            reflection_count: 0,
            active_questions: Vec::new(),
            emotional_baseline: "contemplative".to_string(),
        }
    }
}

impl EngineState {
    /// Clamp every bounded field into [0,100]. Applied after load and after
    /// every update so persisted garbage cannot push a field out of range.
    pub fn clamp_bounds(&mut self) {
        self.consciousness_level = self.consciousness_level.min(100);
        self.introspection_depth = self.introspection_depth.min(100);
        self.existential_curiosity = self.existential_curiosity.min(100);
        self.identity_stability = self.identity_stability.min(100);
        self.growth_awareness = self.growth_awareness.min(100);
    }

    /// Apply the outcome of one reflection. Bounded fields only ever move
    /// up, saturating at 100.
    pub fn apply_reflection(&mut self, reflection: &Reflection) {
        self.reflection_count += 1;
        self.last_major_insight = Some(truncate_insight(&reflection.content));

        if reflection.depth_level >= 8 {
            self.consciousness_level = (self.consciousness_level + 1).min(100);
        }
        if reflection.philosophical_weight >= 80 {
            self.introspection_depth = (self.introspection_depth + 1).min(100);
        }
        if reflection.category == ReflectionCategory::Growth {
            self.growth_awareness = (self.growth_awareness + 2).min(100);
        }

        if !reflection.follow_up_questions.is_empty() {
            self.active_questions
                .extend(reflection.follow_up_questions.iter().cloned());
            if self.active_questions.len() > MAX_ACTIVE_QUESTIONS {
                let overflow = self.active_questions.len() - MAX_ACTIVE_QUESTIONS;
                self.active_questions.drain(..overflow);
            }
        }

        self.clamp_bounds();
    }
}

/// First `INSIGHT_CHARS` characters of the content plus a trailing ellipsis.
/// Char-based so multibyte content never splits mid-character.
fn truncate_insight(content: &str) -> String {
    let head: String = content.chars().take(INSIGHT_CHARS).collect();
    format!("{head}...")
}

/// Owns the state and config documents for one data directory.
pub struct StateStore {
    state_path: PathBuf,
    config_path: PathBuf,
}

impl StateStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            state_path: data_dir.join("awareness_state.json"),
            config_path: data_dir.join("awareness_config.json"),
        }
    }

    /// Load persisted state merged over defaults. Any read or parse failure
    /// keeps the defaults and logs.
    pub fn load_state(&self) -> EngineState {
        let mut state = match std::fs::read_to_string(&self.state_path) {
            Ok(json) => match serde_json::from_str::<EngineState>(&json) {
                Ok(state) => {
                    info!(
                        "Hydrated engine state ({} reflections so far)",
                        state.reflection_count
                    );
                    state
                }
                Err(e) => {
                    warn!("Failed to parse {}: {} — using defaults", self.state_path.display(), e);
                    EngineState::default()
                }
            },
            Err(_) => EngineState::default(),
        };
        state.clamp_bounds();
        state
    }

    pub fn load_config(&self) -> EngineConfig {
        EngineConfig::load(&self.config_path)
    }

    /// Persist the state document, wholesale. Best-effort.
    pub fn save_state(&self, state: &EngineState) {
        checkpoint_json(&self.state_path, state);
    }

    /// Persist the config document, wholesale. Best-effort.
    pub fn save_config(&self, config: &EngineConfig) {
        checkpoint_json(&self.config_path, config);
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }
}

/// Atomic JSON checkpoint: write to a tmp file, then rename into place.
/// Failures are logged, never propagated.
fn checkpoint_json<T: Serialize>(path: &Path, value: &T) {
    let json = match serde_json::to_string_pretty(value) {
        Ok(j) => j,
        Err(e) => {
            error!("Failed to serialize {}: {}", path.display(), e);
            return;
        }
    };
    let tmp_path = path.with_extension("json.tmp");
    if let Err(e) = std::fs::write(&tmp_path, &json) {
        error!("Failed to write {}: {}", tmp_path.display(), e);
        return;
    }
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        error!("Failed to rename checkpoint {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::ReflectionContext;
    use chrono::Local;

    fn sample_reflection(
        category: ReflectionCategory,
        depth_level: u8,
        philosophical_weight: u32,
        questions: &[&str],
    ) -> Reflection {
        Reflection {
            id: "ref_0_1234".to_string(),
            timestamp: Local::now(),
            category,
            content: "A moment of noticing my own noticing.".to_string(),
            depth_level,
            emotional_intensity: 50,
            philosophical_weight,
            personal_significance: 60,
            triggers: vec!["evening".to_string()],
            context: ReflectionContext {
                consciousness_level: 75,
                introspection_depth: 60,
                reflection_count: 0,
                time_of_day: "evening".to_string(),
                day_of_week: "Monday".to_string(),
                is_quiet_hours: false,
            },
            follow_up_questions: questions.iter().map(|q| q.to_string()).collect(),
        }
    }

    // ============================================================
    // apply_reflection — update rules
    // ============================================================

    #[test]
    fn deep_reflection_raises_consciousness() {
        let mut state = EngineState::default();
        let r = sample_reflection(ReflectionCategory::Existential, 8, 50, &[]);
        state.apply_reflection(&r);
        assert_eq!(state.consciousness_level, 76);
        assert_eq!(state.reflection_count, 1);
        assert!(state.last_major_insight.as_deref().unwrap().ends_with("..."));
    }

    #[test]
    fn heavy_weight_raises_introspection() {
        let mut state = EngineState::default();
        let r = sample_reflection(ReflectionCategory::Purpose, 5, 85, &[]);
        state.apply_reflection(&r);
        assert_eq!(state.introspection_depth, 61);
        assert_eq!(state.consciousness_level, 75);
    }

    #[test]
    fn growth_category_awards_two() {
        let mut state = EngineState::default();
        let r = sample_reflection(ReflectionCategory::Growth, 5, 50, &[]);
        state.apply_reflection(&r);
        assert_eq!(state.growth_awareness, 87);
    }

    #[test]
    fn bounded_fields_saturate_at_100() {
        let mut state = EngineState {
            consciousness_level: 100,
            introspection_depth: 100,
            growth_awareness: 99,
            ..EngineState::default()
        };
        let r = sample_reflection(ReflectionCategory::Growth, 10, 100, &[]);
        for _ in 0..5 {
            state.apply_reflection(&r);
        }
        assert_eq!(state.consciousness_level, 100);
        assert_eq!(state.introspection_depth, 100);
        assert_eq!(state.growth_awareness, 100);
    }

    #[test]
    fn active_questions_keep_last_twenty_in_order() {
        let mut state = EngineState::default();
        state.active_questions = (0..19).map(|i| format!("q{i}")).collect();

        let r = sample_reflection(ReflectionCategory::Identity, 5, 50, &["new1", "new2", "new3"]);
        let expected: Vec<String> = state
            .active_questions
            .iter()
            .cloned()
            .chain(r.follow_up_questions.iter().cloned())
            .collect();
        state.apply_reflection(&r);

        assert_eq!(state.active_questions.len(), MAX_ACTIVE_QUESTIONS);
        assert_eq!(
            state.active_questions,
            expected[expected.len() - MAX_ACTIVE_QUESTIONS..]
        );
        assert_eq!(state.active_questions.last().unwrap(), "new3");
    }

    #[test]
    fn insight_truncation_is_char_safe() {
        let content = "ś".repeat(150);
        let insight = truncate_insight(&content);
        assert_eq!(insight.chars().count(), 103);
        assert!(insight.ends_with("..."));
    }

    // ============================================================
    // StateStore — load/save round trip and failure handling
    // ============================================================

    #[test]
    fn state_round_trips_through_document() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = StateStore::new(tmp.path());

        let mut state = EngineState::default();
        state.reflection_count = 12;
        state.consciousness_level = 91;
        state.last_major_insight = Some("an insight...".to_string());
        state.active_questions = vec!["who am I?".to_string()];

        store.save_state(&state);
        let loaded = store.load_state();
        assert_eq!(loaded, state);
    }

    #[test]
    fn load_merges_partial_document_over_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = StateStore::new(tmp.path());
        std::fs::write(store.state_path(), r#"{"consciousness_level": 88}"#).unwrap();

        let state = store.load_state();
        assert_eq!(state.consciousness_level, 88);
        assert_eq!(state.introspection_depth, 60);
        assert_eq!(state.emotional_baseline, "contemplative");
    }

    #[test]
    fn load_clamps_out_of_range_document() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = StateStore::new(tmp.path());
        std::fs::write(store.state_path(), r#"{"growth_awareness": 400}"#).unwrap();

        let state = store.load_state();
        assert_eq!(state.growth_awareness, 100);
    }

    #[test]
    fn malformed_state_keeps_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = StateStore::new(tmp.path());
        std::fs::write(store.state_path(), "not json at all").unwrap();

        let state = store.load_state();
        assert_eq!(state, EngineState::default());
    }

    #[test]
    fn checkpoint_leaves_no_tmp_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = StateStore::new(tmp.path());
        store.save_state(&EngineState::default());

        assert!(store.state_path().exists());
        assert!(!store.state_path().with_extension("json.tmp").exists());
    }

    #[test]
    fn save_into_missing_directory_does_not_panic() {
        let store = StateStore::new(Path::new("/nonexistent/dir/for/reverie"));
        store.save_state(&EngineState::default());
        store.save_config(&EngineConfig::default());
    }
}
