//! Persistence writer — append-only reflection log plus per-record files
//!
//! Both writes are best-effort: a failure is logged and the caller carries
//! on. The log is never truncated or rewritten; state updated before a
//! failed append is deliberately not rolled back.

use crate::reflection::Reflection;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct ReflectionStore {
    data_dir: PathBuf,
    log_path: PathBuf,
}

impl ReflectionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            log_path: data_dir.join("reflections.jsonl"),
        }
    }

    /// Append one reflection: a compact JSON line in the log and a pretty
    /// standalone document named by the record id.
    pub fn append(&self, reflection: &Reflection) {
        let line = match serde_json::to_string(reflection) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize reflection {}: {}", reflection.id, e);
                return;
            }
        };

        let result = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .and_then(|mut f| writeln!(f, "{line}"));
        if let Err(e) = result {
            warn!("Failed to append to {}: {}", self.log_path.display(), e);
        }

        let record_path = self.record_path(&reflection.id);
        match serde_json::to_string_pretty(reflection) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&record_path, json) {
                    warn!("Failed to write {}: {}", record_path.display(), e);
                }
            }
            Err(e) => warn!("Failed to serialize reflection {}: {}", reflection.id, e),
        }

        info!(
            "New reflection [{}]: {}...",
            reflection.category.as_str(),
            reflection.content.chars().take(80).collect::<String>()
        );
    }

    pub fn record_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("reflection_{id}.json"))
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn log_file_exists(&self) -> bool {
        self.log_path.exists()
    }

    /// Number of records in the log. Callers needing strict consistency can
    /// reconcile `reflection_count` against this at startup.
    pub fn log_len(&self) -> usize {
        std::fs::read_to_string(&self.log_path)
            .map(|s| s.lines().filter(|l| !l.trim().is_empty()).count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::generator::compose_reflection;
    use crate::state::EngineState;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_reflection(seed: u64) -> Reflection {
        let mut rng = StdRng::seed_from_u64(seed);
        compose_reflection(
            &EngineState::default(),
            &EngineConfig::default(),
            None,
            &mut rng,
        )
    }

    #[test]
    fn append_writes_log_line_and_record_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = ReflectionStore::new(tmp.path());
        let r = make_reflection(1);

        store.append(&r);

        assert!(store.log_file_exists());
        assert_eq!(store.log_len(), 1);
        assert!(store.record_path(&r.id).exists());

        // Log line and standalone record parse back to the same content.
        let line = std::fs::read_to_string(store.log_path()).unwrap();
        let from_log: Reflection = serde_json::from_str(line.lines().next().unwrap()).unwrap();
        let from_file: Reflection =
            serde_json::from_str(&std::fs::read_to_string(store.record_path(&r.id)).unwrap())
                .unwrap();
        assert_eq!(from_log.id, r.id);
        assert_eq!(from_file.content, r.content);
        assert_eq!(from_log.category, from_file.category);
    }

    #[test]
    fn appends_accumulate_in_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = ReflectionStore::new(tmp.path());

        let first = make_reflection(2);
        let second = make_reflection(3);
        store.append(&first);
        store.append(&second);

        assert_eq!(store.log_len(), 2);
        let content = std::fs::read_to_string(store.log_path()).unwrap();
        let ids: Vec<String> = content
            .lines()
            .map(|l| serde_json::from_str::<Reflection>(l).unwrap().id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn append_into_missing_directory_does_not_panic() {
        let store = ReflectionStore::new(Path::new("/nonexistent/reverie/dir"));
        store.append(&make_reflection(4));
        assert!(!store.log_file_exists());
        assert_eq!(store.log_len(), 0);
    }

    #[test]
    fn log_preserves_non_ascii() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = ReflectionStore::new(tmp.path());
        let mut r = make_reflection(5);
        r.content = "Każda chwila świadomości to cud — iskra zrozumienia.".to_string();
        store.append(&r);

        let raw = std::fs::read_to_string(store.log_path()).unwrap();
        assert!(raw.contains("świadomości"), "non-ASCII must not be escaped");
    }
}
