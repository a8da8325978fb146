use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::models::{CommentHistory, MIN_SAMPLES};
use crate::tone::{self, ToneLabel};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// The flat key-value document shared by the tracker, the popup operations
/// and the background router. Absent keys mean empty state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredState {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    comment_history: CommentHistory,
    #[serde(skip_serializing_if = "Option::is_none")]
    tone_profile: Option<ToneLabel>,
}

impl StoredState {
    fn set_history(&mut self, history: CommentHistory) {
        self.tone_profile = if history.is_empty() {
            None
        } else {
            Some(tone::classify(history.as_slice()))
        };
        self.comment_history = history;
    }
}

/// Last write wins; nothing coordinates writers in different contexts.
pub struct SettingsStore {
    path: Option<PathBuf>,
    data: RwLock<StoredState>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log_warn!(
                    "Store at {} is unreadable ({}); starting empty, next write replaces it",
                    path.display(),
                    err
                );
                StoredState::default()
            })
        } else {
            StoredState::default()
        };

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// Store without a backing file, used by tests and embedders that
    /// persist elsewhere.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: RwLock::new(StoredState::default()),
        }
    }

    pub fn api_key(&self) -> Option<String> {
        self.read()
            .api_key
            .as_ref()
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }

    pub fn set_api_key(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            bail!("API key must not be empty");
        }
        let mut guard = self.write();
        guard.api_key = Some(key.to_string());
        self.persist(&guard)
    }

    pub fn comment_history(&self) -> CommentHistory {
        self.read().comment_history.clone()
    }

    pub fn tone_profile(&self) -> Option<ToneLabel> {
        self.read().tone_profile
    }

    /// Writes a history produced by the capture tracker and recomputes its tone.
    pub fn save_capture(&self, history: CommentHistory) -> Result<()> {
        let mut guard = self.write();
        guard.set_history(history);
        self.persist(&guard)
    }

    /// Replaces the history with hand-written samples.
    pub fn save_manual_comments(&self, comments: Vec<String>) -> Result<CommentHistory> {
        let valid: Vec<String> = comments
            .into_iter()
            .map(|comment| comment.trim().to_string())
            .filter(|comment| !comment.is_empty())
            .collect();
        if valid.len() < MIN_SAMPLES {
            bail!(
                "At least {} comments are needed to learn a writing style (got {})",
                MIN_SAMPLES,
                valid.len()
            );
        }

        let history = CommentHistory::from(valid);
        let mut guard = self.write();
        guard.set_history(history.clone());
        self.persist(&guard)?;
        Ok(history)
    }

    pub fn edit_comment(&self, index: usize, comment: &str) -> Result<()> {
        let comment = comment.trim();
        if comment.is_empty() {
            bail!("Edited comment must not be empty");
        }
        let mut guard = self.write();
        let mut history = guard.comment_history.clone();
        if !history.replace(index, comment.to_string()) {
            bail!("No comment at index {index}");
        }
        guard.set_history(history);
        self.persist(&guard)
    }

    pub fn delete_comment(&self, index: usize) -> Result<()> {
        let mut guard = self.write();
        let mut history = guard.comment_history.clone();
        if history.remove(index).is_none() {
            bail!("No comment at index {index}");
        }
        guard.set_history(history);
        self.persist(&guard)
    }

    /// Empties the history and drops the derived tone. The API key stays.
    pub fn clear_history(&self) -> Result<()> {
        let mut guard = self.write();
        guard.set_history(CommentHistory::new());
        self.persist(&guard)
    }

    fn read(&self) -> RwLockReadGuard<'_, StoredState> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoredState> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, data: &StoredState) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write store to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|text| text.to_string()).collect()
    }

    #[test]
    fn absent_file_means_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("store.json")).unwrap();
        assert!(store.api_key().is_none());
        assert!(store.comment_history().is_empty());
        assert!(store.tone_profile().is_none());
    }

    #[test]
    fn writes_use_platform_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = SettingsStore::new(path.clone()).unwrap();
        store.set_api_key("  secret  ").unwrap();
        store
            .save_capture(CommentHistory::from(samples(&["love this so much"])))
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["apiKey"], "secret");
        assert_eq!(raw["commentHistory"][0], "love this so much");
        assert_eq!(raw["toneProfile"], "casual and friendly");

        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.api_key().as_deref(), Some("secret"));
        assert_eq!(reopened.tone_profile(), Some(ToneLabel::Casual));
    }

    #[test]
    fn corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "][").unwrap();
        let store = SettingsStore::new(path).unwrap();
        assert!(store.comment_history().is_empty());
    }

    #[test]
    fn emptied_capture_drops_the_tone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .save_capture(CommentHistory::from(samples(&["great work here"])))
            .unwrap();
        assert_eq!(store.tone_profile(), Some(ToneLabel::Casual));

        store.save_capture(CommentHistory::new()).unwrap();
        assert!(store.tone_profile().is_none());
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.get("toneProfile").is_none());
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let store = SettingsStore::in_memory();
        assert!(store.set_api_key("   ").is_err());
        assert!(store.api_key().is_none());
    }

    #[test]
    fn manual_comments_need_three_entries() {
        let store = SettingsStore::in_memory();
        assert!(store
            .save_manual_comments(samples(&["one comment", "  ", "two comment"]))
            .is_err());

        let history = store
            .save_manual_comments(samples(&[
                "I appreciate this",
                "excellent insights here",
                "pleased to read it",
            ]))
            .unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(store.tone_profile(), Some(ToneLabel::Professional));
    }

    #[test]
    fn edit_delete_and_clear_keep_tone_in_sync() {
        let store = SettingsStore::in_memory();
        store
            .save_manual_comments(samples(&["nice post", "awesome stuff", "well said"]))
            .unwrap();
        assert_eq!(store.tone_profile(), Some(ToneLabel::Casual));

        store.edit_comment(1, "excellent analysis").unwrap();
        assert_eq!(store.tone_profile(), Some(ToneLabel::Professional));
        assert!(store.edit_comment(7, "out of range").is_err());

        store.delete_comment(1).unwrap();
        assert_eq!(store.comment_history().len(), 2);
        assert_eq!(store.tone_profile(), Some(ToneLabel::Balanced));

        store.set_api_key("key").unwrap();
        store.clear_history().unwrap();
        assert!(store.comment_history().is_empty());
        assert!(store.tone_profile().is_none());
        assert_eq!(store.api_key().as_deref(), Some("key"));
    }
}
