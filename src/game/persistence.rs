//! Save game storage
//!
//! The save is a single JSON object under one fixed key. Loading merges
//! whatever keys are present into a fresh state, so older or partial saves
//! still work. A save that cannot be read is reported and ignored.

use super::{AwardedAchievement, GameState};
use crate::data::Phase;
use crate::{GameError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Key the save lives under
pub const STORAGE_KEY: &str = "zerfallState";

/// A key-value store for save data
pub trait StateStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

/// Write to a temp file and rename over the target
fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp = path.with_extension("json.tmp");
    let mut file = File::create(&temp)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&temp, path)
}

impl StateStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        atomic_write(&self.path_for(key), value.as_bytes())?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `value` under `key`
    pub fn with(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// The persisted subset of the game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phase: Phase,
    pub logged_in: bool,
    pub username: Option<String>,
    pub corruption: u32,
    pub achievements: BTreeMap<String, AwardedAchievement>,
    pub collected_key_parts: Vec<String>,
    pub read_files: Vec<String>,
}

impl Snapshot {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            phase: state.phase,
            logged_in: state.logged_in,
            username: state.username.clone(),
            corruption: state.corruption,
            achievements: state.achievements.clone(),
            collected_key_parts: state.collected_key_parts.clone(),
            read_files: state.read_files.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Write the state under [`STORAGE_KEY`]
pub fn save_state(store: &mut dyn StateStore, state: &GameState) -> Result<()> {
    let json = Snapshot::from_state(state).to_json()?;
    store.save(STORAGE_KEY, &json)
}

/// Merge the stored save into `state`. Ok(false) if there is none.
///
/// On error `state` is left untouched.
pub fn load_state(store: &dyn StateStore, state: &mut GameState) -> Result<bool> {
    match store.load(STORAGE_KEY)? {
        Some(raw) => {
            merge_snapshot(state, &raw)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn corrupted(key: &str, reason: impl std::fmt::Display) -> GameError {
    GameError::CorruptedSave(format!("{}: {}", key, reason))
}

fn field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Result<Option<T>> {
    object
        .get(key)
        .map(|value| T::deserialize(value).map_err(|e| corrupted(key, e)))
        .transpose()
}

/// Corruption may have been written as a float
fn corruption_field(object: &Map<String, Value>) -> Result<Option<u32>> {
    let Some(value) = object.get("corruption") else {
        return Ok(None);
    };
    match value.as_f64() {
        Some(n) if n.is_finite() && n >= 0.0 => Ok(Some(n.floor().min(u32::MAX as f64) as u32)),
        _ => Err(corrupted("corruption", "expected a non-negative number")),
    }
}

/// Shallow merge: present keys replace fresh values, absent keys stay
pub fn merge_snapshot(state: &mut GameState, raw: &str) -> Result<()> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| GameError::CorruptedSave(e.to_string()))?;
    let Value::Object(object) = value else {
        return Err(GameError::CorruptedSave("save is not an object".to_string()));
    };

    let phase = field::<Phase>(&object, "phase")?;
    let logged_in = field::<bool>(&object, "loggedIn")?;
    let username = field::<Option<String>>(&object, "username")?;
    let corruption = corruption_field(&object)?;
    let achievements = field::<BTreeMap<String, AwardedAchievement>>(&object, "achievements")?;
    let collected_key_parts = field::<Vec<String>>(&object, "collectedKeyParts")?;
    let read_files = field::<Vec<String>>(&object, "readFiles")?;

    if let Some(phase) = phase {
        state.phase = phase;
    }
    if let Some(logged_in) = logged_in {
        state.logged_in = logged_in;
    }
    if let Some(username) = username {
        state.username = username;
    }
    if let Some(corruption) = corruption {
        state.corruption = corruption;
    }
    if let Some(achievements) = achievements {
        state.achievements = achievements;
    }
    if let Some(parts) = collected_key_parts {
        state.collected_key_parts = parts;
    }
    if let Some(files) = read_files {
        state.read_files = files;
    }
    state.rebellion_mode = state.phase == Phase::Rebellion;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Achievement;
    use tempfile::TempDir;

    fn played() -> GameState {
        let mut state = GameState::new(0);
        state.phase = Phase::Rebellion;
        state.rebellion_mode = true;
        state.logged_in = true;
        state.username = Some("alice".into());
        state.corruption = 17;
        state.award(Achievement::UsedScan);
        state.collect_key_part("log01.txt");
        state.mark_read("log01.txt");
        state
    }

    #[test]
    fn test_snapshot_uses_camel_case_keys() {
        let json = Snapshot::from_state(&played()).to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "achievements",
                "collectedKeyParts",
                "corruption",
                "loggedIn",
                "phase",
                "readFiles",
                "username"
            ]
        );
        assert_eq!(value["phase"], "rebellion");
        assert_eq!(value["achievements"]["used_scan"]["title"], "Scan ausgeführt");
    }

    #[test]
    fn test_round_trip_through_memory_store() {
        let state = played();
        let mut store = MemoryStore::new();
        save_state(&mut store, &state).unwrap();

        let mut loaded = GameState::new(0);
        assert!(load_state(&store, &mut loaded).unwrap());
        assert_eq!(Snapshot::from_state(&loaded), Snapshot::from_state(&state));
        assert!(loaded.rebellion_mode);
    }

    #[test]
    fn test_partial_save_merges_shallowly() {
        let mut state = GameState::new(0);
        merge_snapshot(&mut state, r#"{"corruption": 42.7, "loggedIn": true}"#).unwrap();
        assert_eq!(state.corruption, 42);
        assert!(state.logged_in);
        assert_eq!(state.phase, Phase::Intro);
        assert!(state.read_files.is_empty());
    }

    #[test]
    fn test_malformed_save_leaves_state_alone() {
        for raw in [
            "{not json",
            "[1, 2]",
            r#"{"corruption": 5, "phase": "finale"}"#,
            r#"{"corruption": -3}"#,
            r#"{"readFiles": "readme.txt"}"#,
        ] {
            let mut state = GameState::new(0);
            let result = merge_snapshot(&mut state, raw);
            assert!(matches!(result, Err(GameError::CorruptedSave(_))), "{}", raw);
            assert_eq!(state, GameState::new(0), "{}", raw);
        }
    }

    #[test]
    fn test_missing_save_is_not_an_error() {
        let store = MemoryStore::new();
        let mut state = GameState::new(0);
        assert!(!load_state(&store, &mut state).unwrap());
    }

    #[test]
    fn test_file_store_round_trip_and_remove() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("nested"));
        assert_eq!(store.load(STORAGE_KEY).unwrap(), None);

        store.save(STORAGE_KEY, "{}").unwrap();
        assert!(store.path_for(STORAGE_KEY).exists());
        assert_eq!(store.load(STORAGE_KEY).unwrap().as_deref(), Some("{}"));

        store.remove(STORAGE_KEY).unwrap();
        store.remove(STORAGE_KEY).unwrap();
        assert_eq!(store.load(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        writer.save("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }
}
