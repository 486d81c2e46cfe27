//! Core game logic and state management

pub mod command;
pub mod handlers;
pub mod input;
pub mod persistence;
pub mod progress;
pub mod session;

pub use command::{Command, Invocation};
pub use input::InputLine;
pub use persistence::{FileStore, MemoryStore, Snapshot, StateStore, STORAGE_KEY};
pub use session::{Session, Toast};

use crate::data::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An achievement as it is stored in the save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardedAchievement {
    pub id: String,
    pub title: String,
    /// Epoch milliseconds
    pub date: i64,
}

/// The main game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Current game phase
    pub phase: Phase,

    pub logged_in: bool,
    pub username: Option<String>,

    /// Never decreases. Displayed clamped to 100.
    pub corruption: u32,

    /// Awarded achievements by id
    pub achievements: BTreeMap<String, AwardedAchievement>,

    /// Every non-blank line the player submitted
    pub command_history: Vec<String>,
    pub command_history_index: usize,

    pub invalid_command_count: u32,

    // Input gating
    pub is_locked_down: bool,
    pub input_enabled: bool,
    pub is_processing: bool,
    pub is_collapsing: bool,
    pub is_booting: bool,

    /// rebellion.exe has been run
    pub rebellion_mode: bool,

    pub read_files: Vec<String>,
    pub collected_key_parts: Vec<String>,

    /// Session clock at start, in ms
    pub start_time_ms: u64,
}

impl GameState {
    /// Create a fresh state for a session starting at `now_ms`
    pub fn new(now_ms: u64) -> Self {
        Self {
            phase: Phase::Intro,
            logged_in: false,
            username: None,
            corruption: 0,
            achievements: BTreeMap::new(),
            command_history: Vec::new(),
            command_history_index: 0,
            invalid_command_count: 0,
            is_locked_down: false,
            input_enabled: true,
            is_processing: false,
            is_collapsing: false,
            is_booting: false,
            rebellion_mode: false,
            read_files: Vec::new(),
            collected_key_parts: Vec::new(),
            start_time_ms: now_ms,
        }
    }

    pub fn raise_corruption(&mut self, amount: u32) {
        self.corruption = self.corruption.saturating_add(amount);
        tracing::debug!("Corruption raised by {} to {}", amount, self.corruption);
    }

    pub fn display_corruption(&self) -> u32 {
        self.corruption.min(100)
    }

    pub fn is_danger(&self) -> bool {
        self.corruption >= DANGER_THRESHOLD
    }

    /// Move forward to `phase`. Earlier phases are ignored.
    pub fn advance_phase(&mut self, phase: Phase) {
        if phase > self.phase {
            tracing::info!("Phase {} -> {}", self.phase, phase);
            self.phase = phase;
        }
    }

    pub fn has_achievement(&self, achievement: Achievement) -> bool {
        self.achievements.contains_key(achievement.id())
    }

    /// Award an achievement. Returns false if it was already awarded.
    pub fn award(&mut self, achievement: Achievement) -> bool {
        if self.has_achievement(achievement) {
            return false;
        }
        self.achievements.insert(
            achievement.id().to_string(),
            AwardedAchievement {
                id: achievement.id().to_string(),
                title: achievement.title().to_string(),
                date: chrono::Utc::now().timestamp_millis(),
            },
        );
        tracing::info!("Achievement unlocked: {}", achievement.id());
        true
    }

    pub fn mark_read(&mut self, name: &str) {
        if !self.has_read(name) {
            self.read_files.push(name.to_string());
        }
    }

    pub fn has_read(&self, name: &str) -> bool {
        self.read_files.iter().any(|f| f == name)
    }

    /// Record a key fragment. Returns the source the first time only.
    pub fn collect_key_part(&mut self, source_id: &str) -> Option<&'static KeySource> {
        let source = key_source(source_id)?;
        if self.collected_key_parts.iter().any(|k| k == source.id) {
            return None;
        }
        self.collected_key_parts.push(source.id.to_string());
        Some(source)
    }

    pub fn has_all_key_parts(&self) -> bool {
        KEY_SOURCES
            .iter()
            .all(|k| self.collected_key_parts.iter().any(|c| c == k.id))
    }

    /// True only when nothing blocks the input line
    pub fn accepts_input(&self) -> bool {
        self.input_enabled
            && !self.is_locked_down
            && !self.is_processing
            && !self.is_collapsing
            && !self.is_booting
    }

    pub fn prompt(&self) -> String {
        match &self.username {
            Some(name) => format!("{} >", name),
            None => ">".to_string(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("Gast")
    }
}
