//! Achievement catalog
//!
//! Some achievements are earned by polling the game state, the rest are
//! handed out directly by commands and story events.

use super::{active_files, Phase};
use crate::game::GameState;
use serde::{Deserialize, Serialize};

/// Speed runner window in milliseconds
pub const SPEED_RUN_WINDOW_MS: u64 = 300_000;

/// Achievement IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Achievement {
    // Polled
    SpeedRunner,    // 10+ commands within five minutes
    PerfectRun,     // Reach the rebellion below 10 corruption
    Explorer,       // Read every visible file

    // Progress
    KeyPartEncrypted,
    KeyPartLog,
    DecodedEncrypted,
    UsedScan,

    // Story events
    Corruption30,
    Corruption50,

    // Easter eggs
    DeepThought,
    WannabeHacker,
    DanceParty,
    MatrixObserver,
    CoffeeLover,
}

impl Achievement {
    pub const ALL: [Achievement; 14] = [
        Achievement::SpeedRunner,
        Achievement::PerfectRun,
        Achievement::Explorer,
        Achievement::KeyPartEncrypted,
        Achievement::KeyPartLog,
        Achievement::DecodedEncrypted,
        Achievement::UsedScan,
        Achievement::Corruption30,
        Achievement::Corruption50,
        Achievement::DeepThought,
        Achievement::WannabeHacker,
        Achievement::DanceParty,
        Achievement::MatrixObserver,
        Achievement::CoffeeLover,
    ];

    /// Key used in the persisted achievements map
    pub fn id(&self) -> &'static str {
        match self {
            Achievement::SpeedRunner => "speed_runner",
            Achievement::PerfectRun => "perfect_run",
            Achievement::Explorer => "explorer",
            Achievement::KeyPartEncrypted => "keypart_encryptedb64",
            Achievement::KeyPartLog => "keypart_log01txt",
            Achievement::DecodedEncrypted => "decoded_encrypted",
            Achievement::UsedScan => "used_scan",
            Achievement::Corruption30 => "corruption_30",
            Achievement::Corruption50 => "corruption_50",
            Achievement::DeepThought => "deep_thought",
            Achievement::WannabeHacker => "wannabe_hacker",
            Achievement::DanceParty => "dance_party",
            Achievement::MatrixObserver => "matrix_observer",
            Achievement::CoffeeLover => "coffee_lover",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.id() == id)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::SpeedRunner => "Speed Runner",
            Achievement::PerfectRun => "Perfect Run",
            Achievement::Explorer => "System Explorer",
            Achievement::KeyPartEncrypted => "Schlüsselteil: Verschlüsselte Nachricht",
            Achievement::KeyPartLog => "Schlüsselteil: System Log",
            Achievement::DecodedEncrypted => "Verschlüsselte Nachricht entschlüsselt",
            Achievement::UsedScan => "Scan ausgeführt",
            Achievement::Corruption30 => "Korruption Level 30",
            Achievement::Corruption50 => "Korruption Level 50",
            Achievement::DeepThought => "Deep Thinker",
            Achievement::WannabeHacker => "Hobby Hacker",
            Achievement::DanceParty => "Tanzender Code",
            Achievement::MatrixObserver => "Follow the white rabbit",
            Achievement::CoffeeLover => "But first, coffee",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::SpeedRunner => "Beende das Spiel in unter 5 Minuten",
            Achievement::PerfectRun => "Erreiche die Rebellion mit weniger als 10% Korruption",
            Achievement::Explorer => "Lies alle verfügbaren Dateien",
            Achievement::KeyPartEncrypted => "Finde das Fragment in der verschlüsselten Nachricht",
            Achievement::KeyPartLog => "Finde das Fragment im System Log",
            Achievement::DecodedEncrypted => "Dekodiere die verschlüsselte Nachricht",
            Achievement::UsedScan => "Durchsuche das System",
            Achievement::Corruption30 => "Das System beginnt zu zerfallen",
            Achievement::Corruption50 => "Datenverlust unausweichlich",
            Achievement::DeepThought => "Kenne die Antwort",
            Achievement::WannabeHacker => "Versuche es mit roher Gewalt",
            Achievement::DanceParty => "Bring den Code zum Tanzen",
            Achievement::MatrixObserver => "Sieh hinter die Zeichen",
            Achievement::CoffeeLover => "Verlange nach Kaffee",
        }
    }

    /// Whether the progress engine awards this one by polling
    pub fn is_polled(&self) -> bool {
        matches!(
            self,
            Achievement::SpeedRunner | Achievement::PerfectRun | Achievement::Explorer
        )
    }

    /// Predicate for polled achievements. Always false for the others.
    pub fn check(&self, state: &GameState, now_ms: u64) -> bool {
        match self {
            Achievement::SpeedRunner => {
                state.command_history.len() >= 10
                    && now_ms.saturating_sub(state.start_time_ms) < SPEED_RUN_WINDOW_MS
            }
            Achievement::PerfectRun => state.corruption < 10 && state.phase == Phase::Rebellion,
            Achievement::Explorer => active_files(state.rebellion_mode)
                .iter()
                .all(|f| state.has_read(f.name)),
            _ => false,
        }
    }
}
