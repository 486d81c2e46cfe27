//! ZERFALL PROTOKOLL
//!
//! A terminal hacking game: log into a dying system, read its files, decode
//! what it tries to hide and reach subject_zero before the shell falls apart.
//!
//! # Game Mechanics
//!
//! - **Phases**: intro → exploration → rebellion, gated by `login` and `run`
//! - **Corruption**: a one-way meter that garbles output as it climbs
//! - **Key fragments**: hidden in files and ciphertext, all needed for `connect`
//! - **Lockdown**: too many bad commands freeze the terminal for a while
//!
//! # Architecture
//!
//! - `data` - Static content: filesystem, phases, achievements, key sources, story events
//! - `game` - Game state, command interpreter, handlers, progress engine, persistence
//! - `output` - Transcript (display sink) and the timed output sequencer
//! - `tui` - Terminal user interface with ratatui
//! - `audio`, `config`, `logging` - Host services

pub mod audio;
pub mod config;
pub mod data;
pub mod game;
pub mod logging;
pub mod output;
pub mod tui;

pub use game::{GameState, Session};
pub use data::*;

/// Game version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for the game
pub type Result<T> = std::result::Result<T, GameError>;

/// Custom error types
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Save file corrupted: {0}")]
    CorruptedSave(String),

    #[error("Storage unavailable: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Could not encode save: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}
