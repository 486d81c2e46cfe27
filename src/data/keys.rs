//! Key fragment sources
//!
//! Every source must be collected before `connect subject_zero` goes through.

use super::Achievement;

/// Where a key fragment is found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySource {
    /// Source id, also the file the fragment hides in
    pub id: &'static str,
    pub fragment: &'static str,
    pub description: &'static str,
    pub achievement: Achievement,
}

pub const KEY_SOURCES: &[KeySource] = &[
    KeySource {
        id: "encrypted.b64",
        fragment: "subject_zero",
        description: "Verschlüsselte Nachricht",
        achievement: Achievement::KeyPartEncrypted,
    },
    KeySource {
        id: "log01.txt",
        fragment: "omega-734",
        description: "System Log",
        achievement: Achievement::KeyPartLog,
    },
];

pub fn key_source(id: &str) -> Option<&'static KeySource> {
    KEY_SOURCES.iter().find(|k| k.id == id)
}
