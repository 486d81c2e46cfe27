//! Game phases and what each one allows

use serde::{Deserialize, Serialize};

/// Current phase of the game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Intro,       // Not logged in yet
    Exploration, // Reading files, hunting for clues
    Rebellion,   // rebellion.exe is running
}

impl Phase {
    /// Commands listed by `help` in this phase
    pub fn commands(&self) -> &'static [&'static str] {
        match self {
            Phase::Intro => &["login", "help", "clear"],
            Phase::Exploration => &[
                "ls", "cat", "scan", "run", "decode", "help", "clear", "reset", "echo",
            ],
            Phase::Rebellion => &["ls", "cat", "decode", "connect", "help", "clear", "reset"],
        }
    }

    /// Objective shown to the player
    pub fn goal(&self) -> &'static str {
        match self {
            Phase::Intro => "Zugang zum System erlangen",
            Phase::Exploration => "Finde Hinweise auf subject_zero",
            Phase::Rebellion => "Stelle die Verbindung zu subject_zero her",
        }
    }

    pub fn objective_line(&self) -> String {
        format!("Aktuelles Ziel: {}", self.goal())
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Intro => write!(f, "intro"),
            Phase::Exploration => write!(f, "exploration"),
            Phase::Rebellion => write!(f, "rebellion"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_are_ordered() {
        assert!(Phase::Intro < Phase::Exploration);
        assert!(Phase::Exploration < Phase::Rebellion);
    }

    #[test]
    fn test_phase_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Phase::Rebellion).unwrap(), "\"rebellion\"");
        let phase: Phase = serde_json::from_str("\"exploration\"").unwrap();
        assert_eq!(phase, Phase::Exploration);
    }

    #[test]
    fn test_connect_only_listed_in_rebellion() {
        assert!(!Phase::Exploration.commands().contains(&"connect"));
        assert!(Phase::Rebellion.commands().contains(&"connect"));
    }
}
