//! One-shot story events
//!
//! Each event is guarded by its own achievement, so it fires at most once
//! per save.

use super::Achievement;
use crate::audio::Cue;
use crate::game::GameState;

/// Corruption level that flips the status display into danger mode
pub const DANGER_THRESHOLD: u32 = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoryEvent {
    Corruption30,
    Corruption50,
}

impl StoryEvent {
    pub const ALL: [StoryEvent; 2] = [StoryEvent::Corruption30, StoryEvent::Corruption50];

    pub fn threshold(&self) -> u32 {
        match self {
            StoryEvent::Corruption30 => 30,
            StoryEvent::Corruption50 => 50,
        }
    }

    pub fn achievement(&self) -> Achievement {
        match self {
            StoryEvent::Corruption30 => Achievement::Corruption30,
            StoryEvent::Corruption50 => Achievement::Corruption50,
        }
    }

    pub fn lines(&self) -> &'static [&'static str] {
        match self {
            StoryEvent::Corruption30 => &[
                "W̷A̴R̶N̷U̶N̸G̷: System-Integrität gefährdet.",
                "Ungewöhnliche Muster erkannt...",
                "Beobachtet uns jemand?",
            ],
            StoryEvent::Corruption50 => &[
                "S̷Y̴S̵T̷E̵M̶ ̶K̷R̸I̵T̸I̴S̸C̷H̸",
                "D̸a̸t̵e̷n̷v̸e̸r̷l̴u̵s̵t̶ ̴u̶n̵a̸u̷s̵w̶e̶i̵c̶h̸l̶i̵c̴h̸",
            ],
        }
    }

    pub fn cue(&self) -> Option<Cue> {
        match self {
            StoryEvent::Corruption30 => None,
            StoryEvent::Corruption50 => Some(Cue::Glitch),
        }
    }

    /// True when the event should fire now
    pub fn triggered(&self, state: &GameState) -> bool {
        state.corruption >= self.threshold() && !state.has_achievement(self.achievement())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_fires_once() {
        let mut state = GameState::new(0);
        state.corruption = 31;
        assert!(StoryEvent::Corruption30.triggered(&state));
        assert!(!StoryEvent::Corruption50.triggered(&state));

        state.award(Achievement::Corruption30);
        assert!(!StoryEvent::Corruption30.triggered(&state));
    }
}
