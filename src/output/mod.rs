//! Narrative output
//!
//! Handlers never write to the screen directly. They build a [`Script`] of
//! steps, and the [`Sequencer`] plays it into a [`DisplaySink`] over time.

pub mod sequencer;
pub mod transcript;

pub use sequencer::*;
pub use transcript::*;

use crate::audio::Cue;
use crate::data::Tone;

/// Typing speed of a block of lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Normal,
    Fast,
    Glitch,
    /// Fixed per-character delay in ms
    Custom(u64),
}

/// Delays the sequencer uses, resolved from settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub normal_ms: u64,
    pub fast_ms: u64,
    pub glitch_ms: u64,
    /// When false every delay is zero and glitches are skipped
    pub animate: bool,
}

impl Timing {
    pub fn instant() -> Self {
        Self {
            normal_ms: 0,
            fast_ms: 0,
            glitch_ms: 0,
            animate: false,
        }
    }

    pub fn char_delay(&self, speed: Speed) -> u64 {
        if !self.animate {
            return 0;
        }
        match speed {
            Speed::Normal => self.normal_ms,
            Speed::Fast => self.fast_ms,
            Speed::Glitch => self.glitch_ms,
            Speed::Custom(ms) => ms,
        }
    }

    pub fn pause(&self, ms: u64) -> u64 {
        if self.animate {
            ms
        } else {
            0
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            normal_ms: 30,
            fast_ms: 10,
            glitch_ms: 6,
            animate: true,
        }
    }
}

/// Things the sequencer hands back to its owner instead of drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Cue(Cue),
    /// Shake the terminal briefly
    Shake,
    /// Fade the main display
    Fade,
    /// Show the reward surface
    Reward,
    /// Lockdown message is out, start the lockdown clock
    ArmLockdown,
    /// Wipe the save and start over
    Restart,
}

/// One unit of a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    OpenRegion(Tone),
    SetTone(Tone),
    Type { lines: Vec<String>, speed: Speed },
    /// In-place counter, `"{label}: {value}%"`, from `from` to `to` inclusive
    Progress {
        label: String,
        from: u32,
        to: u32,
        step: u32,
        interval_ms: u64,
    },
    Pause(u64),
    Clear,
    Signal(Signal),
}

/// An ordered list of output steps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn region(&mut self, tone: Tone) -> &mut Self {
        self.push(Step::OpenRegion(tone))
    }

    pub fn tone(&mut self, tone: Tone) -> &mut Self {
        self.push(Step::SetTone(tone))
    }

    pub fn type_lines<I, S>(&mut self, lines: I, speed: Speed) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines = lines.into_iter().map(Into::into).collect();
        self.push(Step::Type { lines, speed })
    }

    /// A single line at normal speed
    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.type_lines([text.into()], Speed::Normal)
    }

    /// Tint the region, type the message, then play the matching cue
    pub fn feedback<I, S>(&mut self, tone: Tone, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tone(tone).type_lines(lines, Speed::Normal);
        match tone {
            Tone::Success => self.signal(Signal::Cue(Cue::Success)),
            Tone::Error => self.signal(Signal::Cue(Cue::Error)),
            _ => self,
        }
    }

    pub fn error(&mut self, text: impl Into<String>) -> &mut Self {
        self.feedback(Tone::Error, [text.into()])
    }

    pub fn pause(&mut self, ms: u64) -> &mut Self {
        self.push(Step::Pause(ms))
    }

    pub fn clear(&mut self) -> &mut Self {
        self.push(Step::Clear)
    }

    pub fn signal(&mut self, signal: Signal) -> &mut Self {
        self.push(Step::Signal(signal))
    }

    pub fn progress(&mut self, label: &str, step: u32, interval_ms: u64) -> &mut Self {
        self.push(Step::Progress {
            label: label.to_string(),
            from: 0,
            to: 100,
            step,
            interval_ms,
        })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    /// All text this script will type, in order
    pub fn text(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                Step::Type { lines, .. } => Some(lines.iter().map(String::as_str)),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn has_signal(&self, signal: Signal) -> bool {
        self.steps.contains(&Step::Signal(signal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_plays_cue_after_text() {
        let mut script = Script::new();
        script.feedback(Tone::Error, ["Fehler"]);
        assert_eq!(
            script.steps(),
            &[
                Step::SetTone(Tone::Error),
                Step::Type {
                    lines: vec!["Fehler".to_string()],
                    speed: Speed::Normal
                },
                Step::Signal(Signal::Cue(Cue::Error)),
            ]
        );
    }

    #[test]
    fn test_text_collects_typed_lines() {
        let mut script = Script::new();
        script.line("a").pause(10).type_lines(["b", "c"], Speed::Fast);
        assert_eq!(script.text(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_instant_timing_zeroes_delays() {
        let timing = Timing::instant();
        assert_eq!(timing.char_delay(Speed::Custom(50)), 0);
        assert_eq!(timing.pause(1500), 0);
        assert_eq!(Timing::default().char_delay(Speed::Fast), 10);
    }
}
