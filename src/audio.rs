//! Audio feedback
//!
//! The game only names cues. What a sink does with them is up to the sink,
//! and a sink that fails is simply ignored.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Named sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Keypress,
    Success,
    Error,
    Ambient,
    Glitch,
    Unlock,
}

impl Cue {
    pub fn name(&self) -> &'static str {
        match self {
            Cue::Keypress => "keypress",
            Cue::Success => "success",
            Cue::Error => "error",
            Cue::Ambient => "ambient",
            Cue::Glitch => "glitch",
            Cue::Unlock => "unlock",
        }
    }
}

/// Something that can play cues
pub trait AudioSink {
    fn play(&mut self, cue: Cue) -> io::Result<()>;

    /// 0.0 mutes the sink
    fn set_volume(&mut self, _volume: f32) {}
}

/// Plays nothing
#[derive(Debug, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _cue: Cue) -> io::Result<()> {
        Ok(())
    }
}

/// Rings the terminal bell for the loud cues
pub struct TerminalBell<W: Write> {
    out: W,
    volume: f32,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out, volume: 1.0 }
    }
}

impl<W: Write> AudioSink for TerminalBell<W> {
    fn play(&mut self, cue: Cue) -> io::Result<()> {
        if self.volume <= 0.0 {
            return Ok(());
        }
        match cue {
            Cue::Error | Cue::Glitch | Cue::Unlock => {
                self.out.write_all(b"\x07")?;
                self.out.flush()
            }
            _ => Ok(()),
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}

/// Remembers every cue it was asked to play
#[derive(Debug, Clone, Default)]
pub struct CueLog {
    cues: Rc<RefCell<Vec<Cue>>>,
    muted: bool,
}

impl CueLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.cues.borrow().clone()
    }
}

impl AudioSink for CueLog {
    fn play(&mut self, cue: Cue) -> io::Result<()> {
        if !self.muted {
            self.cues.borrow_mut().push(cue);
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.muted = volume <= 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bell_rings_for_errors_only() {
        let mut bell = TerminalBell::new(Vec::new());
        bell.play(Cue::Keypress).unwrap();
        bell.play(Cue::Error).unwrap();
        assert_eq!(bell.out, b"\x07");
    }

    #[test]
    fn test_muted_bell_is_silent() {
        let mut bell = TerminalBell::new(Vec::new());
        bell.set_volume(0.0);
        bell.play(Cue::Error).unwrap();
        assert!(bell.out.is_empty());
    }

    #[test]
    fn test_cue_log_shares_history() {
        let log = CueLog::new();
        let mut sink = log.clone();
        sink.play(Cue::Unlock).unwrap();
        assert_eq!(log.cues(), vec![Cue::Unlock]);
    }
}
