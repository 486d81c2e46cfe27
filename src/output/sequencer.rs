//! Timed playback of scripts
//!
//! The sequencer is a state machine driven by a millisecond clock. Each
//! `poll` does all work that is due and then reports whether it is waiting
//! on the clock, idle, or has a signal for its owner. Nothing is ever
//! cancelled: once queued, a step runs to completion.

use super::{DisplaySink, LineHandle, RegionId, Script, Signal, Step, Timing};
use crate::data::{gibberish_char, Tone};
use rand::Rng;
use std::collections::VecDeque;

/// Corruption above which characters start to glitch
pub const GLITCH_THRESHOLD: u32 = 35;

/// How long a glitched character stays on screen
pub const GLITCH_HOLD_MS: u64 = 50;

/// Upper bound for the per-character glitch chance
pub const GLITCH_CAP: f64 = 0.6;

/// Chance that a single character glitches at this corruption level
pub fn glitch_probability(corruption: u32) -> f64 {
    if corruption <= GLITCH_THRESHOLD {
        return 0.0;
    }
    (corruption as f64 / 150.0).min(GLITCH_CAP)
}

/// Result of a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// The owner must handle this before polling again
    Signal(Signal),
    /// Waiting for the clock
    Pending,
    /// Nothing left to play
    Idle,
}

#[derive(Debug)]
struct TypingLine {
    handle: LineHandle,
    chars: Vec<char>,
    shown: usize,
    glitched: bool,
}

impl TypingLine {
    fn prefix(&self) -> String {
        self.chars[..self.shown].iter().collect()
    }
}

#[derive(Debug)]
enum Active {
    Typing {
        lines: VecDeque<String>,
        delay: u64,
        line: Option<TypingLine>,
    },
    Progress {
        label: String,
        value: u32,
        to: u32,
        step: u32,
        interval: u64,
        handle: Option<LineHandle>,
    },
}

#[derive(Debug)]
pub struct Sequencer {
    steps: VecDeque<Step>,
    active: Option<Active>,
    region: Option<RegionId>,
    clock: u64,
    timing: Timing,
}

impl Sequencer {
    pub fn new(timing: Timing) -> Self {
        Self {
            steps: VecDeque::new(),
            active: None,
            region: None,
            clock: 0,
            timing,
        }
    }

    /// Queue a script behind whatever is already playing
    pub fn enqueue(&mut self, script: Script, now: u64) {
        if self.is_idle() {
            self.clock = self.clock.max(now);
        }
        self.steps.extend(script.into_steps());
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.steps.is_empty()
    }

    /// Time the next piece of work is due
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Drop everything queued. Only used when the whole session restarts.
    pub fn reset(&mut self, now: u64) {
        self.steps.clear();
        self.active = None;
        self.region = None;
        self.clock = now;
    }

    /// Do all work due at `now`
    pub fn poll<D, R>(&mut self, now: u64, corruption: u32, sink: &mut D, rng: &mut R) -> Poll
    where
        D: DisplaySink + ?Sized,
        R: Rng + ?Sized,
    {
        loop {
            if self.clock > now {
                return Poll::Pending;
            }

            if let Some(mut active) = self.active.take() {
                if let Some(delay) = self.advance(&mut active, corruption, sink, rng) {
                    self.clock += delay;
                    self.active = Some(active);
                }
                continue;
            }

            let Some(step) = self.steps.pop_front() else {
                return Poll::Idle;
            };

            match step {
                Step::OpenRegion(tone) => self.region = Some(sink.open_region(tone)),
                Step::SetTone(tone) => {
                    if let Some(region) = self.region {
                        sink.set_tone(region, tone);
                    }
                }
                Step::Type { lines, speed } => {
                    self.active = Some(Active::Typing {
                        lines: lines.into(),
                        delay: self.timing.char_delay(speed),
                        line: None,
                    });
                }
                Step::Progress {
                    label,
                    from,
                    to,
                    step,
                    interval_ms,
                } => {
                    self.active = Some(Active::Progress {
                        label,
                        value: from,
                        to,
                        step: step.max(1),
                        interval: self.timing.pause(interval_ms),
                        handle: None,
                    });
                }
                Step::Pause(ms) => self.clock += self.timing.pause(ms),
                Step::Clear => {
                    sink.clear();
                    self.region = None;
                }
                Step::Signal(signal) => return Poll::Signal(signal),
            }
        }
    }

    fn ensure_region<D: DisplaySink + ?Sized>(&mut self, sink: &mut D) -> RegionId {
        match self.region {
            Some(region) => region,
            None => {
                let region = sink.open_region(Tone::Plain);
                self.region = Some(region);
                region
            }
        }
    }

    /// Perform one unit of work. Returns the delay before the next unit,
    /// or None when the active step is finished.
    fn advance<D, R>(
        &mut self,
        active: &mut Active,
        corruption: u32,
        sink: &mut D,
        rng: &mut R,
    ) -> Option<u64>
    where
        D: DisplaySink + ?Sized,
        R: Rng + ?Sized,
    {
        match active {
            Active::Typing { lines, delay, line } => loop {
                let Some(current) = line.as_mut() else {
                    let text = lines.pop_front()?;
                    let region = self.ensure_region(sink);
                    let handle = sink.append_line(region, "");
                    *line = Some(TypingLine {
                        handle,
                        chars: text.chars().collect(),
                        shown: 0,
                        glitched: false,
                    });
                    continue;
                };

                if current.glitched {
                    current.glitched = false;
                    sink.update_line(current.handle, &current.prefix());
                    return Some(*delay);
                }

                if current.shown >= current.chars.len() {
                    *line = None;
                    continue;
                }

                current.shown += 1;
                let ch = current.chars[current.shown - 1];
                let chance = glitch_probability(corruption);
                if self.timing.animate && ch != ' ' && chance > 0.0 && rng.gen_bool(chance) {
                    let mut glitched: String = current.chars[..current.shown - 1].iter().collect();
                    glitched.push(gibberish_char(rng));
                    sink.update_line(current.handle, &glitched);
                    sink.scroll_to_latest();
                    current.glitched = true;
                    return Some(GLITCH_HOLD_MS);
                }

                sink.update_line(current.handle, &current.prefix());
                sink.scroll_to_latest();
                return Some(*delay);
            },
            Active::Progress {
                label,
                value,
                to,
                step,
                interval,
                handle,
            } => {
                if *value > *to {
                    return None;
                }
                let text = format!("{}: {}%", label, value);
                match handle {
                    Some(h) => sink.update_line(*h, &text),
                    None => {
                        let region = self.ensure_region(sink);
                        *handle = Some(sink.append_line(region, &text));
                    }
                }
                sink.scroll_to_latest();
                *value += *step;
                Some(*interval)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{Speed, Transcript};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Transcript that also remembers every intermediate line state
    #[derive(Default)]
    struct Recorder {
        inner: Transcript,
        updates: Vec<String>,
    }

    impl DisplaySink for Recorder {
        fn open_region(&mut self, tone: Tone) -> RegionId {
            self.inner.open_region(tone)
        }
        fn set_tone(&mut self, region: RegionId, tone: Tone) {
            self.inner.set_tone(region, tone)
        }
        fn append_line(&mut self, region: RegionId, text: &str) -> LineHandle {
            self.inner.append_line(region, text)
        }
        fn update_line(&mut self, handle: LineHandle, text: &str) {
            self.updates.push(text.to_string());
            self.inner.update_line(handle, text)
        }
        fn clear(&mut self) {
            self.inner.clear()
        }
        fn scroll_to_latest(&mut self) {
            self.inner.scroll_to_latest()
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_types_one_character_per_delay() {
        let mut seq = Sequencer::new(Timing::default());
        let mut sink = Transcript::new();
        let mut rng = rng();
        let mut script = Script::new();
        script.region(Tone::Plain).line("ab");
        seq.enqueue(script, 0);

        assert_eq!(seq.poll(0, 0, &mut sink, &mut rng), Poll::Pending);
        assert_eq!(sink.last_line(), Some("a"));
        assert_eq!(seq.poll(29, 0, &mut sink, &mut rng), Poll::Pending);
        assert_eq!(sink.last_line(), Some("a"));
        assert_eq!(seq.poll(30, 0, &mut sink, &mut rng), Poll::Pending);
        assert_eq!(sink.last_line(), Some("ab"));
        assert_eq!(seq.poll(60, 0, &mut sink, &mut rng), Poll::Idle);
    }

    #[test]
    fn test_glitches_never_change_final_text() {
        let mut seq = Sequencer::new(Timing::default());
        let mut sink = Recorder::default();
        let mut rng = rng();
        let line = "VERBINDUNG ZU subject_zero HERGESTELLT.";
        let mut script = Script::new();
        script.line(line);
        seq.enqueue(script, 0);

        assert_eq!(seq.poll(u64::MAX / 2, 100, &mut sink, &mut rng), Poll::Idle);
        assert_eq!(sink.inner.last_line(), Some(line));
        let glitched = sink.updates.iter().filter(|u| !line.starts_with(u.as_str())).count();
        assert!(glitched > 0, "expected at least one transient glitch");
    }

    #[test]
    fn test_no_glitches_at_low_corruption() {
        let mut seq = Sequencer::new(Timing::default());
        let mut sink = Recorder::default();
        let mut rng = rng();
        let line = "Speicherprüfung... OK";
        let mut script = Script::new();
        script.line(line);
        seq.enqueue(script, 0);

        seq.poll(u64::MAX / 2, GLITCH_THRESHOLD, &mut sink, &mut rng);
        assert!(sink.updates.iter().all(|u| line.starts_with(u.as_str())));
    }

    #[test]
    fn test_glitch_probability_is_capped() {
        assert_eq!(glitch_probability(35), 0.0);
        assert!((glitch_probability(75) - 0.5).abs() < f64::EPSILON);
        assert_eq!(glitch_probability(10_000), GLITCH_CAP);
    }

    #[test]
    fn test_progress_updates_one_line() {
        let mut seq = Sequencer::new(Timing::default());
        let mut sink = Transcript::new();
        let mut rng = rng();
        let mut script = Script::new();
        script.progress("Scan", 10, 120);
        seq.enqueue(script, 0);

        seq.poll(0, 0, &mut sink, &mut rng);
        assert_eq!(sink.last_line(), Some("Scan: 0%"));
        seq.poll(120 * 10, 0, &mut sink, &mut rng);
        assert_eq!(sink.last_line(), Some("Scan: 100%"));
        assert_eq!(sink.line_count(), 1);
        assert_eq!(seq.poll(120 * 11, 0, &mut sink, &mut rng), Poll::Idle);
    }

    #[test]
    fn test_signals_come_back_in_order() {
        let mut seq = Sequencer::new(Timing::instant());
        let mut sink = Transcript::new();
        let mut rng = rng();
        let mut script = Script::new();
        script
            .line("x")
            .signal(Signal::Fade)
            .pause(2500)
            .signal(Signal::Reward);
        seq.enqueue(script, 0);

        assert_eq!(seq.poll(0, 0, &mut sink, &mut rng), Poll::Signal(Signal::Fade));
        assert_eq!(seq.poll(0, 0, &mut sink, &mut rng), Poll::Signal(Signal::Reward));
        assert_eq!(seq.poll(0, 0, &mut sink, &mut rng), Poll::Idle);
    }

    #[test]
    fn test_pause_waits_for_clock() {
        let mut seq = Sequencer::new(Timing::default());
        let mut sink = Transcript::new();
        let mut rng = rng();
        let mut script = Script::new();
        script.pause(1000).signal(Signal::Restart);
        seq.enqueue(script, 500);

        assert_eq!(seq.poll(1499, 0, &mut sink, &mut rng), Poll::Pending);
        assert_eq!(seq.poll(1500, 0, &mut sink, &mut rng), Poll::Signal(Signal::Restart));
    }

    #[test]
    fn test_clear_drops_region_and_reopens() {
        let mut seq = Sequencer::new(Timing::instant());
        let mut sink = Transcript::new();
        let mut rng = rng();
        let mut script = Script::new();
        script
            .region(Tone::Error)
            .line("before")
            .clear()
            .type_lines(["after"], Speed::Fast);
        seq.enqueue(script, 0);

        assert_eq!(seq.poll(0, 0, &mut sink, &mut rng), Poll::Idle);
        let lines: Vec<(Tone, &str)> = sink.lines().collect();
        assert_eq!(lines, vec![(Tone::Plain, "after")]);
    }
}
