//! The session controller
//!
//! Owns the game state and everything around it: the transcript, the input
//! line, the output sequencer, storage and audio. The host drives it with a
//! millisecond clock through [`Session::start`], [`Session::submit`] and
//! [`Session::tick`]. Only one command is ever in flight.

use super::command::tokenize;
use super::handlers::{dispatch, Context, LOCKDOWN_DURATION_MS};
use super::persistence::{self, StateStore, STORAGE_KEY};
use super::progress::{self, ACHIEVEMENT_CHECK_INTERVAL_MS};
use super::{GameState, InputLine};
use crate::audio::{AudioSink, Cue};
use crate::config::Settings;
use crate::data::Tone;
use crate::output::{DisplaySink, Poll, Script, Sequencer, Signal, Speed, Transcript};
use rand::rngs::StdRng;
use uuid::Uuid;

/// How long an achievement toast stays up
pub const TOAST_DURATION_MS: u64 = 3000;

/// How long the terminal shakes after a bad command
pub const SHAKE_DURATION_MS: u64 = 400;

const BOOT_LINES: [&str; 5] = [
    "ZERFALL PROTOKOLL v7.3.4 wird gestartet...",
    "Speicherprüfung... OK",
    "System-Integrität... 99.8%",
    "Bereit.",
    " ",
];

/// A transient notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub text: String,
    pub until: u64,
}

/// Visual effects requested by the game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    pub shake_until: u64,
    pub faded: bool,
    pub reward: bool,
}

/// What finishes when the sequencer drains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Boot,
    Command,
}

pub struct Session {
    state: GameState,
    transcript: Transcript,
    input: InputLine,
    sequencer: Sequencer,
    store: Box<dyn StateStore>,
    audio: Box<dyn AudioSink>,
    rng: StdRng,
    settings: Settings,
    id: Uuid,
    lockdown_until: Option<u64>,
    next_achievement_check: u64,
    pending: Option<Pending>,
    effects: Effects,
    toasts: Vec<Toast>,
}

impl Session {
    /// Create a session, restoring the saved game if there is a usable one
    pub fn new(
        store: Box<dyn StateStore>,
        audio: Box<dyn AudioSink>,
        settings: Settings,
        rng: StdRng,
    ) -> Self {
        let mut session = Self::fresh(store, audio, settings, rng);
        session.restore();
        session
    }

    /// Create a session that ignores any saved game
    pub fn fresh(
        store: Box<dyn StateStore>,
        mut audio: Box<dyn AudioSink>,
        settings: Settings,
        rng: StdRng,
    ) -> Self {
        audio.set_volume(settings.volume());
        let id = Uuid::new_v4();
        tracing::info!(session = %id, "New session");
        Self {
            state: GameState::new(0),
            transcript: Transcript::new(),
            input: InputLine::new(),
            sequencer: Sequencer::new(settings.timing()),
            store,
            audio,
            rng,
            settings,
            id,
            lockdown_until: None,
            next_achievement_check: 0,
            pending: None,
            effects: Effects::default(),
            toasts: Vec::new(),
        }
    }

    fn restore(&mut self) {
        match persistence::load_state(self.store.as_ref(), &mut self.state) {
            Ok(true) => tracing::info!(
                "Restored save: phase {}, corruption {}",
                self.state.phase,
                self.state.corruption
            ),
            Ok(false) => tracing::debug!("No save found"),
            Err(e) => {
                tracing::warn!("Ignoring save: {}", e);
                self.state = GameState::new(0);
            }
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn input(&self) -> &InputLine {
        &self.input
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn effects(&self) -> Effects {
        self.effects
    }

    pub fn is_shaking(&self, now: u64) -> bool {
        now < self.effects.shake_until
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// True once nothing is playing and no command is in flight
    pub fn is_idle(&self) -> bool {
        self.sequencer.is_idle() && self.pending.is_none()
    }

    /// Whether an input line should be shown at all
    pub fn shows_prompt(&self) -> bool {
        !self.state.is_collapsing && !self.state.is_booting
    }

    /// Run the boot sequence
    pub fn start(&mut self, now: u64) {
        self.state.start_time_ms = now;
        self.state.is_booting = true;
        self.state.input_enabled = false;
        self.next_achievement_check = now + ACHIEVEMENT_CHECK_INTERVAL_MS;

        if self.settings.audio_enabled {
            self.play(Cue::Ambient);
        }

        let mut script = Script::new();
        script
            .region(Tone::Plain)
            .type_lines(BOOT_LINES, Speed::Fast)
            .type_lines([self.state.phase.objective_line()], Speed::Fast);
        self.sequencer.enqueue(script, now);
        self.pending = Some(Pending::Boot);
    }

    /// Submit a line. Returns false if input is currently blocked.
    pub fn submit(&mut self, raw: &str, now: u64) -> bool {
        if !self.state.accepts_input() {
            tracing::debug!("Input rejected while blocked");
            return false;
        }
        self.state.is_processing = true;
        self.state.input_enabled = false;

        if !raw.trim().is_empty() {
            self.state.command_history.push(raw.to_string());
        }
        self.state.command_history_index = self.state.command_history.len();
        self.input.reset();

        let Some(invocation) = tokenize(raw) else {
            self.finish_command();
            return true;
        };

        let mut ctx = Context::new(&mut self.state, &mut self.rng, now);
        ctx.script.region(Tone::Plain);
        progress::fire_story_events(&mut ctx);
        dispatch(&mut ctx, &invocation);

        let Context {
            script,
            awarded,
            toasts,
            ..
        } = ctx;
        self.push_toasts(toasts, now);
        if !awarded.is_empty() {
            self.persist();
        }

        self.sequencer.enqueue(script, now);
        self.pending = Some(Pending::Command);
        true
    }

    /// Advance playback, timers and periodic checks to `now`
    pub fn tick(&mut self, now: u64) {
        if let Some(until) = self.lockdown_until {
            if now >= until {
                self.end_lockdown(now);
            }
        }

        loop {
            let poll = self.sequencer.poll(
                now,
                self.state.corruption,
                &mut self.transcript,
                &mut self.rng,
            );
            match poll {
                Poll::Signal(signal) => self.handle_signal(signal, now),
                Poll::Pending => break,
                Poll::Idle => {
                    if let Some(pending) = self.pending.take() {
                        self.settle(pending);
                    }
                    break;
                }
            }
        }

        if now >= self.next_achievement_check {
            self.next_achievement_check = now + ACHIEVEMENT_CHECK_INTERVAL_MS;
            self.check_achievements(now);
        }

        self.toasts.retain(|t| t.until > now);
    }

    // Input line editing. Ignored while input is blocked.

    pub fn type_char(&mut self, c: char) {
        if self.state.accepts_input() {
            self.input.insert(c);
            self.play(Cue::Keypress);
        }
    }

    pub fn edit<F: FnOnce(&mut InputLine)>(&mut self, f: F) {
        if self.state.accepts_input() {
            f(&mut self.input);
        }
    }

    pub fn history_previous(&mut self) {
        if self.state.accepts_input() {
            let state = &mut self.state;
            self.input
                .recall_previous(&state.command_history, &mut state.command_history_index);
        }
    }

    pub fn history_next(&mut self) {
        if self.state.accepts_input() {
            let state = &mut self.state;
            self.input
                .recall_next(&state.command_history, &mut state.command_history_index);
        }
    }

    pub fn complete(&mut self) {
        if self.state.accepts_input() {
            self.input.complete(self.state.rebellion_mode);
        }
    }

    /// Submit whatever is on the input line
    pub fn submit_input(&mut self, now: u64) -> bool {
        let line = self.input.value().to_string();
        self.submit(&line, now)
    }

    fn handle_signal(&mut self, signal: Signal, now: u64) {
        match signal {
            Signal::Cue(cue) => self.play(cue),
            Signal::Shake => self.effects.shake_until = now + SHAKE_DURATION_MS,
            Signal::Fade => self.effects.faded = true,
            Signal::Reward => {
                tracing::info!("Reward revealed");
                self.effects.reward = true;
            }
            Signal::ArmLockdown => {
                // Count from when the announcement finished, not from this tick
                self.lockdown_until = Some(self.sequencer.clock() + LOCKDOWN_DURATION_MS);
            }
            Signal::Restart => self.restart(now),
        }
    }

    fn settle(&mut self, pending: Pending) {
        match pending {
            Pending::Boot => {
                self.state.is_booting = false;
                self.state.input_enabled = !self.state.is_locked_down && !self.state.is_collapsing;
            }
            Pending::Command => self.finish_command(),
        }
    }

    fn finish_command(&mut self) {
        if !self.state.is_collapsing && !self.state.is_locked_down {
            self.state.input_enabled = true;
        }
        self.state.is_processing = false;
        self.persist();
    }

    fn end_lockdown(&mut self, now: u64) {
        self.lockdown_until = None;
        self.state.is_locked_down = false;
        self.state.invalid_command_count = 0;
        if !self.state.is_processing && !self.state.is_collapsing {
            self.state.input_enabled = true;
        }
        tracing::info!("Lockdown lifted");

        let mut script = Script::new();
        script
            .region(Tone::System)
            .line("System wieder entsperrt. Bleiben Sie wachsam.");
        self.sequencer.enqueue(script, now);
    }

    fn check_achievements(&mut self, now: u64) {
        let mut ctx = Context::new(&mut self.state, &mut self.rng, now);
        progress::check_achievements(&mut ctx);
        let Context { awarded, toasts, .. } = ctx;
        if !awarded.is_empty() {
            self.push_toasts(toasts, now);
            self.persist();
        }
    }

    fn restart(&mut self, now: u64) {
        tracing::info!("Restarting session");
        if let Err(e) = self.store.remove(STORAGE_KEY) {
            tracing::warn!("Could not clear save: {}", e);
        }
        self.state = GameState::new(now);
        self.transcript.clear();
        self.input.reset();
        self.sequencer.reset(now);
        self.lockdown_until = None;
        self.pending = None;
        self.effects = Effects::default();
        self.toasts.clear();
        self.start(now);
    }

    fn push_toasts(&mut self, toasts: Vec<String>, now: u64) {
        self.toasts.extend(toasts.into_iter().map(|text| Toast {
            text,
            until: now + TOAST_DURATION_MS,
        }));
    }

    fn play(&mut self, cue: Cue) {
        if let Err(e) = self.audio.play(cue) {
            tracing::debug!("Audio cue {} failed: {}", cue.name(), e);
        }
    }

    fn persist(&mut self) {
        if let Err(e) = persistence::save_state(self.store.as_mut(), &self.state) {
            tracing::warn!("Could not save game: {}", e);
        }
    }
}
