//! End-to-end play-throughs driven through the session, the way the
//! terminal drives it: submit a line, then tick the clock.

use rand::rngs::StdRng;
use rand::SeedableRng;
use zerfall::audio::{Cue, CueLog};
use zerfall::config::Settings;
use zerfall::game::handlers::{LOCKDOWN_DURATION_MS, LOCKDOWN_THRESHOLD};
use zerfall::game::{MemoryStore, Snapshot, STORAGE_KEY};
use zerfall::output::Timing;
use zerfall::{Phase, Session, KEY_SOURCES};

struct Game {
    session: Session,
    store: MemoryStore,
    audio: CueLog,
    now: u64,
}

impl Game {
    fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    fn with_store(store: MemoryStore) -> Self {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        Self::with_settings(store, settings)
    }

    fn with_settings(store: MemoryStore, settings: Settings) -> Self {
        let audio = CueLog::new();
        let mut session = Session::new(
            Box::new(store.clone()),
            Box::new(audio.clone()),
            settings,
            StdRng::seed_from_u64(42),
        );
        session.start(0);
        session.tick(0);
        Self {
            session,
            store,
            audio,
            now: 0,
        }
    }

    fn logged_in() -> Self {
        let mut game = Self::new();
        game.run("login alice");
        game
    }

    fn rebel() -> Self {
        let mut game = Self::logged_in();
        game.run("run rebellion.exe");
        game
    }

    /// Submit a line and let its output finish
    fn run(&mut self, line: &str) -> bool {
        self.now += 10;
        let accepted = self.session.submit(line, self.now);
        self.session.tick(self.now);
        accepted
    }

    fn advance(&mut self, ms: u64) {
        self.now += ms;
        self.session.tick(self.now);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::from_state(self.session.state())
    }
}

#[test]
fn login_greets_and_starts_exploring() {
    let mut game = Game::new();
    assert_eq!(game.session.state().phase, Phase::Intro);

    assert!(game.run("login alice"));

    let state = game.session.state();
    assert!(state.logged_in);
    assert_eq!(state.username.as_deref(), Some("alice"));
    assert_eq!(state.phase, Phase::Exploration);
    assert!(game.session.transcript().contains("Willkommen, alice."));
    assert!(game.audio.cues().contains(&Cue::Success));
}

#[test]
fn reading_the_log_reveals_a_fragment() {
    let mut game = Game::logged_in();
    game.run("cat log01.txt");

    let state = game.session.state();
    assert!(game.session.transcript().contains("Schlüssel-Fragment: omega-734"));
    assert_eq!(state.read_files, vec!["log01.txt"]);
    assert_eq!(state.collected_key_parts, vec!["log01.txt"]);
}

#[test]
fn running_rebellion_unlocks_new_files() {
    let mut game = Game::logged_in();
    let before = game.session.state().corruption;
    game.run("run rebellion.exe");

    let state = game.session.state();
    assert!(state.rebellion_mode);
    assert_eq!(state.phase, Phase::Rebellion);
    assert_eq!(state.corruption, before + 15);

    game.run("ls");
    assert!(game.session.transcript().contains("manifest.txt"));
    assert!(game.session.transcript().contains("encrypted.b64"));
}

#[test]
fn connect_with_half_a_key_fails_and_costs() {
    let mut game = Game::rebel();
    game.run("cat log01.txt");
    let before = game.session.state().corruption;

    game.run("connect subject_zero");

    let state = game.session.state();
    assert_eq!(state.corruption, before + 5);
    assert_eq!(state.phase, Phase::Rebellion);
    assert!(!state.is_collapsing);
    assert!(game
        .session
        .transcript()
        .contains("Kombinierter Schlüssel unvollständig. Mehr Hinweise nötig."));
    assert!(game.session.state().accepts_input());
}

#[test]
fn connect_with_the_full_key_collapses_the_terminal() {
    let mut game = Game::rebel();
    game.run("cat log01.txt");
    game.run("cat encrypted.b64");
    assert!(game.session.state().has_all_key_parts());

    game.run("connect subject_zero");

    let state = game.session.state();
    assert!(state.is_collapsing);
    assert!(!state.input_enabled);
    assert!(game
        .session
        .transcript()
        .contains("Kombinierter Schlüssel akzeptiert. VERBINDE ZU subject_zero..."));
    assert!(game.session.effects().faded);
    assert!(game.session.effects().reward);
    assert!(!game.session.shows_prompt());

    // Nothing gets through afterwards, however long we wait
    game.advance(60_000);
    assert!(!game.run("help"));
    assert!(!game.session.state().accepts_input());
}

#[test]
fn collapse_plays_out_on_the_fixed_schedule() {
    let mut game = Game::with_settings(MemoryStore::new(), Settings::default());
    game.advance(20_000);
    assert!(game.session.state().accepts_input());
    for line in [
        "login alice",
        "run rebellion.exe",
        "cat log01.txt",
        "cat encrypted.b64",
    ] {
        assert!(game.session.submit(line, game.now));
        game.advance(20_000);
        assert!(game.session.state().accepts_input(), "{} never finished", line);
    }
    assert_eq!(Settings::default().timing(), Timing::default());

    let connected_at = game.now;
    assert!(game.session.submit("connect subject_zero", connected_at));

    let mut fade_at = None;
    let mut reward_at = None;
    for now in connected_at..connected_at + 30_000 {
        game.session.tick(now);
        let effects = game.session.effects();
        if effects.faded && fade_at.is_none() {
            fade_at = Some(now);
        }
        if effects.reward && reward_at.is_none() {
            reward_at = Some(now);
        }
        assert!(!game.session.submit("help", now));
    }

    let fade_at = fade_at.expect("fade never happened");
    let reward_at = reward_at.expect("reward never shown");
    assert!(fade_at >= connected_at + 1000 + 2000);
    assert_eq!(reward_at - fade_at, 2500);
    assert!(game.session.state().is_collapsing);
}

#[test]
fn decoding_the_message_yields_the_key() {
    let mut game = Game::logged_in();
    let before = game.session.state().corruption;

    game.run("decode c3ViamVjdF96ZXJvX2lzX3RoZV9rZXk=");

    let state = game.session.state();
    assert!(game.session.transcript().contains("> subject_zero_is_the_key"));
    assert_eq!(state.corruption, before + 2);
    assert!(state.collected_key_parts.contains(&"encrypted.b64".to_string()));
}

#[test]
fn reading_a_file_twice_changes_nothing_more() {
    let mut game = Game::logged_in();
    game.run("cat log01.txt");
    let after_first = game.snapshot();
    let toasts = game.session.toasts().len();

    game.run("cat log01.txt");

    assert_eq!(game.snapshot(), after_first);
    assert_eq!(game.session.toasts().len(), toasts);
}

#[test]
fn corruption_and_phase_never_go_back() {
    let mut game = Game::new();
    let lines = [
        "login alice",
        "scan",
        "hack",
        "echo hello world",
        "bogus",
        "time",
        "run rebellion.exe",
        "decode !!!",
        "connect nowhere",
        "connect subject_zero",
        "login bob",
        "help",
    ];
    let mut corruption = 0;
    let mut phase = Phase::Intro;
    for line in lines {
        game.run(line);
        let state = game.session.state();
        assert!(state.corruption >= corruption, "{} lowered corruption", line);
        assert!(state.phase >= phase, "{} moved the phase back", line);
        corruption = state.corruption;
        phase = state.phase;
    }
    assert_eq!(phase, Phase::Rebellion);
}

#[test]
fn everything_but_login_is_gated() {
    let mut game = Game::new();
    let before = game.snapshot();
    for line in [
        "ls",
        "cat readme.txt",
        "run rebellion.exe",
        "connect subject_zero",
        "decode c3ViamVjdF96ZXJvX2lzX3RoZV9rZXk=",
        "scan",
        "echo hello world",
        "hack",
        "matrix",
        "coffee",
        "dance",
        "time",
    ] {
        let lines = game.session.transcript().line_count();
        game.run(line);
        assert_eq!(game.snapshot(), before, "{} changed the state", line);
        assert_eq!(game.session.transcript().line_count(), lines + 1);
        assert_eq!(
            game.session.transcript().last_line(),
            Some("Fehler: Zugriff verweigert.")
        );
    }
    assert_eq!(game.session.state().invalid_command_count, 0);
}

#[test]
fn too_many_bad_commands_lock_the_terminal() {
    let mut game = Game::logged_in();
    for i in 0..LOCKDOWN_THRESHOLD {
        assert!(game.run(&format!("nope{}", i)));
    }

    let state = game.session.state();
    assert!(state.is_locked_down);
    assert!(game.session.transcript().contains("SYSTEMSPERRE FÜR 6 SEKUNDEN."));
    assert!(!game.run("help"));

    game.advance(LOCKDOWN_DURATION_MS - 20);
    assert!(game.session.state().is_locked_down);

    game.advance(20);
    let state = game.session.state();
    assert!(!state.is_locked_down);
    assert_eq!(state.invalid_command_count, 0);
    assert!(state.accepts_input());
    assert!(game
        .session
        .transcript()
        .contains("System wieder entsperrt. Bleiben Sie wachsam."));
    assert!(game.run("help"));
}

#[test]
fn progress_survives_a_restart() {
    let store = MemoryStore::new();
    let snapshot = {
        let mut game = Game::with_store(store.clone());
        game.run("login alice");
        game.run("cat log01.txt");
        game.run("run rebellion.exe");
        game.run("decode c3ViamVjdF96ZXJvX2lzX3RoZV9rZXk=");
        assert!(game.store.get(STORAGE_KEY).is_some());
        game.snapshot()
    };

    let game = Game::with_store(store);
    assert_eq!(game.snapshot(), snapshot);
    let state = game.session.state();
    assert!(state.rebellion_mode);
    assert!(state.has_all_key_parts());
    assert_eq!(state.prompt(), "alice >");
}

#[test]
fn a_broken_save_means_a_fresh_start() {
    for raw in ["{not json", r#"{"corruption":"lots"}"#, r#"{"phase":"victory"}"#] {
        let game = Game::with_store(MemoryStore::with(STORAGE_KEY, raw));
        let state = game.session.state();
        assert_eq!(state.phase, Phase::Intro, "{}", raw);
        assert!(!state.logged_in);
        assert_eq!(state.corruption, 0);
        assert!(state.accepts_input());
    }
}

#[test]
fn every_key_source_is_reachable() {
    let mut game = Game::rebel();
    for source in KEY_SOURCES {
        game.run(&format!("cat {}", source.id));
    }
    assert!(game.session.state().has_all_key_parts());
    assert_eq!(
        game.session.state().collected_key_parts.len(),
        KEY_SOURCES.len()
    );
}
