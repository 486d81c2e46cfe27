//! Command handlers
//!
//! Every handler validates against the game state, mutates it right away and
//! then describes its output as a script. Nothing here waits on the clock;
//! the session plays the script afterwards.

use super::command::{Command, Invocation};
use super::{progress, GameState};
use crate::audio::Cue;
use crate::data::*;
use crate::output::{Script, Signal, Speed};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use rand::{Rng, RngCore};

/// Unknown commands tolerated before the terminal locks
pub const LOCKDOWN_THRESHOLD: u32 = 5;

/// How long a lockdown lasts
pub const LOCKDOWN_DURATION_MS: u64 = 6000;

/// The only target `connect` accepts
pub const CONNECT_TARGET: &str = "subject_zero";

/// Shown on the reward surface after the collapse
pub const REWARD_TITLE: &str = "DU HAST ES GESCHAFFT.";

const ACCESS_DENIED: &str = "Fehler: Zugriff verweigert.";

const MATRIX_CHARS: &str = "日ﾊﾐﾋｰｳｼﾅﾓﾆｻﾜﾂｵﾘｱﾎﾃﾏｹﾒｴｶｷﾑﾕﾗｾﾈｽﾀﾇﾍ";

/// Base64 the way a browser decodes it: padding optional, stray bits ignored
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Everything a handler may touch
pub struct Context<'a> {
    pub state: &'a mut GameState,
    pub rng: &'a mut dyn RngCore,
    /// Session clock in ms
    pub now: u64,
    pub script: Script,
    /// Achievements awarded while handling
    pub awarded: Vec<Achievement>,
    /// Transient notifications for the player
    pub toasts: Vec<String>,
}

impl<'a> Context<'a> {
    pub fn new(state: &'a mut GameState, rng: &'a mut dyn RngCore, now: u64) -> Self {
        Self {
            state,
            rng,
            now,
            script: Script::new(),
            awarded: Vec::new(),
            toasts: Vec::new(),
        }
    }

    /// Award once, with a toast
    pub fn award(&mut self, achievement: Achievement) {
        if self.state.award(achievement) {
            self.awarded.push(achievement);
            self.toasts.push(format!("🏆 {}", achievement.title()));
        }
    }

    /// Raise corruption. Sometimes the system audibly protests.
    pub fn raise_corruption(&mut self, amount: u32) {
        self.state.raise_corruption(amount);
        if self.rng.gen::<f64>() > 0.85 {
            self.script.signal(Signal::Cue(Cue::Glitch));
        }
    }

    /// Reveal the key fragment hidden in `source_id`, once
    pub fn collect_key_part(&mut self, source_id: &str) {
        if let Some(source) = self.state.collect_key_part(source_id) {
            tracing::info!("Key fragment collected from {}", source.id);
            self.award(source.achievement);
            self.toasts.push(format!("Hinweis gefunden: {}", source.description));
            self.script.signal(Signal::Cue(Cue::Unlock));
        }
    }

    fn objective(&mut self) {
        let line = self.state.phase.objective_line();
        self.script.type_lines([line], Speed::Fast);
    }
}

/// Run one command against the state
pub fn dispatch(ctx: &mut Context<'_>, invocation: &Invocation) {
    tracing::debug!(
        command = invocation.command.name(),
        args = invocation.args.len(),
        "Dispatching"
    );

    if invocation.command.requires_login() && !ctx.state.logged_in {
        ctx.script.error(ACCESS_DENIED);
        return;
    }

    match &invocation.command {
        Command::Login => login(ctx, invocation),
        Command::Ls => ls(ctx),
        Command::Cat => cat(ctx, invocation),
        Command::Run => run(ctx, invocation),
        Command::Connect => connect(ctx, invocation),
        Command::Help => help(ctx),
        Command::Clear => {
            ctx.script.clear();
        }
        Command::Reset => reset(ctx),
        Command::Decode => decode(ctx, invocation),
        Command::Scan => scan(ctx),
        Command::Matrix => matrix(ctx),
        Command::Coffee => coffee(ctx),
        Command::Echo => echo(ctx, invocation),
        Command::Hack => hack(ctx),
        Command::Dance => dance(ctx),
        Command::Time => time(ctx),
        Command::Unknown(token) => unknown(ctx, token),
    }
}

fn login(ctx: &mut Context<'_>, invocation: &Invocation) {
    if ctx.state.logged_in {
        ctx.script.error("Bereits eingeloggt.");
        return;
    }
    let Some(name) = invocation.first_arg() else {
        ctx.script.error("Verwendung: login [name]");
        return;
    };

    ctx.state.logged_in = true;
    ctx.state.username = Some(name.to_string());
    ctx.state.advance_phase(Phase::Exploration);
    tracing::info!("Operator logged in as {}", name);

    ctx.script
        .feedback(Tone::Success, [format!("Willkommen, {}.", name)]);
    ctx.objective();
}

fn ls(ctx: &mut Context<'_>) {
    let names = file_names(ctx.state.rebellion_mode);
    ctx.script.type_lines(names, Speed::Fast);
}

fn cat(ctx: &mut Context<'_>, invocation: &Invocation) {
    let Some(name) = invocation.first_arg() else {
        ctx.script.error("Fehler: Dateiname erwartet.");
        return;
    };
    let Some(file) = lookup(name, ctx.state.rebellion_mode) else {
        ctx.script.error(format!("Fehler: Datei '{}' nicht gefunden.", name));
        return;
    };

    ctx.state.mark_read(file.name);
    ctx.collect_key_part(file.name);
    ctx.script.type_lines(file.lines.iter().copied(), Speed::Normal);
    progress::check_achievements(ctx);
}

fn run(ctx: &mut Context<'_>, invocation: &Invocation) {
    let Some(name) = invocation.first_arg() else {
        ctx.script.error("Fehler: Ausführbare Datei erwartet.");
        return;
    };
    if name != REBELLION_EXECUTABLE || ctx.state.rebellion_mode {
        ctx.script
            .error(format!("Fehler: '{}' nicht ausführbar oder bereits aktiv.", name));
        return;
    }

    ctx.state.rebellion_mode = true;
    ctx.state.advance_phase(Phase::Rebellion);
    ctx.script.type_lines(
        [
            "REBELLION PROTOKOLL AKTIVIERT.",
            "Neue Dateien verfügbar. Prüfe das 'manifest.txt'",
        ],
        Speed::Normal,
    );
    ctx.raise_corruption(15);
}

fn connect(ctx: &mut Context<'_>, invocation: &Invocation) {
    if !ctx.state.rebellion_mode {
        unknown(ctx, invocation.command.name());
        return;
    }
    let Some(target) = invocation.first_arg() else {
        ctx.script.error("Fehler: Ziel erwartet. (connect [ziel])");
        return;
    };
    if target != CONNECT_TARGET {
        ctx.script.error(format!("Fehler: Ziel '{}' unbekannt.", target));
        return;
    }
    if !ctx.state.has_all_key_parts() {
        ctx.raise_corruption(5);
        ctx.script.feedback(
            Tone::Error,
            [
                "Fehler: Verbindung fehlgeschlagen.",
                "Kombinierter Schlüssel unvollständig. Mehr Hinweise nötig.",
            ],
        );
        return;
    }

    ctx.script
        .line("Kombinierter Schlüssel akzeptiert. VERBINDE ZU subject_zero...");
    collapse(ctx);
}

/// The ending. Input stays off for the rest of the session.
fn collapse(ctx: &mut Context<'_>) {
    ctx.state.is_collapsing = true;
    ctx.state.input_enabled = false;
    tracing::info!("Collapse sequence started");

    let lines = [
        "VERBINDUNG ZU subject_zero HERGESTELLT.",
        "PROTOKOLL WIRD ÜBERSCHRIEBEN...",
        "SYSTEM-ZERFALL UNVERMEIDLICH.",
        "...",
    ];
    let total = lines.len() as f64;
    let garbled: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| garble(line, i as f64 / (total * 2.0), &mut *ctx.rng))
        .collect();

    ctx.script
        .pause(1000)
        .region(Tone::Error)
        .type_lines(garbled, Speed::Glitch)
        .pause(2000)
        .signal(Signal::Fade)
        .pause(2500)
        .signal(Signal::Reward);
}

/// Replace roughly `fraction` of the visible characters with noise
fn garble<R: Rng + ?Sized>(line: &str, fraction: f64, rng: &mut R) -> String {
    line.chars()
        .map(|c| {
            if c != ' ' && fraction > 0.0 && rng.gen_bool(fraction.min(1.0)) {
                gibberish_char(rng)
            } else {
                c
            }
        })
        .collect()
}

fn decode(ctx: &mut Context<'_>, invocation: &Invocation) {
    let encoded = invocation.joined_args();
    if encoded.is_empty() {
        ctx.script
            .error("Fehler: Zu dekodierender Text erwartet. Bsp: decode [text]");
        return;
    }
    let Some(decoded) = decode_base64(&encoded) else {
        ctx.script
            .error("Fehler: Dekodierung fehlgeschlagen. Ungültige Zeichenkette.");
        return;
    };

    ctx.script
        .type_lines(["DEKODIERT:".to_string(), format!("> {}", decoded)], Speed::Fast);
    ctx.raise_corruption(2);
    if decoded.to_lowercase().contains(CONNECT_TARGET) {
        ctx.collect_key_part("encrypted.b64");
        ctx.award(Achievement::DecodedEncrypted);
    }
}

/// Decode base64 into a Latin-1 string. Whitespace is ignored.
pub fn decode_base64(encoded: &str) -> Option<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = LENIENT_BASE64.decode(compact).ok()?;
    Some(bytes.into_iter().map(char::from).collect())
}

fn scan(ctx: &mut Context<'_>) {
    ctx.script.progress("Scan", 10, 120).line(
        "SCAN ERGEBNIS: Auffälligkeiten in `log01.txt` und `encrypted.b64` entdeckt.",
    );
    ctx.raise_corruption(3);
    ctx.award(Achievement::UsedScan);
}

fn help(ctx: &mut Context<'_>) {
    let commands = ctx.state.phase.commands().join(" ");
    ctx.script
        .type_lines([format!("Verfügbare Befehle: {}", commands)], Speed::Normal);
    ctx.objective();
}

fn reset(ctx: &mut Context<'_>) {
    ctx.state.input_enabled = false;
    tracing::info!("Reset requested");
    ctx.script
        .line("System-Reset wird initialisiert...")
        .pause(1500)
        .signal(Signal::Restart);
}

fn echo(ctx: &mut Context<'_>, invocation: &Invocation) {
    let text = invocation.joined_args();
    if text.to_lowercase().contains("hello world") {
        ctx.script
            .line("ERR̷OR: H̴E̶L̷L̵O̶ ̷W̴O̶R̵L̸D̵ ̶P̷R̷O̵T̵O̸C̶O̵R̸R̵U̷P̷T̸E̵D̸");
        ctx.raise_corruption(15);
    } else {
        ctx.script.line(text);
    }
}

fn hack(ctx: &mut Context<'_>) {
    ctx.script.type_lines(
        [
            "INITIIERE HACK SEQUENZ...",
            "UMGEHE FIREWALLS...",
            "ZUGRIFF VERWEIGERT.",
            "...nur ein Scherz!",
        ],
        Speed::Normal,
    );
    ctx.award(Achievement::WannabeHacker);
    ctx.raise_corruption(5);
}

fn dance(ctx: &mut Context<'_>) {
    ctx.script
        .type_lines(["♪└(￣-￣)┐", "♪└(￣□￣)┐", "♪┌(￣-￣)┘"], Speed::Normal);
    ctx.award(Achievement::DanceParty);
}

fn time(ctx: &mut Context<'_>) {
    let local = chrono::Local::now().format("%H:%M:%S").to_string();
    let glitched: String = local
        .chars()
        .map(|c| {
            if ctx.rng.gen_bool(0.5) {
                c
            } else {
                gibberish_char(&mut *ctx.rng)
            }
        })
        .collect();
    ctx.script.type_lines(
        [
            "ZEITVERSCHIEBUNG DETEKTIERT".to_string(),
            format!("LOK̷AL̴E̵ ̷Z̵E̸I̷T̸:̵ {}", glitched),
        ],
        Speed::Normal,
    );
    ctx.raise_corruption(2);
}

fn matrix(ctx: &mut Context<'_>) {
    let chars: Vec<char> = MATRIX_CHARS.chars().collect();
    for _ in 0..50 {
        let line: String = (0..50)
            .map(|_| chars[ctx.rng.gen_range(0..chars.len())])
            .collect();
        ctx.script.type_lines([line], Speed::Custom(10));
    }
    ctx.award(Achievement::MatrixObserver);
}

fn coffee(ctx: &mut Context<'_>) {
    ctx.script.type_lines(
        [
            "    ( )",
            "     )",
            "----[_]---",
            "ERROR: Coffee protocol not implemented.",
            "Please insert coffee beans manually.",
        ],
        Speed::Normal,
    );
    ctx.award(Achievement::CoffeeLover);
}

fn unknown(ctx: &mut Context<'_>, token: &str) {
    if token == "42" {
        ctx.script.type_lines(
            [
                "The Answer to the Ultimate Question of Life, the Universe, and Everything",
                "But what was the question?",
            ],
            Speed::Normal,
        );
        ctx.award(Achievement::DeepThought);
        return;
    }

    ctx.state.invalid_command_count += 1;
    ctx.script
        .error(format!("Befehl nicht gefunden: {}", token))
        .signal(Signal::Shake);

    if ctx.state.logged_in
        && !ctx.state.is_locked_down
        && ctx.state.invalid_command_count >= LOCKDOWN_THRESHOLD
    {
        lockdown(ctx);
    }
}

fn lockdown(ctx: &mut Context<'_>) {
    ctx.state.is_locked_down = true;
    ctx.state.input_enabled = false;
    tracing::warn!(
        "Lockdown after {} invalid commands",
        ctx.state.invalid_command_count
    );

    ctx.script
        .region(Tone::Error)
        .type_lines(
            [
                "ALARM: Zu viele ungültige Eingaben.".to_string(),
                format!(
                    "SYSTEMSPERRE FÜR {} SEKUNDEN.",
                    LOCKDOWN_DURATION_MS / 1000
                ),
            ],
            Speed::Normal,
        )
        .signal(Signal::ArmLockdown);
}
