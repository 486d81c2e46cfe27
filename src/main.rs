//! ZERFALL PROTOKOLL
//!
//! A terminal that is slowly falling apart. Log in, read the files, find
//! the key fragments and reach subject_zero before the system collapses.

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, stdout};
use zerfall::audio::{AudioSink, Silent, TerminalBell};
use zerfall::config::{Cli, Settings};
use zerfall::game::FileStore;
use zerfall::tui::App;
use zerfall::{logging, Session};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_path = logging::init(cli.log_file.as_deref());

    let mut settings = Settings::load(&cli.settings_path());
    cli.apply(&mut settings);

    let data_dir = cli.data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("cannot create data directory {}", data_dir.display()))?;
    tracing::info!(?data_dir, ?log_path, "Starting");

    let store = Box::new(FileStore::new(data_dir));
    let audio: Box<dyn AudioSink> = if settings.audio_enabled {
        Box::new(TerminalBell::new(io::stdout()))
    } else {
        Box::new(Silent)
    };
    let rng = StdRng::from_entropy();
    let session = if cli.fresh {
        Session::fresh(store, audio, settings, rng)
    } else {
        Session::new(store, audio, settings, rng)
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    app.start();

    let result = run(&mut terminal, &mut app);

    // Cleanup, even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result?;

    tracing::info!("Exiting");
    let state = app.session.state();
    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  VERBINDUNG GETRENNT                                   ║");
    println!("║                                                        ║");
    println!(
        "║  Korruption: {:>3}%   Erfolge: {:>2}                       ║",
        state.display_corruption(),
        state.achievements.len()
    );
    println!("╚════════════════════════════════════════════════════════╝\n");

    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    while app.running {
        terminal.draw(|frame| {
            app.render(frame);
        })?;

        if !app.handle_input()? {
            break;
        }
    }
    Ok(())
}
