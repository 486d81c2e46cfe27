//! Static game content
//!
//! Defines the virtual filesystem, phases, achievements, key fragments
//! and story events. Nothing in here changes at runtime.

pub mod achievements;
pub mod events;
pub mod filesystem;
pub mod keys;
pub mod phases;

pub use achievements::*;
pub use events::*;
pub use filesystem::*;
pub use keys::*;
pub use phases::*;

/// How an output region is styled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tone {
    #[default]
    Plain,
    System,
    Success,
    Error,
}

/// Characters used to fill in glitched output
pub const GIBBERISH: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()_+[]{};:'\"\\|,.<>/?`~";

/// Pick one random filler character
pub fn gibberish_char<R: rand::Rng + ?Sized>(rng: &mut R) -> char {
    let chars: Vec<char> = GIBBERISH.chars().collect();
    chars[rng.gen_range(0..chars.len())]
}

