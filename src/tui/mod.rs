//! Terminal User Interface
//!
//! A failing green-phosphor terminal drawn with ratatui

pub mod app;
pub mod widgets;

pub use app::App;

use crate::data::Tone;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};

/// Color scheme for the game
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub alert: Color,
    pub success: Color,
    pub warning: Color,
    pub system: Color,
    pub border: Color,
    pub dim: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::Green,
            accent: Color::LightGreen,
            alert: Color::Red,
            success: Color::LightGreen,
            warning: Color::Yellow,
            system: Color::Cyan,
            border: Color::DarkGray,
            dim: Color::DarkGray,
        }
    }
}

impl Theme {
    /// Color for an output region
    pub fn tone_color(&self, tone: Tone) -> Color {
        match tone {
            Tone::Plain => self.fg,
            Tone::System => self.system,
            Tone::Success => self.success,
            Tone::Error => self.alert,
        }
    }
}

/// Create a styled border block
pub fn styled_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
}

/// ASCII art logo
pub const LOGO: &str = r#"
███████╗███████╗██████╗ ███████╗ █████╗ ██╗     ██╗
╚══███╔╝██╔════╝██╔══██╗██╔════╝██╔══██╗██║     ██║
  ███╔╝ █████╗  ██████╔╝█████╗  ███████║██║     ██║
 ███╔╝  ██╔══╝  ██╔══██╗██╔══╝  ██╔══██║██║     ██║
███████╗███████╗██║  ██║██║     ██║  ██║███████╗███████╗
╚══════╝╚══════╝╚═╝  ╚═╝╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝
"#;

/// Smaller logo for header
pub const SMALL_LOGO: &str = " ZERFALL PROTOKOLL ";

/// Create the main layout
pub fn create_main_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Terminal and side panel
            Constraint::Length(1), // Status bar
        ])
        .split(area)
        .to_vec()
}

/// Create the content layout (terminal + side panel)
pub fn create_content_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(72), // Terminal
            Constraint::Percentage(28), // Side panel
        ])
        .split(area)
        .to_vec()
}

/// A rectangle of at most `width` x `height`, centered in `area`
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_small_areas() {
        let area = Rect::new(0, 0, 20, 6);
        let rect = centered_rect(40, 10, area);
        assert_eq!(rect, area);
        let rect = centered_rect(10, 2, area);
        assert_eq!(rect, Rect::new(5, 2, 10, 2));
    }

    #[test]
    fn test_error_tone_uses_alert_color() {
        let theme = Theme::default();
        assert_eq!(theme.tone_color(Tone::Error), theme.alert);
    }
}
