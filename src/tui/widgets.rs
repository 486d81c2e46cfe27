//! Custom widgets for the game UI

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::Widget,
};

/// Corruption gauge that turns yellow, then red
pub struct CorruptionMeter {
    value: u32,
    label: String,
    color: Color,
    warning_threshold: u32,
    danger_threshold: u32,
}

impl CorruptionMeter {
    /// `value` is expected to be clamped to 0..=100 already
    pub fn new(label: &str, value: u32) -> Self {
        Self {
            value: value.min(100),
            label: label.to_string(),
            color: Color::Green,
            warning_threshold: 50,
            danger_threshold: 75,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn danger_threshold(mut self, threshold: u32) -> Self {
        self.danger_threshold = threshold;
        self
    }

    fn current_color(&self) -> Color {
        if self.value >= self.danger_threshold {
            Color::Red
        } else if self.value >= self.warning_threshold {
            Color::Yellow
        } else {
            self.color
        }
    }
}

impl Widget for CorruptionMeter {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 1 {
            return;
        }
        let color = self.current_color();

        let label = format!("{}: {}%", self.label, self.value);
        buf.set_string(area.x, area.y, &label, Style::default().fg(color));

        if area.height > 1 {
            let bar_y = area.y + 1;
            let inner = area.width - 2;
            let filled = (self.value * inner as u32 / 100) as u16;
            buf.set_string(area.x, bar_y, "[", Style::default());
            buf.set_string(area.x + area.width - 1, bar_y, "]", Style::default());
            for x in 0..inner {
                let (symbol, style) = if x < filled {
                    ("█", Style::default().fg(color))
                } else {
                    ("░", Style::default().fg(Color::DarkGray))
                };
                buf.set_string(area.x + 1 + x, bar_y, symbol, style);
            }
        }
    }
}

/// Stack of notifications, right-aligned in its area
pub struct ToastStack<'a> {
    messages: Vec<&'a str>,
    color: Color,
}

impl<'a> ToastStack<'a> {
    pub fn new(messages: Vec<&'a str>) -> Self {
        Self {
            messages,
            color: Color::Yellow,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Widget for ToastStack<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .fg(Color::Black)
            .bg(self.color)
            .add_modifier(Modifier::BOLD);
        for (i, message) in self.messages.iter().enumerate() {
            let y = area.y + i as u16;
            if y >= area.y + area.height {
                break;
            }
            let text = format!(" {} ", message);
            let width = (Line::from(text.as_str()).width() as u16).min(area.width);
            let x = area.x + area.width - width;
            buf.set_stringn(x, y, &text, width as usize, style);
        }
    }
}

/// Double-lined box for the ending
pub struct RewardBox {
    title: String,
    content: Vec<String>,
    border_color: Color,
}

impl RewardBox {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            content: Vec::new(),
            border_color: Color::LightGreen,
        }
    }

    pub fn content(mut self, lines: Vec<String>) -> Self {
        self.content = lines;
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }
}

impl Widget for RewardBox {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 3 {
            return;
        }
        let style = Style::default().fg(self.border_color);
        let right = area.x + area.width - 1;
        let bottom = area.y + area.height - 1;

        buf.set_string(area.x, area.y, "╔", style);
        buf.set_string(right, area.y, "╗", style);
        buf.set_string(area.x, bottom, "╚", style);
        buf.set_string(right, bottom, "╝", style);
        for x in area.x + 1..right {
            buf.set_string(x, area.y, "═", style);
            buf.set_string(x, bottom, "═", style);
        }
        for y in area.y + 1..bottom {
            buf.set_string(area.x, y, "║", style);
            buf.set_string(right, y, "║", style);
        }

        // Title centered on the middle row, content above it
        let title_width = self.title.chars().count() as u16;
        let title_x = area.x + area.width.saturating_sub(title_width) / 2;
        let title_y = area.y + area.height / 2;
        buf.set_string(
            title_x,
            title_y,
            &self.title,
            style.add_modifier(Modifier::BOLD),
        );

        for (i, line) in self.content.iter().enumerate() {
            let y = area.y + 1 + i as u16;
            if y >= title_y {
                break;
            }
            buf.set_stringn(
                area.x + 2,
                y,
                line,
                area.width.saturating_sub(4) as usize,
                style,
            );
        }
    }
}
