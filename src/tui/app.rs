//! Main application state and rendering

use crate::data::{Achievement, Tone, DANGER_THRESHOLD, KEY_SOURCES};
use crate::game::handlers::REWARD_TITLE;
use crate::game::Session;
use crate::tui::widgets::{CorruptionMeter, RewardBox, ToastStack};
use crate::tui::{centered_rect, create_content_layout, create_main_layout, styled_block, Theme};
use crate::tui::{LOGO, SMALL_LOGO};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::time::{Duration, Instant};

/// Application state
pub struct App {
    pub session: Session,
    pub theme: Theme,
    pub running: bool,
    started: Instant,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            theme: Theme::default(),
            running: true,
            started: Instant::now(),
        }
    }

    /// Milliseconds since the app started
    pub fn now(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Kick off the boot sequence
    pub fn start(&mut self) {
        let now = self.now();
        self.session.start(now);
    }

    /// Handle keyboard input, then advance the session clock
    pub fn handle_input(&mut self) -> std::io::Result<bool> {
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        let now = self.now();
        self.session.tick(now);
        Ok(self.running)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let now = self.now();
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }
            KeyCode::Esc if self.session.is_idle() => self.running = false,
            KeyCode::Enter => {
                self.session.submit_input(now);
            }
            KeyCode::Tab => self.session.complete(),
            KeyCode::Up => self.session.history_previous(),
            KeyCode::Down => self.session.history_next(),
            KeyCode::Left => self.session.edit(|line| line.left()),
            KeyCode::Right => self.session.edit(|line| line.right()),
            KeyCode::Home => self.session.edit(|line| line.home()),
            KeyCode::End => self.session.edit(|line| line.end()),
            KeyCode::Backspace => self.session.edit(|line| line.backspace()),
            KeyCode::Delete => self.session.edit(|line| line.delete()),
            KeyCode::PageUp => self.session.transcript_mut().scroll_up(5),
            KeyCode::PageDown => self.session.transcript_mut().scroll_down(5),
            KeyCode::Char(c) => self.session.type_char(c),
            _ => {}
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let now = self.now();
        let area = frame.area();
        let layout = create_main_layout(area);

        self.render_header(frame, layout[0]);

        let content = create_content_layout(layout[1]);
        self.render_terminal(frame, content[0], now);
        self.render_side_panel(frame, content[1]);

        self.render_status_bar(frame, layout[2]);

        if !self.session.toasts().is_empty() {
            self.render_toasts(frame, layout[1]);
        }
        if self.session.effects().reward {
            self.render_reward(frame, area);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let header_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(22),
                Constraint::Min(20),
                Constraint::Length(16),
            ])
            .split(area);
        let border = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border));

        let logo = Paragraph::new(SMALL_LOGO)
            .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
            .block(border.clone());
        frame.render_widget(logo, header_layout[0]);

        let state = self.session.state();
        let phase = Paragraph::new(format!("PHASE: {}", state.phase.to_string().to_uppercase()))
            .style(Style::default().fg(self.theme.warning))
            .alignment(Alignment::Center)
            .block(border.clone());
        frame.render_widget(phase, header_layout[1]);

        let id = self.session.id().simple().to_string();
        let session = Paragraph::new(format!(" #{} ", &id[..8]))
            .style(Style::default().fg(self.theme.dim))
            .alignment(Alignment::Right)
            .block(border);
        frame.render_widget(session, header_layout[2]);
    }

    fn render_terminal(&self, frame: &mut Frame, area: Rect, now: u64) {
        let state = self.session.state();
        let faded = self.session.effects().faded;

        // Shake by nudging the whole terminal sideways
        let area = if self.session.is_shaking(now) && area.width > 2 {
            let offset = if (now / 50) % 2 == 0 { 1 } else { 0 };
            Rect::new(area.x + offset, area.y, area.width - 1, area.height)
        } else {
            area
        };

        let mut lines: Vec<Line> = self
            .session
            .transcript()
            .lines()
            .map(|(tone, text)| {
                let style = if faded {
                    Style::default().fg(self.theme.dim).add_modifier(Modifier::DIM)
                } else {
                    let style = Style::default().fg(self.theme.tone_color(tone));
                    if tone == Tone::Error {
                        style.add_modifier(Modifier::BOLD)
                    } else {
                        style
                    }
                };
                Line::from(Span::styled(text.to_string(), style))
            })
            .collect();

        if self.session.shows_prompt() && !state.is_processing {
            lines.push(self.prompt_line());
        }

        let visible = area.height.saturating_sub(2) as usize;
        let scroll_back = self.session.transcript().scroll_back;
        let end = lines.len().saturating_sub(scroll_back);
        let start = end.saturating_sub(visible);
        let shown: Vec<Line> = lines.drain(start..end).collect();

        let title = if scroll_back > 0 {
            format!("Terminal [-{}]", scroll_back)
        } else {
            "Terminal".to_string()
        };
        let terminal = Paragraph::new(shown).block(styled_block(&title, &self.theme));
        frame.render_widget(terminal, area);
    }

    /// The prompt with a block cursor
    fn prompt_line(&self) -> Line<'static> {
        let state = self.session.state();
        let input = self.session.input();
        let active = state.accepts_input();
        let color = if active { self.theme.accent } else { self.theme.dim };
        let style = Style::default().fg(color);

        let chars: Vec<char> = input.value().chars().collect();
        let cursor = input.cursor().min(chars.len());
        let before: String = chars[..cursor].iter().collect();
        let under: String = chars.get(cursor).map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
        let after: String = chars.get(cursor + 1..).map(|r| r.iter().collect()).unwrap_or_default();

        let mut spans = vec![
            Span::styled(format!("{} ", state.prompt()), style.add_modifier(Modifier::BOLD)),
            Span::styled(before, style),
        ];
        if active {
            spans.push(Span::styled(under, style.add_modifier(Modifier::REVERSED)));
            spans.push(Span::styled(after, style));
        } else {
            spans.push(Span::styled(format!("{}{}", under.trim_end(), after), style));
        }
        Line::from(spans)
    }

    fn render_side_panel(&self, frame: &mut Frame, area: Rect) {
        let state = self.session.state();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // Operator and corruption
                Constraint::Length(4), // Objective
                Constraint::Length(2 + KEY_SOURCES.len() as u16), // Key fragments
                Constraint::Min(3),    // Achievements
            ])
            .split(area);

        // Operator
        let block = styled_block("Operator", &self.theme);
        let inner = block.inner(chunks[0]);
        frame.render_widget(block, chunks[0]);
        let name = Paragraph::new(Line::from(vec![
            Span::raw("Benutzer: "),
            Span::styled(state.display_name().to_string(), Style::default().fg(self.theme.accent)),
        ]));
        frame.render_widget(name, Rect::new(inner.x, inner.y, inner.width, 1));
        if inner.height > 2 {
            let meter = CorruptionMeter::new("Korruption", state.display_corruption())
                .color(self.theme.fg)
                .danger_threshold(DANGER_THRESHOLD);
            frame.render_widget(meter, Rect::new(inner.x, inner.y + 2, inner.width, 2));
        }

        // Objective
        let objective = Paragraph::new(state.phase.goal())
            .style(Style::default().fg(self.theme.fg))
            .wrap(Wrap { trim: true })
            .block(styled_block("Ziel", &self.theme));
        frame.render_widget(objective, chunks[1]);

        // Key fragments
        let fragments: Vec<Line> = KEY_SOURCES
            .iter()
            .map(|source| {
                let found = state.collected_key_parts.iter().any(|k| k == source.id);
                if found {
                    Line::from(Span::styled(
                        format!("✔ {}", source.description),
                        Style::default().fg(self.theme.success),
                    ))
                } else {
                    Line::from(Span::styled("· ???", Style::default().fg(self.theme.dim)))
                }
            })
            .collect();
        let fragments = Paragraph::new(fragments).block(styled_block("Fragmente", &self.theme));
        frame.render_widget(fragments, chunks[2]);

        // Achievements, newest first
        let mut awarded: Vec<_> = state.achievements.values().collect();
        awarded.sort_by(|a, b| b.date.cmp(&a.date));
        let mut items: Vec<Line> = Vec::new();
        for awarded in &awarded {
            items.push(Line::from(format!("🏆 {}", awarded.title)));
            if let Some(achievement) = Achievement::from_id(&awarded.id) {
                items.push(Line::from(Span::styled(
                    format!("  {}", achievement.description()),
                    Style::default().fg(self.theme.dim),
                )));
            }
        }
        let title = format!("Erfolge {}", state.achievements.len());
        let achievements = Paragraph::new(items)
            .style(Style::default().fg(self.theme.warning))
            .wrap(Wrap { trim: true })
            .block(styled_block(&title, &self.theme));
        frame.render_widget(achievements, chunks[3]);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let state = self.session.state();
        let mode = if state.is_locked_down {
            "SYSTEMSPERRE"
        } else if state.is_collapsing {
            "ZERFALL"
        } else if state.accepts_input() {
            "BEREIT"
        } else {
            "..."
        };
        let status_text = format!(
            " {} | Korruption: {}% | {} | Tab: Vervollständigen  ↑↓: Verlauf  Esc: Beenden ",
            state.display_name(),
            state.display_corruption(),
            mode,
        );

        let style = if state.is_danger() {
            Style::default()
                .fg(self.theme.bg)
                .bg(self.theme.alert)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.bg).bg(self.theme.fg)
        };
        frame.render_widget(Paragraph::new(status_text).style(style), area);
    }

    fn render_toasts(&self, frame: &mut Frame, area: Rect) {
        let messages: Vec<&str> = self.session.toasts().iter().map(|t| t.text.as_str()).collect();
        let height = (messages.len() as u16).min(area.height);
        let toast_area = Rect::new(area.x, area.y, area.width.saturating_sub(1), height);
        frame.render_widget(ToastStack::new(messages).color(self.theme.warning), toast_area);
    }

    fn render_reward(&self, frame: &mut Frame, area: Rect) {
        let logo: Vec<String> = LOGO
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        let width = logo
            .iter()
            .map(|l| l.chars().count() as u16)
            .max()
            .unwrap_or(0)
            + 4;
        let height = logo.len() as u16 * 2 + 3;
        let popup = centered_rect(width, height, area);

        frame.render_widget(Clear, popup);
        frame.render_widget(
            RewardBox::new(REWARD_TITLE)
                .content(logo)
                .border_color(self.theme.accent),
            popup,
        );
    }
}
