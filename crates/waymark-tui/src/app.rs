//! Application core: event loop, action dispatch, status bar and overlays.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use waymark_core::{Readiness, RequestStatus};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screens::map::MapScreen;
use crate::theme;
use crate::tui::Tui;

const TOAST_TTL: Duration = Duration::from_secs(3);

pub struct App {
    map: MapScreen,
    running: bool,
    help_visible: bool,
    notification: Option<(Notification, Instant)>,
    /// Sent once the loop is up: provider ready or unavailable.
    startup: Option<Action>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(map: MapScreen, startup: Action) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            map,
            running: true,
            help_visible: false,
            notification: None,
            startup: Some(startup),
            action_tx,
            action_rx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.map.init(self.action_tx.clone())?;
        if let Some(startup) = self.startup.take() {
            self.action_tx.send(startup)?;
        }

        let cancel = CancellationToken::new();
        let mut events = EventReader::spawn(
            Duration::from_millis(250),
            Duration::from_millis(33),
            cancel.clone(),
        );
        info!("event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            let action = match event {
                Event::Key(key) => self.handle_key_event(key)?,
                Event::Mouse(mouse) => self.map.handle_mouse_event(mouse)?,
                // Redraw at the new size right away.
                Event::Resize | Event::Render => Some(Action::Render),
                Event::Tick => Some(Action::Tick),
            };
            if let Some(action) = action {
                self.action_tx.send(action)?;
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;
                if matches!(action, Action::Render) {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        cancel.cancel();
        self.map.unmount();
        tui.exit();
        info!("event loop ended");
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        // Typing in the search box must not trigger single-key shortcuts.
        if !self.map.captures_text() {
            match key.code {
                KeyCode::Char('q') => return Ok(Some(Action::Quit)),
                KeyCode::Char('?') => return Ok(Some(Action::ToggleHelp)),
                _ => {}
            }
        }

        self.map.handle_key_event(key)
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::Notify(notification) => {
                debug!(message = %notification.message, "toast");
                self.notification = Some((notification.clone(), Instant::now()));
            }
            Action::Render => {}
            other => {
                if matches!(other, Action::Tick) {
                    self.expire_notification(Instant::now());
                }
                if let Some(follow_up) = self.map.update(other)? {
                    self.action_tx.send(follow_up)?;
                }
            }
        }
        Ok(())
    }

    fn expire_notification(&mut self, now: Instant) {
        if self
            .notification
            .as_ref()
            .is_some_and(|(_, shown)| now.duration_since(*shown) >= TOAST_TTL)
        {
            self.notification = None;
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let [content, status] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

        self.map.render(frame, content);
        frame.render_widget(Paragraph::new(self.status_line()), status);

        if self.help_visible {
            render_help_overlay(frame, area);
        }
        if let Some((notification, _)) = &self.notification {
            render_notification(frame, area, notification);
        }
    }

    fn status_line(&self) -> Line<'static> {
        let session = self.map.session();
        let mut spans = vec![Span::raw(" ")];
        match session.readiness() {
            Readiness::Ready => {
                spans.push(status_span("location", session.location_status()));
                spans.push(Span::raw("  "));
                spans.push(status_span("address", session.address_status()));
                spans.push(Span::raw("  "));
                spans.push(status_span("route", session.directions_status()));
            }
            Readiness::Initializing { reason: None } => {
                spans.push(Span::styled(
                    "◐ loading",
                    Style::default().fg(theme::ELECTRIC_YELLOW),
                ));
            }
            Readiness::Initializing { reason: Some(_) } => {
                spans.push(Span::styled(
                    "○ unavailable",
                    Style::default().fg(theme::ERROR_RED),
                ));
            }
        }
        spans.push(Span::styled(
            " │ ? help  / search  d directions  q quit",
            theme::key_hint(),
        ));
        Line::from(spans)
    }
}

/// One status-bar indicator, e.g. "● route" in green once a route is shown.
fn status_span(label: &str, status: &RequestStatus) -> Span<'static> {
    let (icon, color) = match status {
        RequestStatus::Idle => ("·", theme::BORDER_GRAY),
        RequestStatus::Pending => ("◐", theme::ELECTRIC_YELLOW),
        RequestStatus::Ready => ("●", theme::SUCCESS_GREEN),
        RequestStatus::Failed(_) => ("○", theme::ERROR_RED),
    };
    Span::styled(format!("{icon} {label}"), Style::default().fg(color))
}

/// Toast size for a message: three rows, width fitted to the text.
fn toast_size(message: &str) -> (u16, u16) {
    let len = u16::try_from(message.chars().count()).unwrap_or(u16::MAX);
    (len.saturating_add(6).clamp(20, 60), 3)
}

fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let (width, height) = toast_size(&notification.message);
    let width = width.min(area.width);
    // Bottom-right, just above the status bar.
    let toast = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y + area.height.saturating_sub(height + 2),
        width,
        height.min(area.height),
    );

    let (color, icon) = match notification.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Warning => (theme::ELECTRIC_YELLOW, "!"),
        NotificationLevel::Info => (theme::NEON_CYAN, "·"),
    };

    frame.render_widget(Clear, toast);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(toast);
    frame.render_widget(block, toast);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(color)),
            Span::styled(notification.message.clone(), Style::default().fg(theme::DIM_WHITE)),
        ])),
        inner,
    );
}

fn help_row(keys: &'static str, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {keys:<12}"), theme::key_hint_key()),
        Span::styled(what, theme::key_hint()),
    ])
}

fn help_heading(title: &'static str) -> [Line<'static>; 2] {
    [
        Line::from(Span::styled(
            format!("  {title}"),
            Style::default().fg(theme::NEON_CYAN),
        )),
        Line::from(Span::styled(
            format!("  {}", "─".repeat(title.chars().count())),
            theme::key_hint(),
        )),
    ]
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 60u16.min(area.width.saturating_sub(4));
    let height = 22u16.min(area.height.saturating_sub(4));
    let help = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );

    frame.render_widget(Clear, help);
    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(help);
    frame.render_widget(block, help);

    let mut lines = vec![Line::from("")];
    lines.extend(help_heading("Search"));
    lines.extend([
        help_row("type", "Find an address"),
        help_row("↑/↓", "Move through suggestions"),
        help_row("Enter", "Show the highlighted place"),
        help_row("Esc", "Close suggestions"),
        Line::from(""),
    ]);
    lines.extend(help_heading("Map"));
    lines.extend([
        help_row("d / Enter", "Get driving directions"),
        help_row("click ◉", "Directions from your location"),
        help_row("←↓↑→ hjkl", "Pan"),
        help_row("+ / -", "Zoom (or mouse wheel)"),
        help_row("c", "Back to the selected place"),
        Line::from(""),
    ]);
    lines.extend(help_heading("Global"));
    lines.extend([
        help_row("/ Tab", "Switch between search and map"),
        help_row("?", "This help"),
        help_row("q Ctrl+c", "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "                         Esc or ? to close",
            theme::key_hint(),
        )),
    ]);
    frame.render_widget(Paragraph::new(lines), inner);
}
