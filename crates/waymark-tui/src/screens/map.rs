//! Map screen: search box, "Get Directions" button and the map canvas.
//!
//! Owns the [`MapSession`] and [`AddressSearch`] state machines. Lookups
//! go out through the [`ServiceBridge`] and come back as actions, which
//! are applied here; stale completions are dropped by the state machines.

use std::cell::Cell;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use tui_input::Input;

use waymark_core::{
    AddressSearch, Camera, CoreError, GoogleMaps, MapConfig, MapSession, MapsService, MarkerKind,
    Readiness, RequestStatus,
};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::service_bridge::ServiceBridge;
use crate::theme;
use crate::widgets::{map_canvas, search_box};

/// Fraction of the visible width moved per arrow key.
const PAN_STEP: f64 = 0.1;
const BUTTON_LABEL: &str = "Get Directions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Map,
}

/// Areas from the last frame, for mouse hit-testing.
#[derive(Debug, Clone, Copy, Default)]
struct Hitboxes {
    input: Rect,
    button: Rect,
    popup: Rect,
    canvas: Rect,
}

pub struct MapScreen {
    session: MapSession,
    search: AddressSearch,
    input: Input,
    camera: Camera,
    focus: Focus,
    debounce: Duration,
    service: Option<MapsService<GoogleMaps>>,
    bridge: Option<ServiceBridge>,
    throbber: ThrobberState,
    hitboxes: Cell<Hitboxes>,
}

impl MapScreen {
    pub fn new(
        config: MapConfig,
        debounce: Duration,
        service: Option<MapsService<GoogleMaps>>,
    ) -> Self {
        let session = MapSession::new(config);
        let mut camera = Camera::new(*session.view());
        camera.follow(session.view(), session.view_revision());
        Self {
            session,
            search: AddressSearch::new(),
            input: Input::default(),
            camera,
            focus: Focus::Search,
            debounce,
            service,
            bridge: None,
            throbber: ThrobberState::default(),
            hitboxes: Cell::new(Hitboxes::default()),
        }
    }

    pub fn session(&self) -> &MapSession {
        &self.session
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    fn bridge(&self) -> Option<&ServiceBridge> {
        if self.bridge.is_none() {
            debug!("lookup requested before the screen was mounted");
        }
        self.bridge.as_ref()
    }

    /// Snap the camera back if the session moved the view.
    fn sync_camera(&mut self) {
        if self.camera.follow(self.session.view(), self.session.view_revision()) {
            debug!(center = %self.camera.center(), zoom = self.camera.zoom(), "camera reset");
        }
    }

    fn recenter(&mut self) {
        self.camera = Camera::new(*self.session.view());
        self.camera.follow(self.session.view(), self.session.view_revision());
    }

    /// Commit a suggestion pick: the input shows the description and the
    /// selection callback fires.
    fn selected(&mut self, description: String) -> Option<Action> {
        self.input = Input::new(description.clone());
        self.focus = Focus::Map;
        Some(Action::AddressSelected(description))
    }

    fn popup_visible(&self) -> bool {
        self.focus == Focus::Search && !self.search.visible_suggestions().is_empty()
    }

    fn directions_available(&self) -> bool {
        self.session.is_ready() && self.session.user_location().is_some()
    }

    // ── Keys ─────────────────────────────────────────────────────────

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.search.dismiss();
                self.focus = Focus::Map;
                None
            }
            KeyCode::Tab => {
                self.focus = Focus::Map;
                None
            }
            KeyCode::Down => {
                self.search.highlight_next();
                None
            }
            KeyCode::Up => {
                self.search.highlight_prev();
                None
            }
            KeyCode::Enter => {
                let description = self.search.select_highlighted()?;
                self.selected(description)
            }
            _ => {
                if !self.search.is_enabled() {
                    return None;
                }
                let request = search_box::input_request(key)?;
                self.input.handle(request);
                if let Some(generation) = self.search.on_input(self.input.value()) {
                    if let Some(bridge) = self.bridge() {
                        bridge.arm_debounce(generation);
                    }
                }
                None
            }
        }
    }

    fn handle_map_key(&mut self, key: KeyEvent) -> Option<Action> {
        match (key.modifiers, key.code) {
            (_, KeyCode::Char('/') | KeyCode::Tab) => {
                self.focus = Focus::Search;
                None
            }
            (_, KeyCode::Char('d') | KeyCode::Enter) => Some(Action::RequestDirections),
            (_, KeyCode::Char('+' | '=')) => {
                self.camera.zoom_in();
                None
            }
            (_, KeyCode::Char('-')) => {
                self.camera.zoom_out();
                None
            }
            (_, KeyCode::Char('c')) => {
                self.recenter();
                None
            }
            (KeyModifiers::NONE, KeyCode::Left | KeyCode::Char('h')) => {
                self.camera.pan(-PAN_STEP, 0.0);
                None
            }
            (KeyModifiers::NONE, KeyCode::Right | KeyCode::Char('l')) => {
                self.camera.pan(PAN_STEP, 0.0);
                None
            }
            (KeyModifiers::NONE, KeyCode::Up | KeyCode::Char('k')) => {
                self.camera.pan(0.0, PAN_STEP);
                None
            }
            (KeyModifiers::NONE, KeyCode::Down | KeyCode::Char('j')) => {
                self.camera.pan(0.0, -PAN_STEP);
                None
            }
            _ => None,
        }
    }

    // ── Completions ──────────────────────────────────────────────────

    fn on_provider_ready(&mut self) {
        self.search.set_enabled(true);
        if let Some(ticket) = self.session.on_ready() {
            if let Some(bridge) = self.bridge() {
                bridge.locate(ticket);
            }
        }
    }

    fn on_directions_requested(&mut self) -> Option<Action> {
        match self.session.request_directions() {
            Ok(request) => {
                if let Some(bridge) = self.bridge() {
                    bridge.directions(request);
                }
                None
            }
            Err(CoreError::NotReady { reason }) => Some(Action::Notify(Notification::warning(
                format!("Can't route yet: {reason}"),
            ))),
            Err(e) => Some(Action::Notify(Notification::error(e.to_string()))),
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_button(&self, frame: &mut Frame, area: Rect) {
        let style = if self.directions_available() {
            theme::button()
        } else {
            theme::disabled()
        };
        let label = if self.session.directions_status().is_pending() {
            "Routing…"
        } else {
            BUTTON_LABEL
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(style);
        frame.render_widget(
            Paragraph::new(Span::styled(label, style))
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
    }

    fn render_map(&self, frame: &mut Frame, area: Rect) -> Rect {
        let border = if self.focus == Focus::Map {
            theme::border_focused()
        } else {
            theme::border_default()
        };
        let center = self.camera.center();
        let title = match self.session.selected_address() {
            Some(address) => format!(" {address} "),
            None => " Map ".to_owned(),
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .title_bottom(
                Line::from(format!(" {center} · z{} ", self.camera.zoom()))
                    .style(theme::key_hint())
                    .right_aligned(),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match self.session.readiness() {
            Readiness::Ready => {
                map_canvas::render_map(frame, inner, &self.camera, &self.session.scene());
            }
            Readiness::Initializing { reason: None } => {
                let [_, row, _] = Layout::vertical([
                    Constraint::Fill(1),
                    Constraint::Length(1),
                    Constraint::Fill(1),
                ])
                .areas(inner);
                let spinner = Throbber::default()
                    .label("Loading map…")
                    .style(Style::default().fg(theme::NEON_CYAN))
                    .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
                frame.render_stateful_widget(spinner, row, &mut self.throbber.clone());
            }
            Readiness::Initializing {
                reason: Some(reason),
            } => {
                let text = vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        "Map unavailable",
                        Style::default().fg(theme::ERROR_RED),
                    )),
                    Line::from(Span::styled(reason.clone(), theme::key_hint())),
                ];
                frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
            }
        }
        inner
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let line = match (self.session.directions_status(), self.session.route()) {
            (RequestStatus::Failed(reason), _) => Line::from(Span::styled(
                format!(" Directions failed: {reason}"),
                Style::default().fg(theme::ERROR_RED),
            )),
            (_, Some(route)) => map_canvas::route_summary(route),
            _ => return,
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

impl Component for MapScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.bridge = Some(ServiceBridge::new(
            self.service.take(),
            action_tx,
            self.debounce,
        ));
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match self.focus {
            Focus::Search => self.handle_search_key(key),
            Focus::Map => self.handle_map_key(key),
        })
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let hit = self.hitboxes.get();
        let position = Position::new(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.popup_visible() && hit.popup.contains(position) {
                    let rows = self.search.visible_suggestions().len();
                    let Some(index) = search_box::suggestion_at(hit.popup, rows, position) else {
                        return Ok(None);
                    };
                    return Ok(self
                        .search
                        .select(index)
                        .and_then(|description| self.selected(description)));
                }
                if hit.button.contains(position) {
                    return Ok(Some(Action::RequestDirections));
                }
                if hit.input.contains(position) {
                    self.focus = Focus::Search;
                    return Ok(None);
                }
                if hit.canvas.contains(position) {
                    self.focus = Focus::Map;
                    if !self.session.is_ready() {
                        return Ok(None);
                    }
                    let bounds = map_canvas::viewport(&self.camera, hit.canvas);
                    let scene = self.session.scene();
                    if map_canvas::marker_at(hit.canvas, &bounds, &scene, position)
                        == Some(MarkerKind::Person)
                    {
                        return Ok(Some(Action::RequestDirections));
                    }
                }
                Ok(None)
            }
            MouseEventKind::ScrollUp if hit.canvas.contains(position) => {
                self.camera.zoom_in();
                Ok(None)
            }
            MouseEventKind::ScrollDown if hit.canvas.contains(position) => {
                self.camera.zoom_out();
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        let follow_up = match action {
            Action::Tick => {
                self.throbber.calc_next();
                None
            }
            Action::ProviderReady => {
                self.on_provider_ready();
                None
            }
            Action::ProviderUnavailable(reason) => {
                self.session.mark_unavailable(reason.clone());
                self.search.set_enabled(false);
                None
            }
            Action::DebounceElapsed(generation) => {
                if let Some(query) = self.search.debounce_elapsed(*generation) {
                    if let Some(bridge) = self.bridge() {
                        bridge.suggestions(query);
                    }
                }
                None
            }
            Action::SuggestionsLoaded(ticket, result) => {
                self.search.apply(*ticket, result.clone());
                None
            }
            Action::AddressSelected(description) => {
                let ticket = self.session.select_address(description);
                if let Some(bridge) = self.bridge() {
                    bridge.geocode(ticket, description.clone());
                }
                None
            }
            Action::Geocoded(ticket, result) => {
                if !self.session.apply_geocode(*ticket, result.clone()) {
                    return Ok(None);
                }
                let notification = match result {
                    Ok(Some(place)) => Notification::info(format!("Showing {}", place.label)),
                    Ok(None) => Notification::error("Address not found"),
                    Err(e) => Notification::error(format!("Address lookup failed: {e}")),
                };
                Some(Action::Notify(notification))
            }
            Action::Located(ticket, result) => {
                if !self.session.apply_location(*ticket, result.clone()) {
                    return Ok(None);
                }
                result.as_ref().err().map(|e| {
                    Action::Notify(Notification::warning(format!("Location unavailable: {e}")))
                })
            }
            Action::RequestDirections => self.on_directions_requested(),
            Action::DirectionsLoaded(ticket, result) => {
                if !self.session.apply_directions(*ticket, result.clone()) {
                    return Ok(None);
                }
                let notification = match result {
                    Ok(Some(route)) => Notification::success(format!(
                        "Route found: {}, {}",
                        route.distance_text, route.duration_text
                    )),
                    Ok(None) => Notification::error("No driving route found"),
                    Err(e) => Notification::error(format!("Directions failed: {e}")),
                };
                Some(Action::Notify(notification))
            }
            _ => None,
        };
        self.sync_camera();
        Ok(follow_up)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [top, status, map, footer] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);
        let button_width = u16::try_from(BUTTON_LABEL.len()).unwrap_or(0) + 4;
        let [input, button] =
            Layout::horizontal([Constraint::Min(10), Constraint::Length(button_width)]).areas(top);

        search_box::render_input(frame, input, &self.input, &self.search, self.focus == Focus::Search);
        search_box::render_status(frame, status, &self.search, &self.throbber);
        self.render_button(frame, button);
        let canvas = self.render_map(frame, map);
        self.render_footer(frame, footer);

        // Popup last so it covers the map.
        let mut popup = Rect::default();
        if self.popup_visible() {
            let rows = self.search.visible_suggestions().len();
            let below = input.bottom();
            popup = Rect::new(
                input.x,
                below,
                input.width,
                search_box::popup_height(rows).min(area.bottom().saturating_sub(below)),
            );
            search_box::render_suggestions(frame, popup, &self.search);
        }

        self.hitboxes.set(Hitboxes {
            input,
            button,
            popup,
            canvas,
        });
    }

    fn captures_text(&self) -> bool {
        self.focus == Focus::Search
    }

    fn unmount(&mut self) {
        self.session.teardown();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::action::NotificationLevel;
    use pretty_assertions::assert_eq;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use tokio::sync::mpsc;
    use waymark_core::{LatLng, Place, Route, Suggestion, Ticket};

    fn mounted() -> (MapScreen, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut screen = MapScreen::new(MapConfig::default(), Duration::from_millis(300), None);
        screen.init(tx).unwrap();
        (screen, rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Mark the session ready without going through the bridge and
    /// return the location ticket it issued.
    fn located_ticket(screen: &mut MapScreen) -> Ticket {
        screen.session.on_ready().unwrap()
    }

    fn draw(screen: &MapScreen) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| screen.render(frame, frame.area())).unwrap();
        terminal
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn keystrokes_are_ignored_until_ready() {
        let (mut screen, _rx) = mounted();
        screen.handle_key_event(key(KeyCode::Char('k'))).unwrap();
        assert_eq!(screen.input.value(), "");
        assert!(buffer_text(&draw(&screen)).contains("loading maps"));
    }

    #[tokio::test(start_paused = true)]
    async fn typing_arms_a_debounce_for_the_latest_edit() {
        let (mut screen, mut rx) = mounted();
        screen.update(&Action::ProviderReady).unwrap();
        for c in "kath".chars() {
            screen.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(screen.input.value(), "kath");

        // The paused clock jumps straight to each timer.
        let mut fired = Vec::new();
        while let Ok(Some(action)) = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await
        {
            if let Action::DebounceElapsed(generation) = action {
                fired.push(generation);
            }
        }
        fired.sort_unstable();
        assert_eq!(fired, vec![1, 2, 3, 4]);

        // Only the last generation produces a query.
        for generation in &fired[..3] {
            screen.update(&Action::DebounceElapsed(*generation)).unwrap();
            assert_ne!(screen.search.status(), waymark_core::SuggestionStatus::Pending);
        }
        screen.update(&Action::DebounceElapsed(4)).unwrap();
        assert_eq!(screen.search.status(), waymark_core::SuggestionStatus::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn enter_selects_the_highlighted_suggestion() {
        let (mut screen, _rx) = mounted();
        screen.update(&Action::ProviderReady).unwrap();
        screen.handle_key_event(key(KeyCode::Char('p'))).unwrap();
        let query = screen.search.debounce_elapsed(1).unwrap();
        let rows = vec![
            Suggestion {
                id: "a".into(),
                primary_text: "Patan".into(),
                secondary_text: "Lalitpur".into(),
                description: "Patan, Lalitpur, Nepal".into(),
            },
            Suggestion {
                id: "b".into(),
                primary_text: "Pokhara".into(),
                secondary_text: "Nepal".into(),
                description: "Pokhara, Nepal".into(),
            },
        ];
        screen
            .update(&Action::SuggestionsLoaded(query.ticket, Ok(Arc::new(rows))))
            .unwrap();
        assert!(buffer_text(&draw(&screen)).contains("Pokhara"));

        screen.handle_key_event(key(KeyCode::Down)).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();

        assert!(matches!(action, Some(Action::AddressSelected(ref d)) if d == "Pokhara, Nepal"));
        assert_eq!(screen.input.value(), "Pokhara, Nepal");
        assert_eq!(screen.focus(), Focus::Map);
        assert!(screen.search.visible_suggestions().is_empty());
    }

    #[test]
    fn directions_without_location_only_warns() {
        let (mut screen, _rx) = mounted();
        screen.update(&Action::ProviderReady).unwrap();

        let follow_up = screen.update(&Action::RequestDirections).unwrap();

        let Some(Action::Notify(notification)) = follow_up else {
            panic!("expected a hint toast, got {follow_up:?}");
        };
        assert_eq!(notification.level, NotificationLevel::Warning);
        assert_eq!(
            screen.session().handles().unwrap().directions_issued(),
            0
        );
    }

    #[test]
    fn location_moves_the_camera_but_panning_does_not_move_the_view() {
        let (mut screen, _rx) = mounted();
        let ticket = located_ticket(&mut screen);
        let here = LatLng::new(27.7172, 85.324);

        screen.update(&Action::Located(ticket, Ok(here))).unwrap();
        assert_eq!(screen.camera.center(), here);

        screen.focus = Focus::Map;
        screen.handle_key_event(key(KeyCode::Right)).unwrap();
        assert_ne!(screen.camera.center(), here);
        assert_eq!(screen.session().view().center, here);

        screen.handle_key_event(key(KeyCode::Char('c'))).unwrap();
        assert_eq!(screen.camera.center(), here);
    }

    #[test]
    fn geocode_miss_keeps_the_view_and_reports() {
        let (mut screen, _rx) = mounted();
        located_ticket(&mut screen);
        let before = screen.session().view().center;
        let ticket = screen.session.select_address("Nowhere");

        let follow_up = screen.update(&Action::Geocoded(ticket, Ok(None))).unwrap();

        assert!(matches!(
            follow_up,
            Some(Action::Notify(Notification { level: NotificationLevel::Error, .. }))
        ));
        assert_eq!(screen.session().view().center, before);
    }

    #[test]
    fn geocode_hit_recenters() {
        let (mut screen, _rx) = mounted();
        located_ticket(&mut screen);
        let ticket = screen.session.select_address("Boudhanath");
        let stupa = LatLng::new(27.7215, 85.362);

        screen
            .update(&Action::Geocoded(
                ticket,
                Ok(Some(Place {
                    label: "Boudhanath Stupa".into(),
                    location: stupa,
                })),
            ))
            .unwrap();

        assert_eq!(screen.camera.center(), stupa);
    }

    #[test]
    fn failed_directions_show_in_footer_and_keep_route() {
        let (mut screen, _rx) = mounted();
        let ticket = located_ticket(&mut screen);
        let here = LatLng::new(27.7172, 85.324);
        screen.update(&Action::Located(ticket, Ok(here))).unwrap();

        let first = screen.session.request_directions().unwrap();
        let route = Route {
            origin: first.origin,
            destination: first.destination,
            path: vec![first.origin, first.destination],
            summary: "Ring Rd".into(),
            distance_text: "1.2 km".into(),
            duration_text: "4 mins".into(),
            distance_m: 1200,
            duration: Duration::from_secs(240),
            warnings: Vec::new(),
            copyrights: String::new(),
        };
        screen
            .update(&Action::DirectionsLoaded(first.ticket, Ok(Some(route))))
            .unwrap();

        let second = screen.session.request_directions().unwrap();
        screen
            .update(&Action::DirectionsLoaded(
                second.ticket,
                Err(CoreError::Timeout),
            ))
            .unwrap();

        assert_eq!(screen.session().route().unwrap().summary, "Ring Rd");
        assert!(buffer_text(&draw(&screen)).contains("Directions failed"));
    }

    #[test]
    fn unavailable_provider_explains_why() {
        let (mut screen, _rx) = mounted();
        screen
            .update(&Action::ProviderUnavailable("no API key configured".into()))
            .unwrap();
        let text = buffer_text(&draw(&screen));
        assert!(text.contains("Map unavailable"));
        assert!(text.contains("no API key configured"));
    }
}
