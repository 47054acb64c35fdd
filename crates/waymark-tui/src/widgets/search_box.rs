//! Address search box: text input, status line and suggestion popup.
//!
//! Editing goes through `tui_input::Input`; query state lives in
//! [`AddressSearch`]. These helpers only translate keys and draw.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tui_input::{Input, InputRequest};

use waymark_core::{AddressSearch, SuggestionStatus};

use crate::theme;

/// Rows shown before the popup starts scrolling.
pub const MAX_ROWS: usize = 6;

/// Translate a key into an edit of the input line.
pub fn input_request(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('u') if ctrl => Some(InputRequest::DeleteLine),
        KeyCode::Char('w') if ctrl => Some(InputRequest::DeletePrevWord),
        KeyCode::Char('a') if ctrl => Some(InputRequest::GoToStart),
        KeyCode::Char('e') if ctrl => Some(InputRequest::GoToEnd),
        KeyCode::Char(_) if ctrl || alt => None,
        KeyCode::Char(c) => Some(InputRequest::InsertChar(c)),
        KeyCode::Backspace if ctrl || alt => Some(InputRequest::DeletePrevWord),
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left if ctrl => Some(InputRequest::GoToPrevWord),
        KeyCode::Right if ctrl => Some(InputRequest::GoToNextWord),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        _ => None,
    }
}

pub fn render_input(frame: &mut Frame, area: Rect, input: &Input, search: &AddressSearch, focused: bool) {
    let border = if focused && search.is_enabled() {
        theme::border_focused()
    } else {
        theme::border_default()
    };
    let block = Block::default()
        .title(" Search address ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if !search.is_enabled() {
        frame.render_widget(
            Paragraph::new(Span::styled(" loading maps…", theme::disabled())),
            inner,
        );
        return;
    }

    if input.value().is_empty() && !focused {
        frame.render_widget(
            Paragraph::new(Span::styled(" / to search", theme::key_hint())),
            inner,
        );
        return;
    }

    // One column of padding on the left, one kept free for the cursor.
    let width = usize::from(inner.width.saturating_sub(2));
    let scroll = input.visual_scroll(width);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(" "),
            Span::styled(input.value(), Style::default().fg(theme::DIM_WHITE)),
        ]))
        .scroll((0, u16::try_from(scroll).unwrap_or(u16::MAX))),
        inner,
    );

    if focused {
        let offset = input.visual_cursor().saturating_sub(scroll);
        let x = inner
            .x
            .saturating_add(1)
            .saturating_add(u16::try_from(offset).unwrap_or(u16::MAX));
        frame.set_cursor_position(Position::new(x.min(inner.right().saturating_sub(1)), inner.y));
    }
}

/// The one-line message under the box for non-`OK` outcomes.
pub fn status_line(status: &SuggestionStatus) -> Option<Line<'static>> {
    match status {
        SuggestionStatus::ZeroResults => Some(Line::from(Span::styled(
            " No matches",
            Style::default().fg(theme::ELECTRIC_YELLOW),
        ))),
        SuggestionStatus::Failed(reason) => Some(Line::from(Span::styled(
            format!(" Suggestions unavailable: {reason}"),
            Style::default().fg(theme::ERROR_RED),
        ))),
        SuggestionStatus::Idle | SuggestionStatus::Pending | SuggestionStatus::Ok => None,
    }
}

pub fn render_status(frame: &mut Frame, area: Rect, search: &AddressSearch, throbber: &ThrobberState) {
    let status = search.status();
    if status == SuggestionStatus::Pending {
        let spinner = Throbber::default()
            .label("searching…")
            .style(theme::key_hint())
            .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
        frame.render_stateful_widget(spinner, area, &mut throbber.clone());
    } else if let Some(line) = status_line(&status) {
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Popup height for `rows` suggestions, borders included.
pub fn popup_height(rows: usize) -> u16 {
    u16::try_from(rows.min(MAX_ROWS)).unwrap_or(0) + 2
}

pub fn render_suggestions(frame: &mut Frame, area: Rect, search: &AddressSearch) {
    let items: Vec<ListItem> = search
        .visible_suggestions()
        .iter()
        .map(|s| {
            let mut spans = vec![Span::styled(
                s.primary_text.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            if !s.secondary_text.is_empty() {
                spans.push(Span::styled(format!("  {}", s.secondary_text), theme::key_hint()));
            }
            ListItem::new(Line::from(spans)).style(theme::list_row())
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(theme::border_focused())
                .style(Style::default().bg(theme::BG_DARK)),
        )
        .highlight_style(theme::list_selected())
        .highlight_symbol("▸ ");

    let mut state = ListState::default().with_selected(search.highlighted());
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut state);
}

/// Index of the suggestion under a click inside the popup at `area`.
pub fn suggestion_at(area: Rect, rows: usize, position: Position) -> Option<usize> {
    if !area.contains(position) || position.y <= area.y {
        return None;
    }
    let index = usize::from(position.y - area.y - 1);
    (index < rows.min(MAX_ROWS)).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_keys_become_edits() {
        assert_eq!(input_request(key(KeyCode::Char('k'))), Some(InputRequest::InsertChar('k')));
        assert_eq!(input_request(key(KeyCode::Backspace)), Some(InputRequest::DeletePrevChar));
        assert_eq!(
            input_request(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)),
            Some(InputRequest::DeleteLine)
        );
        assert_eq!(input_request(key(KeyCode::Up)), None);
        assert_eq!(input_request(key(KeyCode::Enter)), None);
    }

    #[test]
    fn non_ok_statuses_get_a_message() {
        let text = |status| status_line(&status).map(|line| line.to_string());

        assert_eq!(text(SuggestionStatus::ZeroResults).as_deref(), Some(" No matches"));
        assert_eq!(
            text(SuggestionStatus::Failed("Quota exceeded: daily limit".into())).as_deref(),
            Some(" Suggestions unavailable: Quota exceeded: daily limit")
        );
        assert_eq!(text(SuggestionStatus::Ok), None);
        assert_eq!(text(SuggestionStatus::Idle), None);
    }

    #[test]
    fn clicks_map_to_rows_below_the_top_border() {
        let popup = Rect::new(2, 3, 40, popup_height(3));

        assert_eq!(suggestion_at(popup, 3, Position::new(10, 3)), None);
        assert_eq!(suggestion_at(popup, 3, Position::new(10, 4)), Some(0));
        assert_eq!(suggestion_at(popup, 3, Position::new(10, 6)), Some(2));
        assert_eq!(suggestion_at(popup, 3, Position::new(10, 7)), None);
        assert_eq!(suggestion_at(popup, 3, Position::new(60, 4)), None);
    }
}
