//! # Record List Component
//!
//! The main screen: every saved reference, newest first, with the actions
//! that start from a selected row.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `RecordListState` lives in `TuiState`
//! - `RecordList` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph};

use crate::core::record::{RecordId, Summary};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::truncate_str;
use crate::tui::event::TuiEvent;

/// Persistent state for the record list.
pub struct RecordListState {
    pub summaries: Vec<Summary>,
    pub selected: usize,
    pub confirm_delete: bool,
    pub list_state: ListState,
}

impl RecordListState {
    /// Build from the core's summaries, highlighting `selected` if it is listed.
    pub fn new(summaries: Vec<Summary>, selected: Option<RecordId>) -> Self {
        let index = selected
            .and_then(|id| summaries.iter().position(|s| s.id == id))
            .unwrap_or(0);
        let mut list_state = ListState::default();
        if !summaries.is_empty() {
            list_state.select(Some(index));
        }
        Self {
            summaries,
            selected: index,
            confirm_delete: false,
            list_state,
        }
    }

    pub fn selected_id(&self) -> Option<RecordId> {
        self.summaries.get(self.selected).map(|s| s.id)
    }

    fn move_selection(&mut self, down: bool) -> Option<ListEvent> {
        if self.summaries.is_empty() {
            return None;
        }
        self.selected = if down {
            (self.selected + 1).min(self.summaries.len() - 1)
        } else {
            self.selected.saturating_sub(1)
        };
        self.list_state.select(Some(self.selected));
        self.selected_id().map(ListEvent::Select)
    }
}

/// Events emitted by the record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    Add,
    Edit(RecordId),
    Copy(RecordId),
    Delete(RecordId),
    Generate(RecordId),
    Select(RecordId),
    Quit,
}

impl EventHandler for RecordListState {
    type Event = ListEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ListEvent> {
        // Reset delete confirmation on any non-delete key
        let is_delete_key = matches!(event, TuiEvent::InputChar('d'));
        if !is_delete_key {
            self.confirm_delete = false;
        }

        match event {
            TuiEvent::Escape | TuiEvent::InputChar('q') => Some(ListEvent::Quit),
            TuiEvent::CursorUp => self.move_selection(false),
            TuiEvent::CursorDown => self.move_selection(true),
            TuiEvent::InputChar('a') => Some(ListEvent::Add),
            TuiEvent::Submit | TuiEvent::InputChar('e') => self.selected_id().map(ListEvent::Edit),
            TuiEvent::InputChar('c') => self.selected_id().map(ListEvent::Copy),
            TuiEvent::Generate | TuiEvent::InputChar('g') => {
                self.selected_id().map(ListEvent::Generate)
            }
            TuiEvent::InputChar('d') => {
                let id = self.selected_id()?;
                if self.confirm_delete {
                    self.confirm_delete = false;
                    Some(ListEvent::Delete(id))
                } else {
                    self.confirm_delete = true;
                    None
                }
            }
            _ => None,
        }
    }
}

/// Transient render wrapper for the record list.
pub struct RecordList<'a> {
    state: &'a mut RecordListState,
}

impl<'a> RecordList<'a> {
    pub fn new(state: &'a mut RecordListState) -> Self {
        Self { state }
    }
}

impl Component for RecordList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let help_text = if self.state.confirm_delete {
            " Press d again to confirm delete | any other key cancels "
        } else if self.state.summaries.is_empty() {
            " a Add  q Quit "
        } else {
            " a Add  c Copy  Enter Edit  d Delete  F5 Generate  q Quit "
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" List of references ")
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(help_text).centered())
            .padding(Padding::horizontal(1));

        if self.state.summaries.is_empty() {
            let empty = Paragraph::new("No references yet. Press a to add one.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        // Layout: "2024-05-01  <name 45%>  <target>"
        let inner_width = area.width.saturating_sub(4) as usize; // borders + padding
        let date_width = 10;
        let name_width = (inner_width.saturating_sub(date_width + 4) * 45) / 100;
        let target_width = inner_width.saturating_sub(date_width + 4 + name_width);

        let items: Vec<ListItem> = self
            .state
            .summaries
            .iter()
            .enumerate()
            .map(|(i, summary)| {
                let style = if i == self.state.selected {
                    let fg = if self.state.confirm_delete {
                        Color::Red
                    } else {
                        Color::Black
                    };
                    Style::default()
                        .fg(fg)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };

                let name = truncate_str(&summary.name, name_width);
                let target = truncate_str(&summary.target, target_width);
                let line = Line::from(vec![
                    Span::styled(summary.reference_date.format("%Y-%m-%d").to_string(), style),
                    Span::styled("  ", style),
                    Span::styled(format!("{:<width$}", name, width = name_width), style),
                    Span::styled("  ", style),
                    Span::styled(format!("{:<width$}", target, width = target_width), style),
                ]);
                ListItem::new(line)
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}
