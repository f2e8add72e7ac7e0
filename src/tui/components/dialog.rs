//! # Dialog Overlay
//!
//! Centered modal box for notices and the discard-changes question.
//! The options come from the core `Dialog`; this module only tracks
//! which button is highlighted.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::core::state::{Dialog, DialogOption};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::centered_rect;
use crate::tui::event::TuiEvent;

/// Persistent state for an open dialog.
pub struct DialogState {
    /// The core dialog this state was built for.
    pub shown: Dialog,
    pub options: &'static [DialogOption],
    pub selected: usize,
}

impl DialogState {
    pub fn new(dialog: &Dialog) -> Self {
        Self {
            shown: dialog.clone(),
            options: dialog.options(),
            selected: 0,
        }
    }

    pub fn is_for(&self, dialog: &Dialog) -> bool {
        self.shown == *dialog
    }
}

impl EventHandler for DialogState {
    type Event = DialogOption;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<DialogOption> {
        match event {
            TuiEvent::CursorLeft | TuiEvent::PrevField => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::CursorRight | TuiEvent::NextField => {
                if !self.options.is_empty() {
                    self.selected = (self.selected + 1).min(self.options.len() - 1);
                }
                None
            }
            TuiEvent::Submit => self.options.get(self.selected).copied(),
            // First option is always the one that loses nothing
            TuiEvent::Escape => self.options.first().copied(),
            _ => None,
        }
    }
}

pub struct DialogOverlay<'a> {
    dialog: &'a Dialog,
    state: &'a DialogState,
}

impl<'a> DialogOverlay<'a> {
    pub fn new(dialog: &'a Dialog, state: &'a DialogState) -> Self {
        Self { dialog, state }
    }
}

impl Component for DialogOverlay<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(60, 30, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" refgen ")
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" \u{2190}/\u{2192} Choose  Enter Confirm ").centered())
            .padding(Padding::uniform(1));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let [message_area, buttons_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        let message = Paragraph::new(self.dialog.message.as_str())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(message, message_area);

        let mut spans = Vec::new();
        for (i, option) in self.state.options.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("   "));
            }
            let style = if i == self.state.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!("[ {} ]", option.label()), style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)).centered(), buttons_area);
    }
}
