//! # TitleBar Component
//!
//! Top line: the screen name and the core's status message.
//!
//! Stateless and props-based: the parent builds a `TitleBar` each frame
//! from `App` and renders it into a one-line area.

use crate::core::state::Screen;
use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar<'a> {
    pub screen: Screen,
    pub status_message: &'a str,
}

impl<'a> TitleBar<'a> {
    pub fn new(screen: Screen, status_message: &'a str) -> Self {
        Self {
            screen,
            status_message,
        }
    }
}

impl Component for TitleBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let screen_name = match self.screen {
            Screen::List => "References",
            Screen::Editing => "Edit",
            Screen::Quit => "Bye",
        };

        let mut spans = vec![
            Span::styled(
                "refgen",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" ({screen_name})")),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
            spans.push(Span::raw(self.status_message));
        }

        frame.render_widget(Line::from(spans), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(mut title_bar: TitleBar) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 1)).unwrap();
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();

        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_title_bar_with_status_message() {
        let text = rendered(TitleBar::new(Screen::List, "Wrote 2024-05-01-Ana_Lee.md"));
        assert!(text.contains("refgen (References)"));
        assert!(text.contains("| Wrote 2024-05-01-Ana_Lee.md"));
    }

    #[test]
    fn test_title_bar_without_status() {
        let text = rendered(TitleBar::new(Screen::Editing, ""));
        assert!(text.contains("refgen (Edit)"));
        assert!(!text.contains('|'));
    }
}
