//! # Edit Form Component
//!
//! The second screen: one reference's fields, edited in place.
//!
//! Every change is reported to the core as a full `RecordFields` value so
//! the core can track dirtiness; the form itself never saves anything.
//!
//! ## Keys
//!
//! - Tab / Shift+Tab / Up / Down: move between fields
//! - Left / Right: move the text cursor, step the date a day, or cycle a year
//! - Enter: newline in the recommendation, next field elsewhere
//! - Ctrl+S: save, Esc: cancel

use chrono::{Datelike, NaiveDate};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Padding, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::core::record::RecordFields;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// How many years the pickers offer, counting back from the current one.
const YEAR_CHOICES: i32 = 10;
const LABEL_WIDTH: u16 = 16;
const STILL_HERE: &str = "Still here";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    ReferenceDate,
    StartYear,
    EndYear,
    Target,
    HowKnown,
    Recommendation,
}

impl FormField {
    const ALL: [FormField; 7] = [
        FormField::Name,
        FormField::ReferenceDate,
        FormField::StartYear,
        FormField::EndYear,
        FormField::Target,
        FormField::HowKnown,
        FormField::Recommendation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::ReferenceDate => "Reference date",
            FormField::StartYear => "Start year",
            FormField::EndYear => "End year",
            FormField::Target => "Target",
            FormField::HowKnown => "How known",
            FormField::Recommendation => "Recommendation",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn is_text(&self) -> bool {
        matches!(
            self,
            FormField::Name | FormField::Target | FormField::HowKnown | FormField::Recommendation
        )
    }
}

/// Events emitted by the edit form.
#[derive(Debug, Clone, PartialEq)]
pub enum EditFormEvent {
    Changed(RecordFields),
    Save,
    Cancel,
}

/// Persistent state for the edit form.
pub struct EditFormState {
    pub fields: RecordFields,
    pub focus: FormField,
    /// Cursor as a char index into the focused text field.
    pub cursor: usize,
    /// Start-year choices, newest first. `None` is "not chosen".
    pub start_choices: Vec<Option<i32>>,
    /// End-year choices, newest first. `None` is "Still here".
    pub end_choices: Vec<Option<i32>>,
    recommendation_scroll: u16,
}

impl EditFormState {
    pub fn new(fields: RecordFields, today: NaiveDate) -> Self {
        let years: Vec<i32> = (0..YEAR_CHOICES).map(|back| today.year() - back).collect();
        let start_choices = year_choices(&years, fields.start_year);
        let end_choices = year_choices(&years, fields.end_year);
        let cursor = fields.name.chars().count();
        Self {
            fields,
            focus: FormField::Name,
            cursor,
            start_choices,
            end_choices,
            recommendation_scroll: 0,
        }
    }

    fn text(&self, field: FormField) -> Option<&String> {
        match field {
            FormField::Name => Some(&self.fields.name),
            FormField::Target => Some(&self.fields.target),
            FormField::HowKnown => Some(&self.fields.how_known),
            FormField::Recommendation => Some(&self.fields.recommendation),
            _ => None,
        }
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Name => Some(&mut self.fields.name),
            FormField::Target => Some(&mut self.fields.target),
            FormField::HowKnown => Some(&mut self.fields.how_known),
            FormField::Recommendation => Some(&mut self.fields.recommendation),
            _ => None,
        }
    }

    fn focus_on(&mut self, field: FormField) {
        self.focus = field;
        self.cursor = self.text(field).map_or(0, |t| t.chars().count());
    }

    fn changed(&self) -> Option<EditFormEvent> {
        Some(EditFormEvent::Changed(self.fields.clone()))
    }

    fn insert(&mut self, text: &str) -> Option<EditFormEvent> {
        let field = self.focus;
        let cursor = self.cursor;
        let multiline = field == FormField::Recommendation;
        let insert: String = if multiline {
            text.replace("\r\n", "\n").replace('\r', "\n")
        } else {
            text.replace(['\r', '\n'], " ")
        };
        let buffer = self.text_mut(field)?;
        let at = byte_offset(buffer, cursor);
        buffer.insert_str(at, &insert);
        self.cursor += insert.chars().count();
        self.changed()
    }

    fn backspace(&mut self) -> Option<EditFormEvent> {
        if self.cursor == 0 {
            return None;
        }
        let cursor = self.cursor;
        let buffer = self.text_mut(self.focus)?;
        let at = byte_offset(buffer, cursor - 1);
        buffer.remove(at);
        self.cursor -= 1;
        self.changed()
    }

    fn delete(&mut self) -> Option<EditFormEvent> {
        let cursor = self.cursor;
        let buffer = self.text_mut(self.focus)?;
        if cursor >= buffer.chars().count() {
            return None;
        }
        let at = byte_offset(buffer, cursor);
        buffer.remove(at);
        self.changed()
    }

    /// Left/Right on a non-text field. `forward` steps to the later date or
    /// the next (older) year choice.
    fn step(&mut self, forward: bool) -> Option<EditFormEvent> {
        match self.focus {
            FormField::ReferenceDate => {
                let date = self.fields.reference_date;
                let stepped = if forward { date.succ_opt() } else { date.pred_opt() };
                self.fields.reference_date = stepped?;
            }
            FormField::StartYear => {
                self.fields.start_year = cycle(&self.start_choices, self.fields.start_year, forward);
            }
            FormField::EndYear => {
                self.fields.end_year = cycle(&self.end_choices, self.fields.end_year, forward);
            }
            _ => return None,
        }
        self.changed()
    }

    fn move_cursor(&mut self, forward: bool) {
        let len = self.text(self.focus).map_or(0, |t| t.chars().count());
        self.cursor = if forward {
            (self.cursor + 1).min(len)
        } else {
            self.cursor.saturating_sub(1)
        };
    }
}

impl EventHandler for EditFormState {
    type Event = EditFormEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<EditFormEvent> {
        match event {
            TuiEvent::Escape => Some(EditFormEvent::Cancel),
            TuiEvent::Save => Some(EditFormEvent::Save),
            TuiEvent::NextField | TuiEvent::CursorDown => {
                self.focus_on(self.focus.next());
                None
            }
            TuiEvent::PrevField | TuiEvent::CursorUp => {
                self.focus_on(self.focus.prev());
                None
            }
            TuiEvent::Submit if self.focus == FormField::Recommendation => self.insert("\n"),
            TuiEvent::Submit => {
                self.focus_on(self.focus.next());
                None
            }
            TuiEvent::CursorLeft | TuiEvent::CursorRight => {
                let forward = matches!(event, TuiEvent::CursorRight);
                if self.focus.is_text() {
                    self.move_cursor(forward);
                    None
                } else {
                    self.step(forward)
                }
            }
            TuiEvent::InputChar(c) if self.focus.is_text() => {
                let mut buf = [0u8; 4];
                self.insert(c.encode_utf8(&mut buf))
            }
            TuiEvent::Paste(text) if self.focus.is_text() => self.insert(text),
            TuiEvent::Backspace => self.backspace(),
            TuiEvent::Delete => self.delete(),
            _ => None,
        }
    }
}

/// `years` plus the stored value if it is older than the offered range,
/// with `None` in front.
fn year_choices(years: &[i32], stored: Option<i32>) -> Vec<Option<i32>> {
    let mut choices: Vec<Option<i32>> = std::iter::once(None)
        .chain(years.iter().copied().map(Some))
        .collect();
    if let Some(year) = stored.filter(|year| !years.contains(year)) {
        choices.push(Some(year));
        choices[1..].sort_by(|a, b| b.cmp(a));
    }
    choices
}

fn cycle(choices: &[Option<i32>], current: Option<i32>, forward: bool) -> Option<i32> {
    if choices.is_empty() {
        return current;
    }
    let len = choices.len();
    let index = choices.iter().position(|c| *c == current).unwrap_or(0);
    let next = if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    };
    choices[next]
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(offset, _)| offset)
}

/// One row of wrapped text: the char index it starts at and its content.
struct VisualLine {
    start: usize,
    text: String,
}

/// Wrap on newlines and at `width` display columns.
fn wrap_lines(text: &str, width: usize) -> Vec<VisualLine> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = VisualLine {
        start: 0,
        text: String::new(),
    };
    let mut current_width = 0;

    for (i, c) in text.chars().enumerate() {
        if c == '\n' {
            let next = VisualLine {
                start: i + 1,
                text: String::new(),
            };
            lines.push(std::mem::replace(&mut current, next));
            current_width = 0;
            continue;
        }
        let w = c.width().unwrap_or(0);
        if current_width + w > width && !current.text.is_empty() {
            let next = VisualLine {
                start: i,
                text: String::new(),
            };
            lines.push(std::mem::replace(&mut current, next));
            current_width = 0;
        }
        current.text.push(c);
        current_width += w;
    }
    lines.push(current);
    lines
}

/// (row, column) of `cursor` within wrapped lines.
fn cursor_in_lines(lines: &[VisualLine], cursor: usize) -> (usize, usize) {
    let row = lines
        .iter()
        .rposition(|line| line.start <= cursor)
        .unwrap_or(0);
    let column = lines
        .get(row)
        .map(|line| {
            line.text
                .chars()
                .take(cursor - line.start)
                .map(|c| c.width().unwrap_or(0))
                .sum()
        })
        .unwrap_or(0);
    (row, column)
}

/// Transient render wrapper for the edit form.
pub struct EditForm<'a> {
    state: &'a mut EditFormState,
    dirty: bool,
    /// Show the text cursor (false while a dialog covers the form)
    focused: bool,
}

impl<'a> EditForm<'a> {
    pub fn new(state: &'a mut EditFormState, dirty: bool, focused: bool) -> Self {
        Self {
            state,
            dirty,
            focused,
        }
    }

    fn value_text(&self, field: FormField) -> String {
        let fields = &self.state.fields;
        match field {
            FormField::ReferenceDate => {
                format!("\u{25c2} {} \u{25b8}", fields.reference_date.format("%d %b %Y"))
            }
            FormField::StartYear => match fields.start_year {
                Some(year) => format!("\u{25c2} {year} \u{25b8}"),
                None => "\u{25c2} choose \u{25b8}".to_string(),
            },
            FormField::EndYear => match fields.end_year {
                Some(year) => format!("\u{25c2} {year} \u{25b8}"),
                None => format!("\u{25c2} {STILL_HERE} \u{25b8}"),
            },
            other => self.state.text(other).cloned().unwrap_or_default(),
        }
    }
}

impl Component for EditForm<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = if self.dirty {
            " Edit reference (modified) "
        } else {
            " Edit reference "
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title)
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" Tab Next field  Ctrl+S Save  Esc Cancel ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let single_line = &FormField::ALL[..FormField::ALL.len() - 1];
        let mut constraints: Vec<Constraint> =
            single_line.iter().map(|_| Constraint::Length(1)).collect();
        constraints.push(Constraint::Length(1)); // spacer
        constraints.push(Constraint::Length(1)); // recommendation label
        constraints.push(Constraint::Min(1));
        let rows = Layout::vertical(constraints).split(inner);

        let label_style = Style::default().fg(Color::DarkGray);
        let focus_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let mut cursor_position = None;

        for (row, field) in rows.iter().zip(single_line) {
            let is_focused = *field == self.state.focus;
            let label = format!("{:<width$}", field.label(), width = LABEL_WIDTH as usize);
            let value = self.value_text(*field);
            let value_style = if is_focused {
                focus_style
            } else {
                Style::default().fg(Color::Gray)
            };
            let line = Line::from(vec![
                Span::styled(label, if is_focused { focus_style } else { label_style }),
                Span::styled(value.clone(), value_style),
            ]);
            frame.render_widget(Paragraph::new(line), *row);

            if is_focused && field.is_text() {
                let column: usize = value
                    .chars()
                    .take(self.state.cursor)
                    .map(|c| c.width().unwrap_or(0))
                    .sum();
                let x = (row.x + LABEL_WIDTH + column as u16).min(row.right().saturating_sub(1));
                cursor_position = Some(Position::new(x, row.y));
            }
        }

        let rec_focused = self.state.focus == FormField::Recommendation;
        let rec_label_row = rows[single_line.len() + 1];
        let rec_area = rows[single_line.len() + 2];
        frame.render_widget(
            Paragraph::new(Span::styled(
                FormField::Recommendation.label(),
                if rec_focused { focus_style } else { label_style },
            )),
            rec_label_row,
        );

        let lines = wrap_lines(&self.state.fields.recommendation, rec_area.width as usize);
        let (cursor_row, cursor_column) = cursor_in_lines(&lines, self.state.cursor);

        // Keep the cursor line on screen
        let visible = rec_area.height.max(1);
        let scroll = &mut self.state.recommendation_scroll;
        if rec_focused {
            let row = cursor_row as u16;
            if row < *scroll {
                *scroll = row;
            } else if row >= *scroll + visible {
                *scroll = row + 1 - visible;
            }
        }

        let text: Vec<Line> = lines
            .iter()
            .map(|line| Line::from(line.text.as_str()))
            .collect();
        let rec_style = if rec_focused {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::Gray)
        };
        frame.render_widget(
            Paragraph::new(text).style(rec_style).scroll((*scroll, 0)),
            rec_area,
        );

        if rec_focused {
            let y = rec_area.y + (cursor_row as u16).saturating_sub(*scroll);
            let x = (rec_area.x + cursor_column as u16).min(rec_area.right().saturating_sub(1));
            cursor_position = Some(Position::new(x, y));
        }

        if let Some(position) = cursor_position.filter(|_| self.focused) {
            frame.set_cursor_position(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, fixed_today, sample_fields};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn form() -> EditFormState {
        EditFormState::new(RecordFields::new(fixed_today()), fixed_today())
    }

    fn type_text(state: &mut EditFormState, text: &str) -> Option<EditFormEvent> {
        let mut last = None;
        for c in text.chars() {
            last = state.handle_event(&TuiEvent::InputChar(c));
        }
        last
    }

    #[test]
    fn test_typing_reports_changes() {
        let mut state = form();
        let event = type_text(&mut state, "Ana Lee");
        assert_eq!(state.fields.name, "Ana Lee");
        match event {
            Some(EditFormEvent::Changed(fields)) => assert_eq!(fields.name, "Ana Lee"),
            other => panic!("expected Changed, got {:?}", other),
        }
    }

    #[test]
    fn test_cursor_editing() {
        let mut state = form();
        type_text(&mut state, "Ana");
        state.handle_event(&TuiEvent::CursorLeft);
        state.handle_event(&TuiEvent::Backspace);
        assert_eq!(state.fields.name, "Aa");
        state.handle_event(&TuiEvent::Delete);
        assert_eq!(state.fields.name, "A");
        assert_eq!(state.handle_event(&TuiEvent::Delete), None);
    }

    #[test]
    fn test_multibyte_input() {
        let mut state = form();
        type_text(&mut state, "Zoë");
        state.handle_event(&TuiEvent::CursorLeft);
        type_text(&mut state, "\u{e9}");
        assert_eq!(state.fields.name, "Zo\u{e9}ë");
        state.handle_event(&TuiEvent::Backspace);
        assert_eq!(state.fields.name, "Zoë");
    }

    #[test]
    fn test_focus_cycles() {
        let mut state = form();
        assert_eq!(state.focus, FormField::Name);
        state.handle_event(&TuiEvent::PrevField);
        assert_eq!(state.focus, FormField::Recommendation);
        state.handle_event(&TuiEvent::NextField);
        state.handle_event(&TuiEvent::Submit);
        assert_eq!(state.focus, FormField::ReferenceDate);
    }

    #[test]
    fn test_date_steps_one_day() {
        let mut state = form();
        state.handle_event(&TuiEvent::NextField);
        state.handle_event(&TuiEvent::CursorRight);
        assert_eq!(state.fields.reference_date, date(2024, 5, 2));
        state.handle_event(&TuiEvent::CursorLeft);
        state.handle_event(&TuiEvent::CursorLeft);
        assert_eq!(state.fields.reference_date, date(2024, 4, 30));
    }

    #[test]
    fn test_start_year_picker() {
        let mut state = form();
        assert_eq!(state.start_choices.len(), 11);
        assert_eq!(state.start_choices[1], Some(2024));
        assert_eq!(state.start_choices[10], Some(2015));

        state.focus_on(FormField::StartYear);
        state.handle_event(&TuiEvent::CursorRight);
        assert_eq!(state.fields.start_year, Some(2024));
        state.handle_event(&TuiEvent::CursorRight);
        assert_eq!(state.fields.start_year, Some(2023));
        // Wraps back around to "not chosen"
        state.handle_event(&TuiEvent::CursorLeft);
        state.handle_event(&TuiEvent::CursorLeft);
        assert_eq!(state.fields.start_year, None);
    }

    #[test]
    fn test_end_year_still_here() {
        let mut state = EditFormState::new(sample_fields("Ana Lee"), fixed_today());
        assert_eq!(state.fields.end_year, None);
        state.focus_on(FormField::EndYear);
        state.handle_event(&TuiEvent::CursorRight);
        assert_eq!(state.fields.end_year, Some(2024));
        state.handle_event(&TuiEvent::CursorLeft);
        assert_eq!(state.fields.end_year, None);
    }

    #[test]
    fn test_old_stored_year_is_offered() {
        let mut fields = sample_fields("Ana Lee");
        fields.start_year = Some(2009);
        let state = EditFormState::new(fields, fixed_today());
        assert_eq!(state.start_choices.last(), Some(&Some(2009)));
        assert!(state.start_choices.contains(&Some(2024)));
    }

    #[test]
    fn test_newlines_only_in_recommendation() {
        let mut state = form();
        state.handle_event(&TuiEvent::Paste("a\nb".to_string()));
        assert_eq!(state.fields.name, "a b");

        state.focus_on(FormField::Recommendation);
        type_text(&mut state, "one");
        state.handle_event(&TuiEvent::Submit);
        type_text(&mut state, "two");
        assert_eq!(state.fields.recommendation, "one\ntwo");
    }

    #[test]
    fn test_typing_ignored_on_pickers() {
        let mut state = form();
        state.focus_on(FormField::StartYear);
        assert_eq!(state.handle_event(&TuiEvent::InputChar('x')), None);
        assert_eq!(state.handle_event(&TuiEvent::Backspace), None);
    }

    #[test]
    fn test_save_and_cancel() {
        let mut state = form();
        assert_eq!(state.handle_event(&TuiEvent::Save), Some(EditFormEvent::Save));
        assert_eq!(
            state.handle_event(&TuiEvent::Escape),
            Some(EditFormEvent::Cancel)
        );
    }

    #[test]
    fn test_wrap_lines_and_cursor() {
        let lines = wrap_lines("abcdef\ngh", 4);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["abcd", "ef", "gh"]);
        assert_eq!(cursor_in_lines(&lines, 5), (1, 1));
        assert_eq!(cursor_in_lines(&lines, 7), (2, 0));
        assert_eq!(cursor_in_lines(&lines, 9), (2, 2));
    }

    #[test]
    fn test_render_shows_fields() {
        let mut terminal = Terminal::new(TestBackend::new(70, 16)).unwrap();
        let mut state = EditFormState::new(sample_fields("Ana Lee"), fixed_today());
        terminal
            .draw(|f| EditForm::new(&mut state, true, true).render(f, f.area()))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Ana Lee"));
        assert!(text.contains("2019"));
        assert!(text.contains(STILL_HERE));
        assert!(text.contains("(modified)"));
    }
}
