//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Flow
//!
//! ```text
//! crossterm Event ─► TuiEvent ─► component (dialog / list / form)
//!                                   │ ListEvent / EditFormEvent / DialogOption
//!                                   ▼
//!                               core::Action ─► update() ─► Effect
//!                                                             │
//!                   TuiState reseeded from App  ◄─────────────┘
//! ```
//!
//! ## Redraw Strategy
//!
//! Nothing animates, so the loop sleeps up to 500ms waiting for input and
//! only redraws after an event (including terminal resize). All pending
//! events are drained before the next draw.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::{self, stdout};
use std::time::Duration;

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::core::action::{Action, Effect, update};
use crate::core::state::{App, Screen};
use crate::tui::component::EventHandler;
use crate::tui::components::{
    DialogState, EditFormEvent, EditFormState, ListEvent, RecordListState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const IDLE_POLL: Duration = Duration::from_millis(500);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub record_list: RecordListState,
    /// Present while the edit screen is showing.
    pub edit_form: Option<EditFormState>,
    /// Present while the core has a dialog open.
    pub dialog: Option<DialogState>,
}

impl TuiState {
    pub fn new(app: &App) -> Self {
        let mut state = Self {
            record_list: RecordListState::new(app.summaries.clone(), app.selected),
            edit_form: None,
            dialog: None,
        };
        state.sync(app);
        state
    }

    /// Reseed component state after the core reported `effect`.
    pub fn apply(&mut self, effect: Effect, app: &App) {
        match effect {
            Effect::ShowList => {
                self.record_list = RecordListState::new(app.summaries.clone(), app.selected);
                self.edit_form = None;
            }
            Effect::ShowEditForm => {
                self.edit_form = app
                    .current
                    .as_ref()
                    .map(|current| EditFormState::new(current.fields.clone(), app.model.today()));
            }
            Effect::None | Effect::Quit => {}
        }
        self.sync(app);
    }

    /// Open or close overlays and screens to match `app`.
    pub fn sync(&mut self, app: &App) {
        // The core may swap one dialog for another within a single update
        match &app.dialog {
            Some(dialog) if self.dialog.as_ref().is_some_and(|d| d.is_for(dialog)) => {}
            Some(dialog) => self.dialog = Some(DialogState::new(dialog)),
            None => self.dialog = None,
        }

        match app.screen {
            Screen::Editing if self.edit_form.is_none() => {
                self.edit_form = app
                    .current
                    .as_ref()
                    .map(|current| EditFormState::new(current.fields.clone(), app.model.today()));
            }
            Screen::List => self.edit_form = None,
            _ => {}
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // Kitty keyboard protocol is harmlessly ignored by terminals without it
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,                        // Show cursor for field editing
            SetCursorStyle::SteadyBlock, // Non-blinking: redraws reset the blink timer
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Take over the terminal and run until the user quits.
pub fn run(mut app: App) -> io::Result<()> {
    let mut tui = TuiState::new(&app);

    let mut terminal = ratatui::init();
    let terminal_mode_guard = TerminalModeGuard::new()
        .inspect_err(|e| warn!("Could not enable terminal modes: {}", e))
        .ok();

    let result = event_loop(&mut terminal, &mut app, &mut tui);

    drop(terminal_mode_guard);
    ratatui::restore();
    info!("Terminal restored");
    result
}

fn event_loop(terminal: &mut DefaultTerminal, app: &mut App, tui: &mut TuiState) -> io::Result<()> {
    let mut needs_redraw = true; // Force first frame

    loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, app, tui))?;
            needs_redraw = false;
        }

        let mut pending = poll_event_timeout(IDLE_POLL)?;
        while let Some(event) = pending {
            needs_redraw = true;
            if dispatch(app, tui, event) == Effect::Quit {
                return Ok(());
            }
            pending = poll_event_immediate()?;
        }
    }
}

/// Route one terminal event to whichever component has focus, feed the
/// resulting action to the core, and reseed TUI state from the effect.
fn dispatch(app: &mut App, tui: &mut TuiState, event: TuiEvent) -> Effect {
    let action = match event {
        TuiEvent::Resize => None,
        // Ctrl+C always quits, even over a dialog
        TuiEvent::ForceQuit => Some(Action::Quit),
        _ => {
            if let Some(dialog) = tui.dialog.as_mut() {
                dialog.handle_event(&event).map(Action::DialogResponse)
            } else {
                match app.screen {
                    Screen::List => tui.record_list.handle_event(&event).map(list_action),
                    Screen::Editing => tui
                        .edit_form
                        .as_mut()
                        .and_then(|form| form.handle_event(&event))
                        .map(form_action),
                    Screen::Quit => None,
                }
            }
        }
    };

    let Some(action) = action else {
        return Effect::None;
    };
    debug!("Dispatching {:?}", action);
    let effect = update(app, action);
    tui.apply(effect, app);
    effect
}

fn list_action(event: ListEvent) -> Action {
    match event {
        ListEvent::Add => Action::Add,
        ListEvent::Edit(id) => Action::EditSelected(id),
        ListEvent::Copy(id) => Action::CopySelected(id),
        ListEvent::Delete(id) => Action::DeleteSelected(id),
        ListEvent::Generate(id) => Action::GenerateSelected(id),
        ListEvent::Select(id) => Action::SelectionChanged(id),
        ListEvent::Quit => Action::Quit,
    }
}

fn form_action(event: EditFormEvent) -> Action {
    match event {
        EditFormEvent::Changed(fields) => Action::FieldsChanged(fields),
        EditFormEvent::Save => Action::Save,
        EditFormEvent::Cancel => Action::CancelRequested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::RecordId;
    use crate::core::state::{DISCARD_PROMPT, DialogOption};
    use crate::store::{MemoryStore, RecordStore};
    use crate::test_support::{sample_fields, test_app, test_app_with_store};

    fn press(app: &mut App, tui: &mut TuiState, events: &[TuiEvent]) -> Effect {
        let mut last = Effect::None;
        for event in events {
            last = dispatch(app, tui, event.clone());
        }
        last
    }

    fn type_text(app: &mut App, tui: &mut TuiState, text: &str) {
        for c in text.chars() {
            dispatch(app, tui, TuiEvent::InputChar(c));
        }
    }

    #[test]
    fn test_add_fill_and_save() {
        let (mut app, _dir) = test_app();
        let mut tui = TuiState::new(&app);

        assert_eq!(
            press(&mut app, &mut tui, &[TuiEvent::InputChar('a')]),
            Effect::ShowEditForm
        );
        assert!(tui.edit_form.is_some());

        type_text(&mut app, &mut tui, "Ana Lee");
        // Name -> date -> start year, pick the current year
        press(
            &mut app,
            &mut tui,
            &[TuiEvent::NextField, TuiEvent::NextField, TuiEvent::CursorRight],
        );
        // -> end year -> target -> how known
        press(
            &mut app,
            &mut tui,
            &[TuiEvent::NextField, TuiEvent::NextField, TuiEvent::NextField],
        );
        type_text(&mut app, &mut tui, "taught her");
        press(&mut app, &mut tui, &[TuiEvent::NextField]);
        type_text(&mut app, &mut tui, "Ana is excellent.");

        assert!(app.current.as_ref().unwrap().is_dirty());
        assert_eq!(
            press(&mut app, &mut tui, &[TuiEvent::Save]),
            Effect::ShowList
        );
        assert!(tui.edit_form.is_none());
        assert_eq!(tui.record_list.summaries.len(), 1);
        assert_eq!(tui.record_list.summaries[0].name, "Ana Lee");
        assert_eq!(tui.record_list.selected_id(), app.selected);
    }

    #[test]
    fn test_validation_dialog_routes_keys() {
        let (mut app, _dir) = test_app();
        let mut tui = TuiState::new(&app);

        press(&mut app, &mut tui, &[TuiEvent::InputChar('a'), TuiEvent::Save]);
        assert!(tui.dialog.is_some());
        assert_eq!(
            app.dialog.as_ref().unwrap().message,
            "start year missing: please fix"
        );

        // Typing goes nowhere while the dialog is up
        type_text(&mut app, &mut tui, "xyz");
        assert_eq!(app.current.as_ref().unwrap().fields.name, "");

        press(&mut app, &mut tui, &[TuiEvent::Submit]);
        assert!(tui.dialog.is_none());
        assert!(app.dialog.is_none());
        assert_eq!(app.screen, Screen::Editing);
    }

    #[test]
    fn test_cancel_dirty_then_discard() {
        let (mut app, _dir) = test_app();
        let mut tui = TuiState::new(&app);

        press(&mut app, &mut tui, &[TuiEvent::InputChar('a')]);
        type_text(&mut app, &mut tui, "Ana");
        press(&mut app, &mut tui, &[TuiEvent::Escape]);
        assert_eq!(app.dialog.as_ref().unwrap().message, DISCARD_PROMPT);

        // Escape on the dialog keeps editing
        press(&mut app, &mut tui, &[TuiEvent::Escape]);
        assert_eq!(app.screen, Screen::Editing);
        assert_eq!(tui.edit_form.as_ref().unwrap().fields.name, "Ana");

        press(&mut app, &mut tui, &[TuiEvent::Escape, TuiEvent::CursorRight]);
        assert_eq!(
            press(&mut app, &mut tui, &[TuiEvent::Submit]),
            Effect::ShowList
        );
        assert_eq!(app.screen, Screen::List);
        assert!(tui.record_list.summaries.is_empty());
    }

    #[test]
    fn test_store_error_after_discard_is_dismissible() {
        let store = MemoryStore::new();
        let (mut app, _dir) = test_app_with_store(store.clone());
        let mut tui = TuiState::new(&app);

        press(&mut app, &mut tui, &[TuiEvent::InputChar('a')]);
        type_text(&mut app, &mut tui, "x");
        press(&mut app, &mut tui, &[TuiEvent::Escape, TuiEvent::CursorRight]);

        // Discarding refreshes the list, which now fails
        store.set_simulate_list_error(true);
        press(&mut app, &mut tui, &[TuiEvent::Submit]);

        let notice = app.dialog.as_ref().unwrap();
        assert!(notice.message.starts_with("Couldn't reach the record store"));
        assert_eq!(tui.dialog.as_ref().unwrap().options, &[DialogOption::Ok]);

        store.set_simulate_list_error(false);
        press(&mut app, &mut tui, &[TuiEvent::Submit]);
        assert!(app.dialog.is_none());
        assert!(tui.dialog.is_none());
        assert_eq!(app.screen, Screen::List);
    }

    #[test]
    fn test_delete_from_list_needs_two_presses() {
        let mut store = MemoryStore::new();
        store.create(&sample_fields("Ana Lee")).unwrap();
        store.create(&sample_fields("Ben Ode")).unwrap();
        let (mut app, _dir) = test_app_with_store(store);
        let mut tui = TuiState::new(&app);
        assert_eq!(tui.record_list.selected_id(), Some(RecordId(2)));

        press(&mut app, &mut tui, &[TuiEvent::InputChar('d')]);
        assert_eq!(app.summaries.len(), 2);
        press(&mut app, &mut tui, &[TuiEvent::InputChar('d')]);
        assert_eq!(app.summaries.len(), 1);
        assert_eq!(tui.record_list.selected_id(), Some(RecordId(1)));
    }

    #[test]
    fn test_edit_seeds_form_from_record() {
        let mut store = MemoryStore::new();
        store.create(&sample_fields("Ana Lee")).unwrap();
        let (mut app, _dir) = test_app_with_store(store);
        let mut tui = TuiState::new(&app);

        press(&mut app, &mut tui, &[TuiEvent::Submit]);
        let form = tui.edit_form.as_ref().unwrap();
        assert_eq!(form.fields, sample_fields("Ana Lee"));
    }

    #[test]
    fn test_generate_from_list() {
        let mut store = MemoryStore::new();
        store.create(&sample_fields("Ana Lee")).unwrap();
        let (mut app, dir) = test_app_with_store(store);
        let mut tui = TuiState::new(&app);

        press(&mut app, &mut tui, &[TuiEvent::Generate]);
        assert_eq!(app.screen, Screen::List);
        assert!(app.status_message.starts_with("Wrote"));
        assert!(dir.path().join("2024-05-01-Ana_Lee.md").exists());
    }

    #[test]
    fn test_force_quit_over_dialog() {
        let (mut app, _dir) = test_app();
        let mut tui = TuiState::new(&app);
        press(&mut app, &mut tui, &[TuiEvent::InputChar('a'), TuiEvent::Save]);
        assert!(tui.dialog.is_some());

        assert_eq!(
            press(&mut app, &mut tui, &[TuiEvent::ForceQuit]),
            Effect::Quit
        );
        assert_eq!(app.screen, Screen::Quit);
    }

    #[test]
    fn test_quit_from_list() {
        let (mut app, _dir) = test_app();
        let mut tui = TuiState::new(&app);
        assert_eq!(
            press(&mut app, &mut tui, &[TuiEvent::InputChar('q')]),
            Effect::Quit
        );
    }

    #[test]
    fn test_resize_is_ignored() {
        let (mut app, _dir) = test_app();
        let mut tui = TuiState::new(&app);
        assert_eq!(press(&mut app, &mut tui, &[TuiEvent::Resize]), Effect::None);
        assert_eq!(app.screen, Screen::List);
    }
}
