//! # Actions
//!
//! Everything that can happen in refgen becomes an `Action`.
//! User picks "Add" on the list? That's `Action::Add`.
//! User presses Esc on the edit screen? That's `Action::CancelRequested`.
//!
//! `update()` takes the current state and an action, applies the transition,
//! and returns an `Effect`: what the UI should repopulate next. Screen changes
//! are plain data in `App::screen`; nothing unwinds to switch screens.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Failures never escape `update()`. Validation, render and store errors are
//! turned into a dialog on the screen that caused them; a record that has
//! vanished from the store just refreshes the list.

use log::{debug, error, info, warn};

use crate::core::model::ModelError;
use crate::core::record::{RecordFields, RecordId};
use crate::core::state::{
    App, CurrentRecord, Dialog, DialogKind, DialogOption, RENDER_FAILURE_MESSAGE, Screen,
};
use crate::core::validation::{ValidationError, validate};
use crate::export::ExportError;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // List screen
    Add,
    EditSelected(RecordId),
    CopySelected(RecordId),
    DeleteSelected(RecordId),
    GenerateSelected(RecordId),
    SelectionChanged(RecordId),

    // Edit screen
    FieldsChanged(RecordFields),
    Save,
    CancelRequested,

    // Dialogs
    DialogResponse(DialogOption),

    Quit,
}

/// What the UI adapter needs to do after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Repopulate the list from `App::summaries` / `App::selected`.
    ShowList,
    /// Repopulate the edit form from `App::current`.
    ShowEditForm,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    debug!("update({:?}) on {:?}", action, app.screen);

    if action == Action::Quit {
        info!("Quit requested");
        app.screen = Screen::Quit;
        return Effect::Quit;
    }

    // A modal dialog swallows everything except its own answer
    if app.dialog.is_some() {
        return match action {
            Action::DialogResponse(option) => respond_to_dialog(app, option),
            other => {
                debug!("Ignoring {:?} while a dialog is open", other);
                Effect::None
            }
        };
    }

    match (app.screen, action) {
        (Screen::List, Action::Add) => add(app),
        (Screen::List, Action::EditSelected(id)) => edit(app, id),
        (Screen::List, Action::CopySelected(id)) => copy(app, id),
        (Screen::List, Action::DeleteSelected(id)) => delete(app, id),
        (Screen::List, Action::GenerateSelected(id)) => generate(app, id),
        (Screen::List, Action::SelectionChanged(id)) => {
            app.selected = Some(id);
            Effect::None
        }
        (Screen::Editing, Action::FieldsChanged(fields)) => {
            if let Some(current) = app.current.as_mut() {
                current.fields = fields;
            }
            Effect::None
        }
        (Screen::Editing, Action::Save) => save(app),
        (Screen::Editing, Action::CancelRequested) => cancel(app),
        (screen, action) => {
            debug!("Ignoring {:?} on {:?}", action, screen);
            Effect::None
        }
    }
}

fn add(app: &mut App) -> Effect {
    app.current = Some(CurrentRecord::new(app.model.today()));
    app.screen = Screen::Editing;
    app.status_message = String::from("New reference");
    Effect::ShowEditForm
}

fn edit(app: &mut App, id: RecordId) -> Effect {
    match app.model.read(id) {
        Ok(record) => {
            app.current = Some(CurrentRecord::from_record(record));
            app.selected = Some(id);
            app.screen = Screen::Editing;
            app.status_message = format!("Editing {}", id);
            Effect::ShowEditForm
        }
        Err(e) => list_action_failed(app, e),
    }
}

fn copy(app: &mut App, id: RecordId) -> Effect {
    let copied = app
        .model
        .duplicate(id)
        .and_then(|new_id| app.model.read(new_id));
    match copied {
        Ok(record) => {
            app.selected = record.id;
            app.current = Some(CurrentRecord::from_record(record));
            app.screen = Screen::Editing;
            app.status_message = format!("Copied {}", id);
            Effect::ShowEditForm
        }
        Err(e) => list_action_failed(app, e),
    }
}

fn delete(app: &mut App, id: RecordId) -> Effect {
    if let Err(e) = app.model.delete(id) {
        return list_action_failed(app, e);
    }
    if app.current.as_ref().is_some_and(|c| c.id == Some(id)) {
        app.current = None;
    }
    app.status_message = format!("Deleted {}", id);
    show_list(app)
}

fn generate(app: &mut App, id: RecordId) -> Effect {
    let record = match app.model.read(id) {
        Ok(record) => record,
        Err(e) => return list_action_failed(app, e),
    };
    let result = app.exporter.export(&record.fields);
    app.current = Some(CurrentRecord::from_record(record));
    app.selected = Some(id);

    match result {
        Ok(path) => {
            app.status_message = format!("Wrote {}", path.display());
        }
        Err(ExportError::Validation(e)) => {
            app.dialog = Some(validation_dialog(e));
        }
        Err(ExportError::Render(e)) => {
            warn!("Export of {} failed: {}", id, e);
            app.dialog = Some(Dialog::notice(RENDER_FAILURE_MESSAGE));
        }
    }
    Effect::None
}

fn save(app: &mut App) -> Effect {
    let Some(current) = app.current.as_mut() else {
        warn!("Save with no current record");
        return Effect::None;
    };

    let fields = current.fields.normalized();
    if let Err(e) = validate(&fields) {
        info!("Save blocked: {}", e);
        app.dialog = Some(validation_dialog(e));
        return Effect::None;
    }

    let persisted = match current.id {
        None => app.model.create(&fields),
        Some(id) => match app.model.update(id, &fields) {
            Ok(()) => Ok(id),
            Err(ModelError::NotFound(_)) => {
                // Deleted out from under us; keep the user's work as a new record
                warn!("Record {} vanished before save, creating it again", id);
                app.model.create(&fields)
            }
            Err(e) => Err(e),
        },
    };

    match persisted {
        Ok(id) => {
            current.id = Some(id);
            current.fields = fields.clone();
            current.snapshot = fields;
            app.selected = Some(id);
            app.status_message = format!("Saved {}", id);
            show_list(app)
        }
        Err(e) => {
            store_failed(app, e);
            Effect::None
        }
    }
}

fn cancel(app: &mut App) -> Effect {
    let dirty = app.current.as_ref().is_some_and(CurrentRecord::is_dirty);
    if dirty {
        app.dialog = Some(Dialog::confirm_discard());
        Effect::None
    } else {
        show_list(app)
    }
}

fn respond_to_dialog(app: &mut App, option: DialogOption) -> Effect {
    let Some(dialog) = app.dialog.take() else {
        return Effect::None;
    };
    match (dialog.kind, option) {
        (DialogKind::Notice, DialogOption::Ok) => Effect::None,
        (DialogKind::ConfirmDiscard, DialogOption::KeepEditing) => Effect::None,
        (DialogKind::ConfirmDiscard, DialogOption::Discard) => {
            if let Some(current) = app.current.as_mut() {
                current.revert();
            }
            app.status_message = String::from("Changes discarded");
            show_list(app)
        }
        (kind, option) => {
            debug!("{:?} is not an answer to a {:?} dialog", option, kind);
            app.dialog = Some(dialog);
            Effect::None
        }
    }
}

/// Move to the list screen with fresh summaries.
fn show_list(app: &mut App) -> Effect {
    app.screen = Screen::List;
    if let Err(e) = refresh_summaries(app) {
        store_failed(app, e);
    }
    Effect::ShowList
}

/// Reload the list, keeping the selection on the same record when it still
/// exists, otherwise on the row that took its place.
fn refresh_summaries(app: &mut App) -> Result<(), ModelError> {
    let previous_index = app.selected_index();
    app.summaries = app.model.list_summaries()?;

    let still_listed = app
        .selected
        .is_some_and(|id| app.summaries.iter().any(|s| s.id == id));
    if !still_listed {
        let index = previous_index
            .unwrap_or(0)
            .min(app.summaries.len().saturating_sub(1));
        app.selected = app.summaries.get(index).map(|s| s.id);
    }
    Ok(())
}

fn list_action_failed(app: &mut App, e: ModelError) -> Effect {
    match e {
        ModelError::NotFound(id) => {
            warn!("Record {} not found, refreshing list", id);
            let effect = show_list(app);
            if app.dialog.is_none() {
                app.status_message = format!("Record {} no longer exists", id);
            }
            effect
        }
        ModelError::Store(_) => {
            store_failed(app, e);
            Effect::None
        }
    }
}

fn store_failed(app: &mut App, e: ModelError) {
    error!("Store operation failed: {}", e);
    app.dialog = Some(Dialog::notice(format!("Couldn't reach the record store: {e}")));
}

fn validation_dialog(e: ValidationError) -> Dialog {
    Dialog::notice(format!("{e}: please fix"))
}
