use crate::core::state::{App, Screen};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{DialogOverlay, EditForm, RecordList, TitleBar};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let [title_area, main_area] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());

    TitleBar::new(app.screen, &app.status_message).render(frame, title_area);

    match (app.screen, tui.edit_form.as_mut()) {
        (Screen::Editing, Some(form)) => {
            let dirty = app.current.as_ref().is_some_and(|c| c.is_dirty());
            EditForm::new(form, dirty, app.dialog.is_none()).render(frame, main_area);
        }
        _ => RecordList::new(&mut tui.record_list).render(frame, main_area),
    }

    if let (Some(dialog), Some(state)) = (app.dialog.as_ref(), tui.dialog.as_ref()) {
        DialogOverlay::new(dialog, state).render(frame, frame.area());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, update};
    use crate::store::{MemoryStore, RecordStore};
    use crate::test_support::{sample_fields, test_app_with_store};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen_text(app: &App, tui: &mut TuiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw_ui(f, app, tui)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_list_screen() {
        let mut store = MemoryStore::new();
        store.create(&sample_fields("Ana Lee")).unwrap();
        let (app, _dir) = test_app_with_store(store);

        let mut tui = TuiState::new(&app);
        let text = screen_text(&app, &mut tui);
        assert!(text.contains("refgen (References)"));
        assert!(text.contains("Ana Lee"));
    }

    #[test]
    fn test_edit_screen_with_dialog() {
        let (mut app, _dir) = test_app_with_store(MemoryStore::new());
        let mut tui = TuiState::new(&app);

        update(&mut app, Action::Add);
        tui.sync(&app);
        update(&mut app, Action::Save);
        tui.sync(&app);

        let text = screen_text(&app, &mut tui);
        assert!(text.contains("refgen (Edit)"));
        assert!(text.contains("Start year"));
        assert!(text.contains("start year missing: please fix"));
        assert!(text.contains("[ OK ]"));
    }
}
