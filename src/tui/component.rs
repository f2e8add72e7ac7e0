use ratatui::Frame;
use ratatui::layout::Rect;

use super::event::TuiEvent;

/// A piece of the screen that knows how to draw itself.
///
/// Components are thin wrappers created each frame around borrowed state
/// (the record list, the edit form, the dialog overlay). `render` takes
/// `&mut self` so a wrapper can update presentation state it owns, such as
/// a `ListState` scroll offset, while drawing.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Persistent component state that turns key presses into its own events.
pub trait EventHandler {
    /// The high-level event this component emits.
    type Event;

    /// Handle a low-level `TuiEvent`, returning an event only when the
    /// component wants the loop to act.
    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
