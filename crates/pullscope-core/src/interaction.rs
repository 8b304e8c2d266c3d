// File: crates/pullscope-core/src/interaction.rs
// Summary: Zoom/reset state machine mediating between gestures and the host's reset control.
// Notes:
// - Default -> Zoomed on any zoom, drag-select or pan gesture.
// - Zoomed -> Default only on an explicit reset. Data updates never change state.

use tracing::trace;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZoomState {
    #[default]
    Default,
    Zoomed,
}

/// The boolean exposed to the hosting view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub zoomed: bool,
}

/// Input to the controller, already classified by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewEvent {
    WheelZoom,
    DragSelect,
    Pan,
    Hover,
    DataUpdated,
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: ZoomState,
    pub to: ZoomState,
}

#[derive(Clone, Debug, Default)]
pub struct InteractionController {
    state: ZoomState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ZoomState {
        self.state
    }

    pub fn view_state(&self) -> ViewState {
        ViewState { zoomed: self.state == ZoomState::Zoomed }
    }

    /// Whether the host should show its reset-zoom control.
    pub fn show_reset(&self) -> bool {
        self.state == ZoomState::Zoomed
    }

    /// Apply one event; returns the transition if the state changed.
    pub fn handle(&mut self, event: ViewEvent) -> Option<Transition> {
        let next = match (self.state, event) {
            (_, ViewEvent::WheelZoom | ViewEvent::DragSelect | ViewEvent::Pan) => ZoomState::Zoomed,
            (_, ViewEvent::Reset) => ZoomState::Default,
            (state, ViewEvent::Hover | ViewEvent::DataUpdated) => state,
        };
        if next == self.state {
            return None;
        }
        let transition = Transition { from: self.state, to: next };
        trace!(?event, from = ?transition.from, to = ?transition.to, "zoom state transition");
        self.state = next;
        Some(transition)
    }
}
