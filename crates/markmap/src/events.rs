//! Event kinds and the handler actions a [`Document`](crate::dom::Document) can hold.
//!
//! Handlers are plain data: dispatch returns the handlers along the propagation path and the
//! page runtime executes them, so no callback ever borrows page state.

/// Key name delivered by hosts for the Escape key.
pub const ESCAPE: &str = "Escape";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
}

/// What closed a focus overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTrigger {
    CloseButton,
    Backdrop,
    Escape,
    /// The page was torn down while the overlay was open.
    Teardown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Click on an inline surface: hit-test and either let the diagram handle it or open the
    /// focus view.
    RouteInlineClick { block: usize },
    CloseOverlay {
        block: usize,
        trigger: DismissTrigger,
    },
    /// Document-level keydown: closes the overlay of `block` on [`ESCAPE`].
    CloseOnEscape { block: usize },
    /// Swallows the event so ancestors never see it.
    StopPropagation,
}

impl Handler {
    pub fn stops_propagation(self) -> bool {
        matches!(self, Handler::StopPropagation)
    }
}
