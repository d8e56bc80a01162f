//! Type definitions for the list screens and their UI state.

use std::fmt::{Display, Formatter};

/// What a row of a list screen stands for.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum RowTarget {
    Choice(usize),
    /// Leave the option at its default.
    Skip,
}

impl Display for RowTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RowTarget::Choice(i) => write!(f, "{}", i + 1),
            RowTarget::Skip => f.write_str("-"),
        }
    }
}

/// A row of a list screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub target: RowTarget,
    pub label: String,
}

impl Display for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// Direction to cycle through rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleDirection {
    Up,
    Down,
}

/// Visible portion of the list when it does not fit on screen.
#[derive(Clone, PartialEq, Debug)]
pub struct ViewportState {
    pub offset: usize,
    pub height: u16,
    pub width: u16,
}

/// Complete UI state of a list screen.
#[derive(Clone, PartialEq, Debug)]
pub struct UiState {
    /// Position of the highlighted row among the displayed rows
    pub selected_index: usize,
    /// Viewport state for scrolling
    pub viewport: ViewportState,
    /// Whether the user is currently filtering
    pub is_filtering: bool,
    /// Current filter text
    pub filter_text: String,
}
