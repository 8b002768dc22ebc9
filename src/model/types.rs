//! Core type definitions for the application

/// Which section of the UI is currently focused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ActiveSection {
    #[default]
    Search,
    Results,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Results,
            ActiveSection::Results => ActiveSection::Search,
        }
    }
}

/// Search progress and the message shown instead of the results
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadState {
    pub is_loading: bool,
    pub error_message: Option<String>,
}

/// View-local UI state
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_query: String,
    /// Highlighted row of the results list
    pub results_selected: usize,
    pub show_help_popup: bool,
}
