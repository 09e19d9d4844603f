use std::io::Error;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

#[derive(Debug)]
pub enum TablyError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl From<Error> for TablyError {
    fn from(err: Error) -> Self {
        TablyError::IoError(err)
    }
}

impl From<PolarsError> for TablyError {
    fn from(err: PolarsError) -> Self {
        TablyError::PolarsError(err)
    }
}

// Everything the controller can ask the model to do. The model decides per
// mode which of these apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Quit,
    CursorUp,
    CursorDown,
    PrevPage,
    NextPage,
    FirstPage,
    LastPage,
    GotoPage(usize),
    ToggleSelect,
    ToggleSelectAll,
    CopyRow,
    Search,
    Help,
    Exit,
    RawKey(KeyEvent),
}

// The configuration surface of the table component. Chainable setters so the
// caller only has to name the props it wants to override.
#[derive(Debug, Clone, Setters)]
pub struct TableConfig {
    pub page_size: usize,
    pub max_visible: usize,
    pub show_first_last: bool,
    pub searchable: bool,
    #[setters(into)]
    pub search_placeholder: String,
    pub pagination: bool,
    pub event_poll_time: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_visible: 5,
            show_first_last: false,
            searchable: false,
            search_placeholder: "Search ...".to_string(),
            pagination: true,
            event_poll_time: 100,
        }
    }
}

pub const HELP_TEXT: &str = "\
 Navigation
   j / Down        move cursor down
   k / Up          move cursor up
   h / Left        previous page
   l / Right       next page
   g / Home        first page
   G / End         last page
   1-9             jump to page

 Selection
   Space           toggle row selection
   a               select / clear all visible rows
   y               copy row to clipboard

 Search
   /               edit the search filter
   Enter           keep the filter
   Esc             cancel edit, or clear the filter

 Other
   ?               toggle this help
   q               quit
";
