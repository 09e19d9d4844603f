use std::collections::HashSet;

use arboard::Clipboard;
use rayon::prelude::*;
use tracing::trace;

use crate::domain::{Message, TableConfig, TablyError};
use crate::inputter::{InputEvent, Inputter};
use crate::loader::Dataset;
use crate::pagination::{PageSlot, Pagination, total_pages};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    SEARCHINPUT,
    HELP,
}

// One row of the current page, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: usize,
    pub cells: Vec<String>,
    pub selected: bool,
}

// Everything the UI needs for one frame. Derived from the model in a single
// pass, so filter, page and selection are always consistent with each other.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub name: String,
    pub headers: Vec<String>,
    pub column_widths: Vec<usize>,
    pub rows: Vec<RowView>,
    pub curser_row: usize,
    pub filtered_count: usize,
    pub selected_count: usize,
    pub summary: String,
    pub page_slots: Vec<PageSlot>,
    pub current_page: usize,
    pub total_pages: usize,
    pub is_first_page: bool,
    pub is_last_page: bool,
    pub show_pagination: bool,
    pub show_first_last: bool,
    pub searchable: bool,
    pub search_active: bool,
    pub search_text: String,
    pub search_curser: usize,
    pub search_placeholder: String,
    pub show_help: bool,
    pub status_message: String,
}

pub struct Model {
    config: TableConfig,
    pub status: Status,
    modus: Modus,
    dataset: Dataset,
    filter_text: String,
    saved_filter: String,
    current_page: usize,
    selected: HashSet<usize>,
    curser_row: usize,
    input: Inputter,
    status_message: String,
}

impl Model {
    pub fn new(dataset: Dataset, config: TableConfig) -> Self {
        let status_message = format!("Loaded {} rows.", dataset.row_count());
        Self {
            config,
            status: Status::READY,
            modus: Modus::TABLE,
            dataset,
            filter_text: String::new(),
            saved_filter: String::new(),
            current_page: 1,
            selected: HashSet::new(),
            curser_row: 0,
            input: Inputter::default(),
            status_message,
        }
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    // The controller forwards raw key events while the search box is active.
    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::SEARCHINPUT
    }

    pub fn update(&mut self, message: Message) -> Result<(), TablyError> {
        trace!("Update: Modus {:?}, Message {:?}", self.modus, message);
        match self.modus {
            Modus::TABLE => match message {
                Message::Quit => self.quit(),
                Message::CursorUp => self.move_curser_up(),
                Message::CursorDown => self.move_curser_down(),
                Message::PrevPage => self.navigate(Pagination::prev),
                Message::NextPage => self.navigate(Pagination::next),
                Message::FirstPage => self.navigate(Pagination::first),
                Message::LastPage => self.navigate(Pagination::last),
                Message::GotoPage(n) => self.set_current_page(n),
                Message::ToggleSelect => self.toggle_select_at_curser(),
                Message::ToggleSelectAll => self.toggle_select_all(),
                Message::CopyRow => self.copy_curser_row(),
                Message::Search => self.enter_search(),
                Message::Help => self.modus = Modus::HELP,
                Message::Exit => self.clear_filter(),
                Message::RawKey(_) => (),
            },
            Modus::SEARCHINPUT => {
                if let Message::RawKey(key) = message {
                    self.search_input(key);
                }
            }
            Modus::HELP => match message {
                Message::Quit => self.quit(),
                Message::Help | Message::Exit => self.modus = Modus::TABLE,
                _ => (),
            },
        }
        Ok(())
    }

    // ---------------------- Table state operations ----------------------- //

    // Replacing the filter always lands on the first page, so a shrinking
    // result set can never leave the current page out of range.
    pub fn set_filter_text(&mut self, text: &str) {
        trace!("Filter changed to \"{text}\"");
        self.filter_text = text.to_string();
        self.current_page = 1;
        self.curser_row = 0;
    }

    pub fn set_current_page(&mut self, n: usize) {
        let page = n.clamp(1, self.page_count().max(1));
        if page != self.current_page {
            self.current_page = page;
            self.curser_row = 0;
        }
    }

    // Selection is keyed by dataset row id and deliberately survives filter
    // changes; ids outside the dataset are ignored.
    pub fn toggle_row_selection(&mut self, id: usize) {
        if id >= self.dataset.row_count() {
            trace!("Ignoring selection toggle for stale row id {id}");
            return;
        }
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    pub fn selection_summary(&self) -> (usize, usize) {
        (self.selected.len(), self.filtered_rows().len())
    }

    // Row ids matching the filter, in dataset order. A row matches if any of
    // its cells contains the filter text, case-insensitively.
    fn filtered_rows(&self) -> Vec<usize> {
        if self.filter_text.is_empty() {
            return (0..self.dataset.row_count()).collect();
        }
        let needle = self.filter_text.to_lowercase();
        (0..self.dataset.row_count())
            .into_par_iter()
            .filter(|&idx| {
                self.dataset
                    .columns()
                    .iter()
                    .any(|c| c.data[idx].to_lowercase().contains(&needle))
            })
            .collect()
    }

    fn effective_page_size(&self) -> usize {
        if self.config.pagination {
            self.config.page_size
        } else {
            usize::MAX
        }
    }

    fn page_count(&self) -> usize {
        total_pages(self.filtered_rows().len(), self.effective_page_size())
    }

    // The pagination control for the current filtered set; navigation goes
    // through it so the guarded prev/next semantics live in one place.
    fn pagination(&self) -> Pagination {
        Pagination::new(self.page_count())
            .current_page(self.current_page)
            .max_visible(self.config.max_visible)
            .show_first_last(self.config.show_first_last)
    }

    fn navigate(&mut self, step: fn(&mut Pagination)) {
        let mut pagination = self.pagination();
        step(&mut pagination);
        self.set_current_page(pagination.current_page);
    }

    fn page_slice<'a>(&self, filtered: &'a [usize]) -> &'a [usize] {
        let size = self.effective_page_size();
        let start = (self.current_page - 1)
            .saturating_mul(size)
            .min(filtered.len());
        let end = start.saturating_add(size).min(filtered.len());
        &filtered[start..end]
    }

    // ------------------------- Derived rendering ------------------------- //

    pub fn view(&self) -> TableView {
        let filtered = self.filtered_rows();
        let page_rows = self.page_slice(&filtered);

        let rows: Vec<RowView> = page_rows
            .iter()
            .map(|&id| RowView {
                id,
                cells: self.dataset.row(id),
                selected: self.selected.contains(&id),
            })
            .collect();
        let curser_row = self.curser_row.min(rows.len().saturating_sub(1));

        let pagination = self.pagination();
        let (selected_count, filtered_count) = self.selection_summary();

        let name = if self.filter_text.is_empty() {
            self.dataset.name().to_string()
        } else {
            format!("F[{}]", self.dataset.name())
        };

        TableView {
            name,
            headers: self.dataset.headers(),
            column_widths: self.dataset.column_widths(),
            rows,
            curser_row,
            filtered_count,
            selected_count,
            summary: format!("{selected_count} of {filtered_count} row(s) selected"),
            page_slots: pagination.slots(),
            current_page: pagination.current_page,
            total_pages: pagination.total_pages,
            is_first_page: pagination.is_first(),
            is_last_page: pagination.is_last(),
            show_pagination: self.config.pagination,
            show_first_last: pagination.show_first_last,
            searchable: self.config.searchable,
            search_active: self.modus == Modus::SEARCHINPUT,
            search_text: if self.modus == Modus::SEARCHINPUT {
                self.input.value().to_string()
            } else {
                self.filter_text.clone()
            },
            search_curser: self.input.curser(),
            search_placeholder: self.config.search_placeholder.clone(),
            show_help: self.modus == Modus::HELP,
            status_message: self.status_message.clone(),
        }
    }

    // -------------------- Control handling functions --------------------- //

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn move_curser_up(&mut self) {
        self.curser_row = self.curser_row.saturating_sub(1);
    }

    fn move_curser_down(&mut self) {
        let page_len = self.page_slice(&self.filtered_rows()).len();
        if self.curser_row + 1 < page_len {
            self.curser_row += 1;
        }
    }

    fn toggle_select_at_curser(&mut self) {
        let filtered = self.filtered_rows();
        let page = self.page_slice(&filtered);
        if let Some(&id) = page.get(self.curser_row.min(page.len().saturating_sub(1))) {
            self.toggle_row_selection(id);
        }
    }

    // Select every row matching the current filter, or clear them all if they
    // are already selected. Rows hidden by the filter keep their selection.
    fn toggle_select_all(&mut self) {
        let filtered = self.filtered_rows();
        if filtered.is_empty() {
            return;
        }
        if filtered.iter().all(|id| self.selected.contains(id)) {
            for id in &filtered {
                self.selected.remove(id);
            }
            self.set_status_message("Cleared selection.");
        } else {
            let count = filtered.len();
            self.selected.extend(filtered);
            self.set_status_message(format!("Selected {count} rows."));
        }
    }

    fn clear_filter(&mut self) {
        if !self.filter_text.is_empty() {
            self.set_filter_text("");
            self.input.clear();
            self.set_status_message("Filter cleared.");
        }
    }

    fn enter_search(&mut self) {
        if !self.config.searchable {
            self.set_status_message("Search is disabled!");
            return;
        }
        trace!("Entering search input ...");
        self.saved_filter = self.filter_text.clone();
        self.input.set(&self.filter_text);
        self.modus = Modus::SEARCHINPUT;
    }

    fn search_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        match self.input.read(key) {
            InputEvent::Edited => {
                let text = self.input.value().to_string();
                self.set_filter_text(&text);
                let matches = self.filtered_rows().len();
                if matches == 0 {
                    self.set_status_message("Found no matches!");
                } else {
                    self.set_status_message(format!("Found {matches} matching rows"));
                }
            }
            InputEvent::Submitted => {
                self.modus = Modus::TABLE;
            }
            InputEvent::Cancelled => {
                let previous = std::mem::take(&mut self.saved_filter);
                self.input.set(&previous);
                self.set_filter_text(&previous);
                self.modus = Modus::TABLE;
                self.set_status_message("Search cancelled.");
            }
            InputEvent::Ignored => (),
        }
    }

    fn copy_curser_row(&mut self) {
        let filtered = self.filtered_rows();
        let page = self.page_slice(&filtered);
        let Some(&id) = page.get(self.curser_row.min(page.len().saturating_sub(1))) else {
            self.set_status_message("Nothing to copy!");
            return;
        };

        let content = self
            .dataset
            .row(id)
            .iter()
            .map(|c| Self::wrap_cell_content(c))
            .collect::<Vec<String>>()
            .join(",");

        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(content)) {
            Ok(()) => self.set_status_message("Copied row to clipboard."),
            Err(e) => {
                trace!("Error copying to clipboard: {:?}", e);
                self.set_status_message("Clipboard is not available!");
            }
        }
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.chars().any(|c| c == '"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace("\"", "\"\"");
        }
        if needs_wrapping {
            out = format!("\"{out}\"");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Column;
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn people() -> Dataset {
        Dataset::from_columns(
            "people.csv",
            vec![
                Column::new(
                    "name",
                    vec![
                        "John Doe".to_string(),
                        "Jane Smith".to_string(),
                        "Bob Johnson".to_string(),
                    ],
                ),
                Column::new(
                    "email",
                    vec![
                        "john@example.com".to_string(),
                        "jane@example.com".to_string(),
                        "bob@example.com".to_string(),
                    ],
                ),
            ],
        )
    }

    fn users(n: usize) -> Dataset {
        Dataset::from_columns(
            "users.csv",
            vec![
                Column::new("name", (0..n).map(|i| format!("User {i}")).collect()),
                Column::new(
                    "email",
                    (0..n).map(|i| format!("user{i}@example.com")).collect(),
                ),
            ],
        )
    }

    fn raw(code: KeyCode) -> Message {
        Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn mount_state_shows_single_page_and_empty_selection() {
        let model = Model::new(people(), TableConfig::default());
        let view = model.view();
        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.current_page, 1);
        assert_eq!(view.total_pages, 1);
        assert!(view.is_first_page && view.is_last_page);
        assert_eq!(view.page_slots, vec![PageSlot::Page(1)]);
        assert_eq!(view.summary, "0 of 3 row(s) selected");
        assert!(!view.searchable);
    }

    #[test]
    fn set_current_page_clamps_into_valid_range() {
        let mut model = Model::new(users(50), TableConfig::default());
        model.set_current_page(0);
        assert_eq!(model.view().current_page, 1);
        model.set_current_page(99);
        assert_eq!(model.view().current_page, 5);
        model.set_current_page(3);
        assert_eq!(model.view().current_page, 3);
    }

    #[test]
    fn setting_the_same_page_is_a_noop() {
        let mut model = Model::new(users(50), TableConfig::default());
        model.set_current_page(3);
        let before = model.view();
        model.set_current_page(3);
        assert_eq!(model.view(), before);
    }

    #[test]
    fn filter_change_resets_to_first_page() {
        let mut model = Model::new(users(50), TableConfig::default());
        model.set_current_page(4);
        model.set_filter_text("user");
        let view = model.view();
        assert_eq!(view.current_page, 1);
        assert_eq!(view.filtered_count, 50);
    }

    #[test]
    fn filter_matches_any_column_case_insensitively() {
        let mut model = Model::new(people(), TableConfig::default());
        model.set_filter_text("JANE");
        assert_eq!(model.view().filtered_count, 1);
        model.set_filter_text("example.COM");
        assert_eq!(model.view().filtered_count, 3);
        model.set_filter_text("");
        assert_eq!(model.view().filtered_count, 3);
    }

    #[test]
    fn empty_result_is_a_valid_state() {
        let mut model = Model::new(users(50), TableConfig::default());
        model.set_current_page(5);
        model.set_filter_text("does-not-match-anything");
        let view = model.view();
        assert!(view.rows.is_empty());
        assert_eq!(view.current_page, 1);
        assert_eq!(view.total_pages, 0);
        assert!(view.page_slots.is_empty());
        assert!(view.is_first_page && view.is_last_page);
        assert_eq!(view.summary, "0 of 0 row(s) selected");
    }

    #[test]
    fn toggle_row_selection_is_its_own_inverse() {
        let mut model = Model::new(people(), TableConfig::default());
        model.toggle_row_selection(1);
        assert_eq!(model.selection_summary(), (1, 3));
        model.toggle_row_selection(1);
        assert_eq!(model.selection_summary(), (0, 3));
    }

    #[test]
    fn stale_row_ids_are_ignored() {
        let mut model = Model::new(people(), TableConfig::default());
        model.toggle_row_selection(99);
        assert_eq!(model.selection_summary(), (0, 3));
    }

    #[test]
    fn selection_survives_filtering_out_the_row() {
        let mut model = Model::new(people(), TableConfig::default());
        model.toggle_row_selection(1); // Jane Smith
        model.set_filter_text("bob");
        assert_eq!(model.selection_summary(), (1, 1));
        let view = model.view();
        assert_eq!(view.summary, "1 of 1 row(s) selected");
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].id, 2);
        assert!(!view.rows[0].selected);
        // Dropping the filter brings the selected row back into view.
        model.set_filter_text("");
        assert!(model.view().rows[1].selected);
    }

    #[test]
    fn pages_slice_the_filtered_rows_in_order() {
        let mut model = Model::new(users(50), TableConfig::default());
        let ids: Vec<usize> = model.view().rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
        model.set_current_page(2);
        let ids: Vec<usize> = model.view().rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, (10..20).collect::<Vec<_>>());
        model.set_current_page(5);
        let view = model.view();
        assert_eq!(view.rows.first().map(|r| r.id), Some(40));
        assert!(view.is_last_page);
    }

    #[test]
    fn page_window_is_rendered_from_the_filtered_count() {
        let mut model = Model::new(users(100), TableConfig::default());
        let view = model.view();
        assert_eq!(view.total_pages, 10);
        assert!(view.is_first_page && !view.is_last_page);
        assert_eq!(
            view.page_slots,
            vec![
                PageSlot::Page(1),
                PageSlot::Page(2),
                PageSlot::Page(3),
                PageSlot::Page(4),
                PageSlot::Ellipsis,
                PageSlot::Page(10),
            ]
        );

        model.set_current_page(5);
        let slots = model.view().page_slots;
        assert_eq!(slots.iter().filter(|s| **s == PageSlot::Ellipsis).count(), 2);

        model.set_current_page(10);
        let view = model.view();
        assert!(!view.is_first_page && view.is_last_page);
    }

    #[test]
    fn navigation_messages_are_clamped_at_the_boundaries() {
        let mut model = Model::new(users(30), TableConfig::default());
        model.update(Message::PrevPage).unwrap();
        assert_eq!(model.view().current_page, 1);
        model.update(Message::NextPage).unwrap();
        assert_eq!(model.view().current_page, 2);
        model.update(Message::LastPage).unwrap();
        assert_eq!(model.view().current_page, 3);
        model.update(Message::NextPage).unwrap();
        assert_eq!(model.view().current_page, 3);
        model.update(Message::GotoPage(9)).unwrap();
        assert_eq!(model.view().current_page, 3);
        model.update(Message::FirstPage).unwrap();
        assert_eq!(model.view().current_page, 1);
    }

    #[test]
    fn curser_drives_selection_toggling() {
        let mut model = Model::new(people(), TableConfig::default());
        model.update(Message::CursorDown).unwrap();
        model.update(Message::ToggleSelect).unwrap();
        let view = model.view();
        assert_eq!(view.curser_row, 1);
        assert!(view.rows[1].selected);
        assert_eq!(view.summary, "1 of 3 row(s) selected");
        // Toggling again at the same spot deselects.
        model.update(Message::ToggleSelect).unwrap();
        assert_eq!(model.selection_summary(), (0, 3));
    }

    #[test]
    fn curser_stays_inside_the_page() {
        let mut model = Model::new(people(), TableConfig::default());
        model.update(Message::CursorUp).unwrap();
        assert_eq!(model.view().curser_row, 0);
        for _ in 0..10 {
            model.update(Message::CursorDown).unwrap();
        }
        assert_eq!(model.view().curser_row, 2);
    }

    #[test]
    fn select_all_toggles_the_filtered_set() {
        let mut model = Model::new(people(), TableConfig::default());
        model.update(Message::ToggleSelectAll).unwrap();
        assert_eq!(model.selection_summary(), (3, 3));
        model.update(Message::ToggleSelectAll).unwrap();
        assert_eq!(model.selection_summary(), (0, 3));

        // With a filter, only visible rows are affected.
        model.toggle_row_selection(0);
        model.set_filter_text("bob");
        model.update(Message::ToggleSelectAll).unwrap();
        assert_eq!(model.selection_summary(), (2, 1));
    }

    #[test]
    fn search_input_filters_while_typing() {
        let config = TableConfig::default().searchable(true);
        let mut model = Model::new(people(), config);
        model.update(Message::Search).unwrap();
        assert!(model.raw_keyevents());

        for chr in "bob".chars() {
            model.update(raw(KeyCode::Char(chr))).unwrap();
        }
        let view = model.view();
        assert!(view.search_active);
        assert_eq!(view.search_text, "bob");
        assert_eq!(view.filtered_count, 1);
        assert_eq!(view.rows[0].cells[0], "Bob Johnson");

        model.update(raw(KeyCode::Enter)).unwrap();
        assert!(!model.raw_keyevents());
        assert_eq!(model.view().filtered_count, 1);
    }

    #[test]
    fn cancelled_search_restores_the_previous_filter() {
        let config = TableConfig::default().searchable(true);
        let mut model = Model::new(people(), config);
        model.set_filter_text("jane");
        model.update(Message::Search).unwrap();
        model.update(raw(KeyCode::Char('x'))).unwrap();
        assert_eq!(model.view().filtered_count, 0);
        model.update(raw(KeyCode::Esc)).unwrap();
        assert!(!model.raw_keyevents());
        let view = model.view();
        assert_eq!(view.search_text, "jane");
        assert_eq!(view.filtered_count, 1);
    }

    #[test]
    fn search_requires_the_searchable_flag() {
        let mut model = Model::new(people(), TableConfig::default());
        model.update(Message::Search).unwrap();
        assert!(!model.raw_keyevents());
    }

    #[test]
    fn escape_clears_an_active_filter() {
        let mut model = Model::new(people(), TableConfig::default());
        model.set_filter_text("bob");
        assert_eq!(model.view().filtered_count, 1);
        model.update(Message::Exit).unwrap();
        assert_eq!(model.view().filtered_count, 3);
    }

    #[test]
    fn help_modus_blocks_table_messages() {
        let mut model = Model::new(users(30), TableConfig::default());
        model.update(Message::Help).unwrap();
        assert!(model.view().show_help);
        model.update(Message::NextPage).unwrap();
        assert_eq!(model.view().current_page, 1);
        model.update(Message::Exit).unwrap();
        assert!(!model.view().show_help);
    }

    #[test]
    fn quit_message_ends_the_session() {
        let mut model = Model::new(people(), TableConfig::default());
        model.update(Message::Quit).unwrap();
        assert_eq!(model.status, Status::QUITTING);
    }

    #[test]
    fn disabled_pagination_shows_every_filtered_row() {
        let config = TableConfig::default().pagination(false);
        let mut model = Model::new(users(50), config);
        let view = model.view();
        assert_eq!(view.rows.len(), 50);
        assert_eq!(view.total_pages, 1);
        assert!(!view.show_pagination);
        model.set_current_page(9);
        assert_eq!(model.view().current_page, 1);
    }

    #[test]
    fn filtered_table_is_marked_in_the_title() {
        let mut model = Model::new(people(), TableConfig::default());
        assert_eq!(model.view().name, "people.csv");
        model.set_filter_text("jane");
        assert_eq!(model.view().name, "F[people.csv]");
    }

    #[test]
    fn cell_content_is_wrapped_for_csv() {
        assert_eq!(Model::wrap_cell_content("plain"), "plain");
        assert_eq!(Model::wrap_cell_content("a,b"), "\"a,b\"");
        assert_eq!(Model::wrap_cell_content("John Doe"), "\"John Doe\"");
        assert_eq!(Model::wrap_cell_content("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
