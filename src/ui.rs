use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Row, Table, TableState},
};

use crate::domain::HELP_TEXT;
use crate::model::TableView;
use crate::pagination::PageSlot;

pub const SEARCH_HEIGHT: u16 = 3;
pub const FOOTER_HEIGHT: u16 = 1;
pub const STATUS_HEIGHT: u16 = 1;

// Columns wider than this are cut off by the table widget.
const MAX_COLUMN_WIDTH: usize = 40;
const SELECT_MARKER_WIDTH: u16 = 3;

pub fn draw(view: &TableView, frame: &mut Frame) {
    let search_height = if view.searchable { SEARCH_HEIGHT } else { 0 };
    let [search_area, table_area, footer_area, status_area] = Layout::vertical([
        Constraint::Length(search_height),
        Constraint::Min(3),
        Constraint::Length(FOOTER_HEIGHT),
        Constraint::Length(STATUS_HEIGHT),
    ])
    .areas(frame.area());

    if view.searchable {
        draw_search(view, frame, search_area);
    }
    draw_table(view, frame, table_area);
    draw_footer(view, frame, footer_area);
    draw_status(view, frame, status_area);
    if view.show_help {
        draw_help(frame);
    }
}

fn draw_search(view: &TableView, frame: &mut Frame, area: Rect) {
    let block = Block::bordered().title(" Search ");
    let content = if view.search_text.is_empty() {
        Line::from(view.search_placeholder.clone().dim())
    } else {
        Line::from(view.search_text.clone())
    };
    frame.render_widget(Paragraph::new(content).block(block), area);

    if view.search_active {
        let x = (area.x + 1 + view.search_curser as u16).min(area.right().saturating_sub(2));
        frame.set_cursor_position(Position::new(x, area.y + 1));
    }
}

fn draw_table(view: &TableView, frame: &mut Frame, area: Rect) {
    let title = Line::from(format!(" {} ", view.name).bold());
    let instructions = Line::from(vec![
        " Search ".into(),
        "</>".blue().bold(),
        " Select ".into(),
        "<Space>".blue().bold(),
        " Help ".into(),
        "<?>".blue().bold(),
        " Quit ".into(),
        "<Q> ".blue().bold(),
    ]);
    let block = Block::bordered()
        .title(title.centered())
        .title_bottom(instructions.centered())
        .border_set(border::THICK);

    if view.rows.is_empty() {
        frame.render_widget(Paragraph::new("No results.").centered().block(block), area);
        return;
    }

    // Selection marker and 1-based data row index in front of the data cells.
    let index_width = view
        .rows
        .iter()
        .map(|row| (row.id + 1).to_string().len())
        .max()
        .unwrap_or(1);
    let header = Row::new(
        [String::new(), "#".to_string()]
            .into_iter()
            .chain(view.headers.iter().cloned()),
    )
    .style(Style::new().bold());
    let rows = view.rows.iter().map(|row| {
        let marker = if row.selected { "[x]" } else { "[ ]" };
        Row::new(
            [marker.to_string(), (row.id + 1).to_string()]
                .into_iter()
                .chain(row.cells.iter().cloned()),
        )
    });
    let widths = [
        Constraint::Length(SELECT_MARKER_WIDTH),
        Constraint::Length(index_width as u16),
    ]
    .into_iter()
    .chain(
        view.column_widths
            .iter()
            .map(|w| Constraint::Length((*w).min(MAX_COLUMN_WIDTH) as u16)),
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::new().reversed())
        .column_spacing(1);

    let mut state = TableState::default().with_selected(Some(view.curser_row));
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_footer(view: &TableView, frame: &mut Frame, area: Rect) {
    let [summary_area, pagination_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Fill(2)]).areas(area);
    let summary = if view.selected_count > 0 {
        view.summary.clone().bold()
    } else {
        view.summary.clone().dim()
    };
    frame.render_widget(Paragraph::new(Line::from(summary)), summary_area);
    if view.show_pagination {
        frame.render_widget(
            Paragraph::new(pagination_line(view).right_aligned()),
            pagination_area,
        );
    }
}

// The pagination control: first/prev/next/last plus one span per page slot.
// Controls that would leave [1, total_pages] are dimmed out.
fn pagination_line(view: &TableView) -> Line<'_> {
    let mut spans: Vec<Span> = Vec::new();

    if view.show_first_last {
        spans.push(nav_span("« First", view.is_first_page));
        spans.push(" ".into());
    }
    spans.push(nav_span("‹ Prev", view.is_first_page));
    for slot in &view.page_slots {
        match slot {
            PageSlot::Page(page) if *page == view.current_page => {
                spans.push(format!(" {page} ").bold().reversed());
            }
            PageSlot::Page(page) => spans.push(format!(" {page} ").into()),
            PageSlot::Ellipsis => spans.push(" … ".dark_gray()),
        }
    }
    spans.push(nav_span("Next ›", view.is_last_page));
    if view.show_first_last {
        spans.push(" ".into());
        spans.push(nav_span("Last »", view.is_last_page));
    }

    Line::from(spans)
}

fn nav_span(label: &str, disabled: bool) -> Span<'_> {
    if disabled {
        label.dark_gray()
    } else {
        label.blue()
    }
}

fn draw_status(view: &TableView, frame: &mut Frame, area: Rect) {
    let [message_area, page_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(24)]).areas(area);
    frame.render_widget(
        Paragraph::new(Line::from(view.status_message.clone().yellow())),
        message_area,
    );
    let indicator = format!(
        "{} rows  Page {}/{}",
        view.filtered_count,
        view.current_page,
        view.total_pages.max(1)
    );
    frame.render_widget(
        Paragraph::new(Line::from(indicator.dim()).right_aligned()),
        page_area,
    );
}

fn draw_help(frame: &mut Frame) {
    let area = popup_area(frame.area(), 46, 26);
    frame.render_widget(Clear, area);
    let block = Block::bordered()
        .title(Line::from(" Help ".bold()).centered())
        .border_set(border::THICK);
    frame.render_widget(Paragraph::new(HELP_TEXT).block(block), area);
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
