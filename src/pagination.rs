use derive_setters::Setters;

pub const DEFAULT_MAX_VISIBLE: usize = 5;

/// One slot of the pagination control. `Page` slots are actionable,
/// `Ellipsis` only marks a truncated run of pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    Page(usize),
    Ellipsis,
}

// Number of pages needed to show `item_count` items.
pub fn total_pages(item_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        item_count.div_ceil(page_size)
    }
}

// Compute the slot sequence for a pagination control: page 1 and the last
// page are always shown, with a fixed-width window of pages around
// `current_page` in between. The window is shifted at the boundaries, never
// shrunk, so the number of numeric slots is the same for every page.
//
// `current_page` is not clamped here; an out-of-range value only shifts the
// window to the nearest valid position.
pub fn page_window(current_page: usize, total_pages: usize, max_visible: usize) -> Vec<PageSlot> {
    let max_visible = max_visible.max(1);
    if total_pages == 0 {
        return Vec::new();
    }
    if total_pages <= max_visible {
        return (1..=total_pages).map(PageSlot::Page).collect();
    }

    // Inner window between the two boundary slots, ideally centered on the
    // current page, shifted back into [2, total_pages - 1] when it sticks out.
    let inner = max_visible.saturating_sub(2).max(1) as isize;
    let lo = 2;
    let hi = total_pages as isize - 1;

    let mut slots = Vec::with_capacity(max_visible + 2);
    slots.push(PageSlot::Page(1));
    if hi >= lo {
        let start = (current_page as isize - (inner - 1) / 2)
            .min(hi - inner + 1)
            .max(lo);
        let end = start + inner - 1;
        if start > lo {
            slots.push(PageSlot::Ellipsis);
        }
        for page in start..=end {
            slots.push(PageSlot::Page(page as usize));
        }
        if end < hi {
            slots.push(PageSlot::Ellipsis);
        }
    }
    slots.push(PageSlot::Page(total_pages));
    slots
}

// The standalone pagination control: the slot window above plus guarded
// navigation. Previous/next are no-ops at the boundaries, which is what the
// UI uses to disable those controls.
#[derive(Debug, Clone, PartialEq, Setters)]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub max_visible: usize,
    pub show_first_last: bool,
}

impl Pagination {
    pub fn new(total_pages: usize) -> Self {
        Self {
            current_page: 1,
            total_pages,
            max_visible: DEFAULT_MAX_VISIBLE,
            show_first_last: false,
        }
    }

    pub fn slots(&self) -> Vec<PageSlot> {
        page_window(self.current_page, self.total_pages, self.max_visible)
    }

    // Out-of-range requests are clamped, never rejected.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.total_pages.max(1));
    }

    pub fn next(&mut self) {
        if !self.is_last() {
            self.current_page += 1;
        }
    }

    pub fn prev(&mut self) {
        if !self.is_first() {
            self.current_page -= 1;
        }
    }

    pub fn first(&mut self) {
        self.current_page = 1;
    }

    pub fn last(&mut self) {
        self.current_page = self.total_pages.max(1);
    }

    pub fn is_first(&self) -> bool {
        self.current_page <= 1
    }

    pub fn is_last(&self) -> bool {
        self.current_page >= self.total_pages
    }
}
