use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_WINDOW: usize = 5;

/// One page of an ordered sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Clamped into `[1, max(total_pages, 1)]`.
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slot in the page-number control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "page", rename_all = "snake_case")]
pub enum PageLink {
    Number(usize),
    Gap,
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1))
}

pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}

pub fn paginate<T>(items: &[T], page_size: usize, requested: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let number = clamp_page(requested, total_pages);
    let start = ((number - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());
    Page {
        items: &items[start..end],
        number,
        total_pages,
        total_items: items.len(),
    }
}

/// Page buttons: at most `width` numbers centered on `current`, plus a leading
/// `1 …` and trailing `… last` when the window does not reach either end.
/// Empty when there are no pages.
pub fn page_window(current: usize, total_pages: usize, width: usize) -> Vec<PageLink> {
    if total_pages == 0 {
        return Vec::new();
    }
    let width = width.clamp(1, total_pages);
    let current = clamp_page(current, total_pages);

    let mut start = current.saturating_sub(width / 2).max(1);
    let mut end = start + width - 1;
    if end > total_pages {
        end = total_pages;
        start = end + 1 - width;
    }

    let mut out = Vec::with_capacity(width + 4);
    if start > 1 {
        out.push(PageLink::Number(1));
        if start > 2 {
            out.push(PageLink::Gap);
        }
    }
    out.extend((start..=end).map(PageLink::Number));
    if end < total_pages {
        if end + 1 < total_pages {
            out.push(PageLink::Gap);
        }
        out.push(PageLink::Number(total_pages));
    }
    out
}
