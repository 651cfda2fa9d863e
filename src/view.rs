use serde::Serialize;

use crate::fetch::LoadState;
use crate::filter;
use crate::paginate::{self, DEFAULT_PAGE_SIZE, DEFAULT_WINDOW, PageLink};
use crate::record::{Listable, Vertical, eq_fold};
use crate::sort;
use crate::url_state::ListingState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingConfig {
    pub page_size: usize,
    pub window: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            window: DEFAULT_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    Loading,
    Unavailable,
    NoResults,
    Results,
}

/// The derived (filtered, sorted, paged) view of one listing request.
#[derive(Debug, Serialize)]
pub struct ListingView<'a, R> {
    pub vertical: Vertical,
    pub status: ViewStatus,
    /// Request state with the page clamped to the filtered set.
    pub state: ListingState,
    pub total_results: usize,
    pub total_pages: usize,
    pub window: Vec<PageLink>,
    pub items: Vec<&'a R>,
    /// Filter choices drawn from the whole collection.
    pub categories: Vec<String>,
    pub locations: Vec<String>,
}

impl<R> ListingView<'_, R> {
    /// 1-based positions of the first and last item on this page.
    pub fn item_range(&self, page_size: usize) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let first = (self.state.page - 1) * page_size.max(1) + 1;
        Some((first, first + self.items.len() - 1))
    }
}

pub fn build<'a, R: Listable>(
    load: &'a LoadState<R>,
    requested: &ListingState,
    cfg: ListingConfig,
) -> ListingView<'a, R> {
    let records = load.records();
    let mut matched = filter::apply(records, &requested.filter);
    sort::sort_records(&mut matched, requested.sort);

    let page = paginate::paginate(&matched, cfg.page_size, requested.page);
    let window = paginate::page_window(page.number, page.total_pages, cfg.window);
    let state = requested.with_page(page.number);

    let status = match load {
        LoadState::Loading => ViewStatus::Loading,
        LoadState::Failed(_) => ViewStatus::Unavailable,
        LoadState::Ready(_) if page.total_items == 0 => ViewStatus::NoResults,
        LoadState::Ready(_) => ViewStatus::Results,
    };

    tracing::debug!(
        vertical = R::VERTICAL.slug(),
        fetched = records.len(),
        matched = page.total_items,
        page = page.number,
        total_pages = page.total_pages,
        "listing derived"
    );

    ListingView {
        vertical: R::VERTICAL,
        status,
        total_results: page.total_items,
        total_pages: page.total_pages,
        window,
        items: page.items.to_vec(),
        categories: distinct(records.iter().flat_map(|r| r.category_terms())),
        locations: distinct(records.iter().flat_map(|r| {
            let l = r.location();
            [&l.city, &l.district, &l.state]
                .into_iter()
                .filter_map(|v| v.as_deref())
        })),
        state,
    }
}

/// Distinct under the same folding the filters match with, sorted, first
/// spelling kept.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        let v = v.trim();
        if v.is_empty() || out.iter().any(|o| eq_fold(o, v)) {
            continue;
        }
        out.push(v.to_string());
    }
    out.sort_by_key(|s| s.to_lowercase());
    out
}
