//! Query-string form of a listing's filter, sort and page state.
//!
//! Recognized keys are `q`, the vertical's category key, `location`, `sort` and
//! `page`. Anything else is ignored. Serialization drops empty and default
//! values so equivalent searches share one canonical URL.

use serde::Serialize;

use crate::filter::{FilterState, normalize};
use crate::record::Vertical;
use crate::sort::SortKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingState {
    pub filter: FilterState,
    pub sort: SortKey,
    /// Requested page, 1-indexed. Clamped later against the filtered set.
    pub page: usize,
}

impl Default for ListingState {
    fn default() -> Self {
        Self::new(FilterState::default())
    }
}

impl ListingState {
    pub fn new(filter: FilterState) -> Self {
        Self {
            filter,
            sort: SortKey::default(),
            page: 1,
        }
    }

    pub fn with_page(&self, page: usize) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }
}

pub fn parse(vertical: Vertical, query: Option<&str>) -> ListingState {
    let pairs: Vec<(String, String)> = match query {
        Some(q) => serde_urlencoded::from_str(q.trim_start_matches('?')).unwrap_or_else(|e| {
            tracing::debug!("ignoring malformed query string: {e}");
            Vec::new()
        }),
        None => Vec::new(),
    };
    let first = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    let filter = FilterState::new(first("q"), first(vertical.category_param()), first("location"));
    let page = first("page")
        .and_then(|p| p.trim().parse::<usize>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);

    ListingState {
        filter,
        sort: SortKey::parse(first("sort")),
        page,
    }
}

/// Canonical query string (without the leading `?`). Empty for the default state.
pub fn serialize(vertical: Vertical, state: &ListingState) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::new();
    if let Some(q) = normalize(state.filter.query.as_deref()) {
        pairs.push(("q", q));
    }
    if let Some(c) = normalize(state.filter.category.as_deref()) {
        pairs.push((vertical.category_param(), c));
    }
    if let Some(l) = normalize(state.filter.location.as_deref()) {
        pairs.push(("location", l));
    }
    if state.sort != SortKey::default() {
        pairs.push(("sort", state.sort.as_str().to_string()));
    }
    if state.page > 1 {
        pairs.push(("page", state.page.to_string()));
    }
    serde_urlencoded::to_string(&pairs).unwrap_or_default()
}

pub fn href(vertical: Vertical, state: &ListingState) -> String {
    let qs = serialize(vertical, state);
    if qs.is_empty() {
        format!("/{}", vertical.slug())
    } else {
        format!("/{}?{}", vertical.slug(), qs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn parses_query_and_page() {
        let state = parse(Vertical::Doctors, Some("q=knee&page=2"));
        assert_eq!(state.filter, FilterState::new(Some("knee"), None, None));
        assert_eq!(state.page, 2);
        assert_eq!(state.sort, SortKey::Rating);
    }

    #[test]
    fn category_key_depends_on_vertical() {
        let qs = Some("specialty=ENT&test=CBC&service=Ambulance&category=Multi");
        assert_eq!(parse(Vertical::Doctors, qs).filter.category.as_deref(), Some("ENT"));
        assert_eq!(parse(Vertical::Labs, qs).filter.category.as_deref(), Some("CBC"));
        assert_eq!(parse(Vertical::Emergency, qs).filter.category.as_deref(), Some("Ambulance"));
        assert_eq!(parse(Vertical::Hospitals, qs).filter.category.as_deref(), Some("Multi"));
    }

    #[test]
    fn invalid_page_defaults_to_one() {
        for qs in ["page=abc", "page=0", "page=-3", "page=", "page=1.5"] {
            assert_eq!(parse(Vertical::Labs, Some(qs)).page, 1, "{qs}");
        }
    }

    #[test]
    fn unknown_keys_and_garbage_are_ignored() {
        let state = parse(Vertical::Salons, Some("utm_source=x&q=%20&location=Goa"));
        assert_eq!(state.filter, FilterState::new(None, None, Some("Goa")));
        assert_eq!(parse(Vertical::Salons, Some("%%%")), ListingState::new(FilterState::default()));
        assert_eq!(parse(Vertical::Salons, None).page, 1);
    }

    #[test]
    fn default_state_serializes_to_bare_path() {
        let state = ListingState::new(FilterState::default());
        assert_eq!(serialize(Vertical::Hospitals, &state), "");
        assert_eq!(href(Vertical::Hospitals, &state), "/hospitals");
    }

    #[test]
    fn serialization_omits_defaults_and_encodes_values() {
        let state = ListingState {
            filter: FilterState::new(Some("knee & hip"), Some("Orthopedic"), None),
            sort: SortKey::Name,
            page: 3,
        };
        assert_eq!(
            href(Vertical::Doctors, &state),
            "/doctors?q=knee+%26+hip&specialty=Orthopedic&sort=name&page=3"
        );
        assert_eq!(
            serialize(
                Vertical::Doctors,
                &ListingState {
                    sort: SortKey::Rating,
                    page: 1,
                    ..state.clone()
                }
            ),
            "q=knee+%26+hip&specialty=Orthopedic"
        );
    }

    fn arb_value() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[ a-zA-Z0-9&=+%?#/é]{0,16}")
    }

    proptest! {
        #[test]
        fn serialize_then_parse_round_trips(
            q in arb_value(),
            c in arb_value(),
            l in arb_value(),
            sort in prop_oneof![Just(SortKey::Rating), Just(SortKey::Name), Just(SortKey::Fee)],
            page in 1usize..500,
            v in 0usize..5,
        ) {
            let vertical = Vertical::ALL[v];
            let state = ListingState {
                filter: FilterState::new(q.as_deref(), c.as_deref(), l.as_deref()),
                sort,
                page,
            };
            let qs = serialize(vertical, &state);
            prop_assert_eq!(parse(vertical, Some(&qs)), state);
        }
    }
}
