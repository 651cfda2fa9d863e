use std::cmp::Ordering;

use serde::Serialize;

use crate::record::Listable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Rating descending (unrated last), then name A→Z.
    #[default]
    Rating,
    /// Name A→Z (unnamed last).
    Name,
    /// Fee ascending (unpriced last), then name A→Z.
    Fee,
}

impl SortKey {
    pub fn parse(s: Option<&str>) -> Self {
        match s.map(str::trim).unwrap_or("").to_ascii_lowercase().as_str() {
            "name" | "name_asc" => SortKey::Name,
            "fee" | "fee_asc" | "price" => SortKey::Fee,
            _ => SortKey::Rating,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Rating => "rating",
            SortKey::Name => "name",
            SortKey::Fee => "fee",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Rating => "Top rated",
            SortKey::Name => "Name (A-Z)",
            SortKey::Fee => "Lowest fee",
        }
    }

    pub const ALL: [SortKey; 3] = [SortKey::Rating, SortKey::Name, SortKey::Fee];
}

fn cmp_name<R: Listable>(a: &R, b: &R) -> Ordering {
    match (a.display_name(), b.display_name()) {
        (Some(x), Some(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Present values first; `desc` flips only the order among present values.
fn cmp_opt_f64(a: Option<f64>, b: Option<f64>, desc: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let o = x.total_cmp(&y);
            if desc { o.reverse() } else { o }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn compare<R: Listable>(key: SortKey, a: &R, b: &R) -> Ordering {
    match key {
        SortKey::Rating => cmp_opt_f64(a.rating(), b.rating(), true).then_with(|| cmp_name(a, b)),
        SortKey::Name => cmp_name(a, b),
        SortKey::Fee => cmp_opt_f64(a.fee(), b.fee(), false).then_with(|| cmp_name(a, b)),
    }
}

/// Stable sort: records with equal keys keep their fetch order.
pub fn sort_records<R: Listable>(records: &mut [&R], key: SortKey) {
    records.sort_by(|a, b| compare(key, *a, *b));
}
