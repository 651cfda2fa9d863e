use serde::Serialize;

use crate::record::{Listable, eq_fold};

/// Active search constraints. `None` means the key applies no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub query: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
}

impl FilterState {
    /// Builds a state with blank values dropped and the rest trimmed.
    pub fn new(
        query: Option<&str>,
        category: Option<&str>,
        location: Option<&str>,
    ) -> Self {
        Self {
            query: normalize(query),
            category: normalize(category),
            location: normalize(location),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.category.is_none() && self.location.is_none()
    }
}

pub fn normalize(v: Option<&str>) -> Option<String> {
    v.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Substring match of the query against the display name or category label.
pub fn matches_query<R: Listable>(record: &R, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    [record.display_name(), record.category()]
        .into_iter()
        .flatten()
        .any(|hay| hay.to_lowercase().contains(&needle))
}

pub fn matches_category<R: Listable>(record: &R, category: &str) -> bool {
    if category.trim().is_empty() {
        return true;
    }
    record
        .category_terms()
        .into_iter()
        .any(|term| eq_fold(term, category))
}

pub fn matches_location<R: Listable>(record: &R, location: &str) -> bool {
    if location.trim().is_empty() {
        return true;
    }
    record.location().matches(location)
}

/// All active constraints combined with AND.
pub fn matches<R: Listable>(record: &R, filter: &FilterState) -> bool {
    filter
        .query
        .as_deref()
        .is_none_or(|q| matches_query(record, q))
        && filter
            .category
            .as_deref()
            .is_none_or(|c| matches_category(record, c))
        && filter
            .location
            .as_deref()
            .is_none_or(|l| matches_location(record, l))
}

/// Records passing `filter`, in their original order.
pub fn apply<'a, R: Listable>(records: &'a [R], filter: &FilterState) -> Vec<&'a R> {
    records.iter().filter(|r| r.matches(filter)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Document;
    use crate::verticals::doctor::Doctor;
    use crate::verticals::lab::Lab;
    use proptest::prelude::*;
    use serde_json::json;

    fn doctor(id: &str, name: &str, specialty: &str, city: &str) -> Doctor {
        Doctor::from_document(&Document::new(
            id,
            json!({"name": name, "specialty": specialty, "city": city}),
        ))
        .unwrap()
    }

    fn sample() -> Vec<Doctor> {
        vec![
            doctor("1", "Dr. Cardio Singh", "Cardiologist", "Delhi"),
            doctor("2", "Dr. Jane Doe", "Dermatologist", "Mumbai"),
            doctor("3", "Dr. Heart Rao", "Cardiologist", "Mumbai"),
        ]
    }

    fn ids(v: &[&Doctor]) -> Vec<String> {
        v.iter().map(|d| d.id().to_string()).collect()
    }

    #[test]
    fn query_matches_name_case_insensitively() {
        let records = sample();
        let filter = FilterState::new(Some("cardio"), None, None);
        let out = apply(&records, &filter);
        // "Cardiologist" also contains "cardio", so Dr. Heart Rao passes on category
        assert_eq!(ids(&out), vec!["1", "3"]);
    }

    #[test]
    fn query_scenario_two_records() {
        let records = vec![
            doctor("a", "Dr. Cardio Singh", "Cardiologist", "Delhi"),
            doctor("b", "Dr. Jane Doe", "Dermatologist", "Delhi"),
        ];
        let out = apply(&records, &FilterState::new(Some("cardio"), None, None));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].display_name(), Some("Dr. Cardio Singh"));
    }

    #[test]
    fn constraints_are_anded() {
        let records = sample();
        let filter = FilterState::new(None, Some("cardiologist"), Some("MUMBAI"));
        assert_eq!(ids(&apply(&records, &filter)), vec!["3"]);
    }

    #[test]
    fn category_is_exact_not_substring() {
        let records = sample();
        let filter = FilterState::new(None, Some("Cardio"), None);
        assert!(apply(&records, &filter).is_empty());
    }

    #[test]
    fn blank_values_apply_no_constraint() {
        let filter = FilterState::new(Some("  "), Some(""), None);
        assert!(filter.is_empty());
        assert_eq!(apply(&sample(), &filter).len(), 3);
    }

    #[test]
    fn missing_fields_do_not_match_constraints_on_them() {
        let bare = Doctor::from_document(&Document::new("x", json!({}))).unwrap();
        assert!(bare.matches(&FilterState::default()));
        assert!(!bare.matches(&FilterState::new(Some("a"), None, None)));
        assert!(!bare.matches(&FilterState::new(None, Some("ENT"), None)));
        assert!(!bare.matches(&FilterState::new(None, None, Some("Pune"))));
    }

    #[test]
    fn lab_test_filter_matches_offered_tests() {
        let lab = Lab::from_document(&Document::new(
            "l1",
            json!({"name": "City Diagnostics", "category": "Pathology", "tests": ["CBC", "Thyroid Profile"]}),
        ))
        .unwrap();
        assert!(lab.matches(&FilterState::new(None, Some("thyroid profile"), None)));
        assert!(lab.matches(&FilterState::new(None, Some("pathology"), None)));
        assert!(!lab.matches(&FilterState::new(None, Some("MRI"), None)));
    }

    type Row = (Option<String>, Option<String>, Option<String>);

    fn arb_row() -> impl Strategy<Value = Row> {
        (
            proptest::option::of("[A-Za-z ]{0,12}"),
            proptest::option::of(prop_oneof!["Cardiologist", "Dermatologist", "ENT"]),
            proptest::option::of(prop_oneof!["Delhi", "Mumbai", "Pune"]),
        )
    }

    fn build(rows: &[Row]) -> Vec<Doctor> {
        rows.iter()
            .enumerate()
            .map(|(i, (name, specialty, city))| {
                Doctor::from_document(&Document::new(
                    format!("r{i}"),
                    json!({"name": name, "specialty": specialty, "city": city}),
                ))
                .unwrap()
            })
            .collect()
    }

    /// Plain lowercase comparison on the generated values.
    fn row_passes(row: &Row, filter: &FilterState) -> bool {
        let lower = |v: &Option<String>| v.as_deref().map(|s| s.trim().to_lowercase());
        let (name, specialty, city) = (lower(&row.0), lower(&row.1), lower(&row.2));
        let query_ok = filter.query.as_deref().is_none_or(|q| {
            let q = q.to_lowercase();
            [&name, &specialty]
                .into_iter()
                .flatten()
                .any(|v| v.contains(&q))
        });
        let category_ok = filter
            .category
            .as_deref()
            .is_none_or(|c| specialty.as_deref() == Some(c.to_lowercase().as_str()));
        let location_ok = filter
            .location
            .as_deref()
            .is_none_or(|l| city.as_deref() == Some(l.to_lowercase().as_str()));
        query_ok && category_ok && location_ok
    }

    fn arb_filter() -> impl Strategy<Value = FilterState> {
        (
            proptest::option::of("[a-z]{0,3}"),
            proptest::option::of(prop_oneof!["cardiologist", "ENT", ""]),
            proptest::option::of(prop_oneof!["delhi", "PUNE", ""]),
        )
            .prop_map(|(q, c, l)| FilterState::new(q.as_deref(), c.as_deref(), l.as_deref()))
    }

    proptest! {
        #[test]
        fn empty_filter_is_identity(rows in proptest::collection::vec(arb_row(), 0..30)) {
            let records = build(&rows);
            let out = apply(&records, &FilterState::default());
            prop_assert_eq!(out.len(), records.len());
        }

        #[test]
        fn kept_records_are_exactly_those_matching_raw_fields(
            rows in proptest::collection::vec(arb_row(), 0..30),
            filter in arb_filter(),
        ) {
            let records = build(&rows);
            let kept: Vec<String> = apply(&records, &filter)
                .iter()
                .map(|d| d.id().to_string())
                .collect();
            let expected: Vec<String> = rows
                .iter()
                .enumerate()
                .filter(|(_, row)| row_passes(row, &filter))
                .map(|(i, _)| format!("r{i}"))
                .collect();
            prop_assert_eq!(kept, expected);
        }
    }
}
