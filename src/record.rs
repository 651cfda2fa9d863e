use serde::Serialize;

use crate::error::RecordError;
use crate::fields::{Fields, opt_bool, opt_f64, opt_string};
use crate::filter::FilterState;
use crate::store::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Vertical {
    Doctors,
    Hospitals,
    Labs,
    Emergency,
    Salons,
}

impl Vertical {
    pub const ALL: [Vertical; 5] = [
        Vertical::Doctors,
        Vertical::Hospitals,
        Vertical::Labs,
        Vertical::Emergency,
        Vertical::Salons,
    ];

    pub fn from_slug(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.slug().eq_ignore_ascii_case(s.trim()))
    }

    pub fn slug(self) -> &'static str {
        match self {
            Vertical::Doctors => "doctors",
            Vertical::Hospitals => "hospitals",
            Vertical::Labs => "labs",
            Vertical::Emergency => "emergency",
            Vertical::Salons => "salons",
        }
    }

    /// Name of the document store collection backing this vertical.
    pub fn collection(self) -> &'static str {
        match self {
            Vertical::Emergency => "emergency_services",
            other => other.slug(),
        }
    }

    /// Query parameter carrying the category filter.
    pub fn category_param(self) -> &'static str {
        match self {
            Vertical::Doctors => "specialty",
            Vertical::Hospitals => "category",
            Vertical::Labs => "test",
            Vertical::Emergency | Vertical::Salons => "service",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Vertical::Doctors => "Doctors",
            Vertical::Hospitals => "Hospitals",
            Vertical::Labs => "Diagnostic Labs",
            Vertical::Emergency => "Emergency Services",
            Vertical::Salons => "Salons",
        }
    }

    pub fn category_label(self) -> &'static str {
        match self {
            Vertical::Doctors => "Specialty",
            Vertical::Hospitals => "Category",
            Vertical::Labs => "Test",
            Vertical::Emergency | Vertical::Salons => "Service",
        }
    }

    /// Plural noun used in result counts and empty states.
    pub fn noun(self) -> &'static str {
        match self {
            Vertical::Doctors => "doctors",
            Vertical::Hospitals => "hospitals",
            Vertical::Labs => "labs",
            Vertical::Emergency => "emergency providers",
            Vertical::Salons => "salons",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
}

impl Location {
    pub fn from_fields(id: &str, data: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            address: opt_string(id, data, "address")?,
            city: opt_string(id, data, "city")?,
            district: opt_string(id, data, "district")?,
            state: opt_string(id, data, "state")?,
        })
    }

    /// Case-insensitive exact match against city, district or state.
    pub fn matches(&self, wanted: &str) -> bool {
        [&self.city, &self.district, &self.state]
            .into_iter()
            .flatten()
            .any(|v| eq_fold(v, wanted))
    }

    /// "City, District, State" with absent parts dropped.
    pub fn summary(&self) -> Option<String> {
        let mut parts: Vec<&str> = Vec::new();
        for part in [&self.city, &self.district, &self.state].into_iter().flatten() {
            if !parts.iter().any(|p| eq_fold(p, part)) {
                parts.push(part);
            }
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Status {
    fn from_fields(id: &str, data: &Fields) -> Result<Self, RecordError> {
        if let Some(active) = opt_bool(id, data, "active")? {
            return Ok(if active { Status::Active } else { Status::Inactive });
        }
        let status = opt_string(id, data, "status")?;
        Ok(match status.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("inactive" | "disabled" | "closed" | "suspended" | "false") => Status::Inactive,
            _ => Status::Active,
        })
    }
}

/// Fields every vertical shares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingCore {
    pub id: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub location: Location,
    pub rating: Option<f64>,
    pub fee: Option<f64>,
    pub image: Option<String>,
    pub status: Status,
}

impl ListingCore {
    /// Validates the shared fields of `doc`. `category_field` and `fee_field`
    /// name the vertical's own keys for the category label and price.
    pub fn from_document(
        doc: &Document,
        category_field: &'static str,
        fee_field: &'static str,
    ) -> Result<Self, RecordError> {
        let id = doc.id.trim();
        if id.is_empty() {
            return Err(RecordError::MissingId);
        }
        let data = &doc.data;
        Ok(Self {
            id: id.to_string(),
            name: opt_string(id, data, "name")?,
            category: opt_string(id, data, category_field)?,
            location: Location::from_fields(id, data)?,
            rating: opt_f64(id, data, "rating")?.map(|r| r.clamp(0.0, 5.0)),
            fee: opt_f64(id, data, fee_field)?.filter(|f| *f >= 0.0),
            image: opt_string(id, data, "image")?,
            status: Status::from_fields(id, data)?,
        })
    }
}

/// Capability set the listing pipeline needs from a vertical's record type.
pub trait Listable: Clone + Send + Sync + Serialize + 'static {
    const VERTICAL: Vertical;

    fn from_document(doc: &Document) -> Result<Self, RecordError>;

    fn core(&self) -> &ListingCore;

    fn id(&self) -> &str {
        &self.core().id
    }

    fn display_name(&self) -> Option<&str> {
        self.core().name.as_deref()
    }

    fn category(&self) -> Option<&str> {
        self.core().category.as_deref()
    }

    fn location(&self) -> &Location {
        &self.core().location
    }

    fn rating(&self) -> Option<f64> {
        self.core().rating
    }

    fn fee(&self) -> Option<f64> {
        self.core().fee
    }

    /// Values the category filter is compared against.
    fn category_terms(&self) -> Vec<&str> {
        self.category().into_iter().collect()
    }

    /// Short facts shown under the name on a result card.
    fn highlights(&self) -> Vec<String> {
        Vec::new()
    }

    fn matches(&self, filter: &FilterState) -> bool {
        crate::filter::matches(self, filter)
    }
}

pub fn eq_fold(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, data: serde_json::Value) -> Document {
        Document::new(id, data)
    }

    #[test]
    fn vertical_slugs_round_trip() {
        for v in Vertical::ALL {
            assert_eq!(Vertical::from_slug(v.slug()), Some(v));
        }
        assert_eq!(Vertical::from_slug("DOCTORS"), Some(Vertical::Doctors));
        assert_eq!(Vertical::from_slug("pharmacies"), None);
        assert_eq!(Vertical::Emergency.collection(), "emergency_services");
    }

    #[test]
    fn core_tolerates_sparse_documents() {
        let core = ListingCore::from_document(&doc("h1", json!({})), "category", "fee").unwrap();
        assert_eq!(core.id, "h1");
        assert_eq!(core.name, None);
        assert_eq!(core.location, Location::default());
        assert_eq!(core.status, Status::Active);
    }

    #[test]
    fn core_requires_id() {
        let err = ListingCore::from_document(&doc("  ", json!({"name": "X"})), "category", "fee")
            .unwrap_err();
        assert_eq!(err, RecordError::MissingId);
    }

    #[test]
    fn status_reads_flag_or_text() {
        let a = ListingCore::from_document(&doc("a", json!({"active": false})), "c", "f").unwrap();
        let b =
            ListingCore::from_document(&doc("b", json!({"status": "Inactive"})), "c", "f").unwrap();
        let c = ListingCore::from_document(&doc("c", json!({"status": "open"})), "c", "f").unwrap();
        assert_eq!(a.status, Status::Inactive);
        assert_eq!(b.status, Status::Inactive);
        assert_eq!(c.status, Status::Active);
    }

    #[test]
    fn location_matches_any_component_case_insensitively() {
        let loc = Location {
            address: Some("12 MG Road".into()),
            city: Some("Pune".into()),
            district: Some("Pune".into()),
            state: Some("Maharashtra".into()),
        };
        assert!(loc.matches("pune"));
        assert!(loc.matches(" MAHARASHTRA "));
        assert!(!loc.matches("Mumbai"));
        assert!(!loc.matches("MG Road"));
        assert_eq!(loc.summary().as_deref(), Some("Pune, Maharashtra"));
        assert_eq!(Location::default().summary(), None);
    }
}
