use serde::Serialize;

use crate::error::RecordError;
use crate::fields::{opt_string, opt_u32};
use crate::record::{Listable, ListingCore, Vertical};
use crate::store::Document;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Doctor {
    #[serde(flatten)]
    pub core: ListingCore,
    pub experience_years: Option<u32>,
    pub qualification: Option<String>,
    pub hospital: Option<String>,
}

impl Listable for Doctor {
    const VERTICAL: Vertical = Vertical::Doctors;

    fn from_document(doc: &Document) -> Result<Self, RecordError> {
        let core = ListingCore::from_document(doc, "specialty", "fee")?;
        let id = core.id.as_str();
        Ok(Self {
            experience_years: opt_u32(id, &doc.data, "experience")?,
            qualification: opt_string(id, &doc.data, "qualification")?,
            hospital: opt_string(id, &doc.data, "hospital")?,
            core,
        })
    }

    fn core(&self) -> &ListingCore {
        &self.core
    }

    fn highlights(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(q) = &self.qualification {
            out.push(q.clone());
        }
        if let Some(years) = self.experience_years {
            out.push(format!("{years} yrs experience"));
        }
        if let Some(h) = &self.hospital {
            out.push(h.clone());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_specialty_and_extras() {
        let d = Doctor::from_document(&Document::new(
            "d1",
            json!({
                "name": "Dr. Meera Iyer",
                "specialty": "Orthopedic",
                "experience": "12",
                "qualification": "MBBS, MS (Ortho)",
                "fee": 700,
                "city": "Chennai",
            }),
        ))
        .unwrap();
        assert_eq!(d.category(), Some("Orthopedic"));
        assert_eq!(d.fee(), Some(700.0));
        assert_eq!(
            d.highlights(),
            vec!["MBBS, MS (Ortho)".to_string(), "12 yrs experience".to_string()]
        );
    }

    #[test]
    fn serializes_core_fields_flat() {
        let d = Doctor::from_document(&Document::new("d2", json!({"name": "A"}))).unwrap();
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["id"], "d2");
        assert_eq!(v["name"], "A");
        assert!(v["experience_years"].is_null());
    }
}
