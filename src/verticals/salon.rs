use serde::Serialize;

use crate::error::RecordError;
use crate::fields::string_list;
use crate::record::{Listable, ListingCore, Vertical};
use crate::store::Document;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Salon {
    #[serde(flatten)]
    pub core: ListingCore,
    pub services: Vec<String>,
}

impl Listable for Salon {
    const VERTICAL: Vertical = Vertical::Salons;

    fn from_document(doc: &Document) -> Result<Self, RecordError> {
        let core = ListingCore::from_document(doc, "category", "price")?;
        let services = string_list(&core.id, &doc.data, "services")?;
        Ok(Self { core, services })
    }

    fn core(&self) -> &ListingCore {
        &self.core
    }

    fn category_terms(&self) -> Vec<&str> {
        self.core
            .category
            .as_deref()
            .into_iter()
            .chain(self.services.iter().map(String::as_str))
            .collect()
    }

    fn highlights(&self) -> Vec<String> {
        if self.services.is_empty() {
            Vec::new()
        } else {
            vec![self.services.join(" · ")]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterState;
    use serde_json::json;

    #[test]
    fn service_filter_matches_offered_services() {
        let s = Salon::from_document(&Document::new(
            "s1",
            json!({"name": "Glow", "category": "Unisex", "services": "Haircut, Bridal Makeup"}),
        ))
        .unwrap();
        assert!(s.matches(&FilterState::new(None, Some("bridal makeup"), None)));
        assert!(s.matches(&FilterState::new(None, Some("unisex"), None)));
        assert!(!s.matches(&FilterState::new(None, Some("Spa"), None)));
    }
}
