use serde::Serialize;

use crate::error::RecordError;
use crate::fields::{opt_bool, opt_string};
use crate::record::{Listable, ListingCore, Vertical};
use crate::store::Document;

/// Ambulance, blood bank, trauma care and similar providers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmergencyProvider {
    #[serde(flatten)]
    pub core: ListingCore,
    pub phone: Option<String>,
    pub available_24x7: Option<bool>,
}

impl Listable for EmergencyProvider {
    const VERTICAL: Vertical = Vertical::Emergency;

    fn from_document(doc: &Document) -> Result<Self, RecordError> {
        let core = ListingCore::from_document(doc, "service", "fee")?;
        let id = core.id.as_str();
        Ok(Self {
            phone: opt_string(id, &doc.data, "phone")?,
            available_24x7: opt_bool(id, &doc.data, "available24x7")?,
            core,
        })
    }

    fn core(&self) -> &ListingCore {
        &self.core
    }

    fn highlights(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.available_24x7 == Some(true) {
            out.push("Available 24x7".to_string());
        }
        if let Some(phone) = &self.phone {
            out.push(format!("Call {phone}"));
        }
        out
    }
}
