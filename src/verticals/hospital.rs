use serde::Serialize;

use crate::error::RecordError;
use crate::fields::{opt_bool, opt_u32};
use crate::record::{Listable, ListingCore, Vertical};
use crate::store::Document;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hospital {
    #[serde(flatten)]
    pub core: ListingCore,
    pub beds: Option<u32>,
    pub emergency_24h: Option<bool>,
}

impl Listable for Hospital {
    const VERTICAL: Vertical = Vertical::Hospitals;

    fn from_document(doc: &Document) -> Result<Self, RecordError> {
        let core = ListingCore::from_document(doc, "category", "fee")?;
        let id = core.id.as_str();
        Ok(Self {
            beds: opt_u32(id, &doc.data, "beds")?,
            emergency_24h: opt_bool(id, &doc.data, "emergency")?,
            core,
        })
    }

    fn core(&self) -> &ListingCore {
        &self.core
    }

    fn highlights(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(beds) = self.beds {
            out.push(format!("{beds} beds"));
        }
        if self.emergency_24h == Some(true) {
            out.push("24x7 emergency".to_string());
        }
        out
    }
}
