use serde::Serialize;

use crate::error::RecordError;
use crate::fields::{opt_bool, string_list};
use crate::record::{Listable, ListingCore, Vertical};
use crate::store::Document;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lab {
    #[serde(flatten)]
    pub core: ListingCore,
    pub tests: Vec<String>,
    pub home_collection: Option<bool>,
}

impl Listable for Lab {
    const VERTICAL: Vertical = Vertical::Labs;

    fn from_document(doc: &Document) -> Result<Self, RecordError> {
        let core = ListingCore::from_document(doc, "category", "price")?;
        let id = core.id.as_str();
        Ok(Self {
            tests: string_list(id, &doc.data, "tests")?,
            home_collection: opt_bool(id, &doc.data, "homeCollection")?,
            core,
        })
    }

    fn core(&self) -> &ListingCore {
        &self.core
    }

    /// The `test` filter matches the lab category or any offered test.
    fn category_terms(&self) -> Vec<&str> {
        self.core
            .category
            .as_deref()
            .into_iter()
            .chain(self.tests.iter().map(String::as_str))
            .collect()
    }

    fn highlights(&self) -> Vec<String> {
        let mut out = Vec::new();
        match self.tests.len() {
            0 => {}
            1..=3 => out.push(self.tests.join(", ")),
            n => out.push(format!("{}, +{} more tests", self.tests[..3].join(", "), n - 3)),
        }
        if self.home_collection == Some(true) {
            out.push("Home sample collection".to_string());
        }
        out
    }
}
