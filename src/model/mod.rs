//! Securities, transactions and the read-only capability views used by
//! reporting layers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod transaction;

pub use transaction::{Transaction, TransactionKind};

/// Something with a display name and an optional free-text note
pub trait Named {
    fn name(&self) -> &str;
    fn note(&self) -> Option<&str>;
}

/// Something carrying user-defined key/value attributes
pub trait Attributable {
    fn attributes(&self) -> &BTreeMap<String, String>;

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes().get(key).map(String::as_str)
    }
}

/// A holding that can be invested in (security or account)
pub trait InvestmentVehicle: Named {
    fn uuid(&self) -> &str;
    fn currency_code(&self) -> &str;
}

/// A tradable instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Security {
    pub id: String,
    pub name: String,
    pub currency: String,
    pub isin: Option<String>,
    pub ticker: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Security {
    pub fn new(id: impl Into<String>, name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            currency: currency.into(),
            isin: None,
            ticker: None,
            note: None,
            attributes: BTreeMap::new(),
        }
    }
}

impl Named for Security {
    fn name(&self) -> &str {
        &self.name
    }

    fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

impl Attributable for Security {
    fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

impl InvestmentVehicle for Security {
    fn uuid(&self) -> &str {
        &self.id
    }

    fn currency_code(&self) -> &str {
        &self.currency
    }
}
