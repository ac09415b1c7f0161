//! Client snapshot embedded in orders

use crate::entities::serde_helpers::{lenient_opt_string, lenient_string};
use serde::{Deserialize, Serialize};

/// Pricing tier selecting which product price applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClientCategory {
    /// Retail customer
    #[default]
    Final,
    /// Wholesale customer
    #[serde(alias = "revenda")]
    Reseller,
}

impl ClientCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientCategory::Final => "final",
            ClientCategory::Reseller => "reseller",
        }
    }
}

/// Copy of the client record taken when the order was written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientSnapshot {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    /// CPF/CNPJ
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default)]
    pub category: ClientCategory,
}

impl ClientSnapshot {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: ClientCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            ..Default::default()
        }
    }
}
