//! Configuration loading and management
//!
//! Every key has a default; a YAML file only needs to list what it changes.
//!
//! ```yaml
//! display:
//!   currency_symbol: "R$"
//! orders:
//!   statuses: [pendente, em_producao, pronto, entregue, cancelado]
//!   default_status: pendente
//! pricing:
//!   reseller_factor: 0.8
//! ```

use crate::core::error::ConfigError;
use crate::entities::serde_helpers::lenient_decimal;
use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pricing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Multiplier applied to `price` for resellers when a product has no reseller price
    #[serde(deserialize_with = "lenient_decimal")]
    pub reseller_factor: Decimal,

    /// Difference from the category default above which a typed price is a manual override
    #[serde(deserialize_with = "lenient_decimal")]
    pub override_tolerance: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            reseller_factor: Decimal::new(8, 1),
            override_tolerance: Decimal::new(1, 2),
        }
    }
}

/// Order workflow parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// Valid order statuses, in workflow order
    pub statuses: Vec<String>,

    /// Status of newly created orders
    pub default_status: String,

    /// Default delivery date offset for new orders
    pub delivery_lead_hours: i64,

    /// Marker inserted into an item description by the "application" checkbox
    pub application_marker: String,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            statuses: ["pendente", "em_producao", "pronto", "entregue", "cancelado"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_status: "pendente".to_string(),
            delivery_lead_hours: 24,
            application_marker: "Com aplicação".to_string(),
        }
    }
}

/// Display parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub currency_symbol: String,

    /// How long a reconciled field stays highlighted
    pub highlight_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "R$".to_string(),
            highlight_ms: 800,
        }
    }
}

/// Collection names in the document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionNames {
    pub orders: String,
    pub clients: String,
    pub products: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            orders: "orders".to_string(),
            clients: "clients".to_string(),
            products: "products".to_string(),
        }
    }
}

/// Store parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Buffer of the change feed before slow listeners lag
    pub change_feed_capacity: usize,

    /// Maximum orders fetched by the live order list
    pub list_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            change_feed_capacity: 1024,
            list_limit: 500,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pricing: PricingConfig,
    pub orders: OrderConfig,
    pub display: DisplayConfig,
    pub collections: CollectionNames,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let factor = self.pricing.reseller_factor;
        if factor <= Decimal::ZERO || factor > Decimal::ONE {
            return Err(ConfigError::InvalidValue {
                key: "pricing.reseller_factor".to_string(),
                message: format!("must be in (0, 1], got {}", self.pricing.reseller_factor),
            });
        }
        if self.pricing.override_tolerance < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                key: "pricing.override_tolerance".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        if self.orders.statuses.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "orders.statuses".to_string(),
                message: "at least one status is required".to_string(),
            });
        }
        if !self.is_known_status(&self.orders.default_status) {
            return Err(ConfigError::InvalidValue {
                key: "orders.default_status".to_string(),
                message: format!("'{}' is not a listed status", self.orders.default_status),
            });
        }
        Ok(())
    }

    pub fn is_known_status(&self, status: &str) -> bool {
        self.orders.statuses.iter().any(|s| s == status)
    }

    pub fn highlight_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.display.highlight_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.orders.default_status, "pendente");
        assert_eq!(config.display.highlight_ms, 800);
        assert_eq!(config.collections.orders, "orders");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml_str("display:\n  currency_symbol: \"US$\"\n").unwrap();
        assert_eq!(config.display.currency_symbol, "US$");
        assert_eq!(config.display.highlight_ms, 800);
        assert_eq!(config.pricing.reseller_factor, Decimal::new(8, 1));
    }

    #[test]
    fn test_yaml_serialization() {
        let config = AppConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = AppConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_default_status_rejected() {
        let yaml = "orders:\n  statuses: [aberto, fechado]\n";
        let err = AppConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("orders.default_status"));
    }
}
