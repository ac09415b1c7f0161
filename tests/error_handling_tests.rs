//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors carry stable codes
//! - User notices tell storage failures and missing records apart
//! - Error conversions work correctly

use printshop::prelude::*;

// =============================================================================
// Error Code Tests
// =============================================================================

mod error_code_tests {
    use super::*;

    #[test]
    fn test_validation_codes() {
        let cases = [
            (ValidationError::MissingClient, "VALIDATION_NO_CLIENT"),
            (ValidationError::MissingItems, "VALIDATION_NO_ITEMS"),
            (ValidationError::MissingId, "VALIDATION_NO_ID"),
            (
                ValidationError::UnknownStatus {
                    status: "arquivado".to_string(),
                },
                "VALIDATION_UNKNOWN_STATUS",
            ),
        ];
        for (err, code) in cases {
            assert_eq!(OrderError::from(err).error_code(), code);
        }
    }

    #[test]
    fn test_other_codes() {
        let storage: OrderError = StorageError::Unavailable {
            backend: "in_memory".to_string(),
        }
        .into();
        assert_eq!(storage.error_code(), "STORAGE_ERROR");

        let missing: OrderError = NotFoundError::new("orders", "o1").into();
        assert_eq!(missing.error_code(), "NOT_FOUND");

        let config: OrderError = ConfigError::ParseError {
            message: "bad".to_string(),
        }
        .into();
        assert_eq!(config.error_code(), "CONFIG_ERROR");

        assert_eq!(
            OrderError::Internal("poisoned".to_string()).error_code(),
            "INTERNAL_ERROR"
        );
    }
}

// =============================================================================
// Notice Tests
// =============================================================================

mod notice_tests {
    use super::*;

    #[test]
    fn test_validation_is_a_warning() {
        let notice = OrderError::from(ValidationError::MissingItems).to_notice();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(!notice.retryable);
        assert!(notice.message.contains("item"));
    }

    #[test]
    fn test_storage_and_not_found_are_distinguishable() {
        let storage = OrderError::from(StorageError::QueryError {
            backend: "in_memory".to_string(),
            message: "timeout".to_string(),
        })
        .to_notice();
        let missing = OrderError::from(NotFoundError::new("orders", "o1")).to_notice();

        assert_ne!(storage.code, missing.code);
        assert_ne!(storage.message, missing.message);
        assert!(storage.retryable);
        assert!(!missing.retryable);
        assert_eq!(missing.message, "Pedido não encontrado(a): o1");
    }

    #[test]
    fn test_notice_labels_collection() {
        let client = OrderError::from(NotFoundError::new("clients", "c9")).to_notice();
        assert!(client.message.starts_with("Cliente"));
        let other = OrderError::from(NotFoundError::new("stock", "s1")).to_notice();
        assert!(other.message.starts_with("Registro"));
    }

    #[test]
    fn test_notice_serializes() {
        let notice = OrderError::from(ValidationError::MissingClient).to_notice();
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["code"], "VALIDATION_NO_CLIENT");
        assert_eq!(json["retryable"], false);
    }
}

// =============================================================================
// Conversion Tests
// =============================================================================

mod conversion_tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_source_chain() {
        let err = OrderError::from(ValidationError::MissingClient);
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "Validation error: no client");
        assert!(OrderError::Internal("x".to_string()).source().is_none());
    }

    #[test]
    fn test_yaml_error_is_config_error() {
        let yaml_err = serde_yaml::from_str::<AppConfig>("pricing: [").unwrap_err();
        let err: OrderError = yaml_err.into();
        assert!(matches!(err, OrderError::Config(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_anyhow_config_error_round_trip() {
        let err = AppConfig::from_yaml_str("orders:\n  statuses: []\n").unwrap_err();
        let err: OrderError = err.into();
        match err {
            OrderError::Config(ConfigError::InvalidValue { key, .. }) => {
                assert_eq!(key, "orders.statuses")
            }
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_matching() {
        let result: OrderResult<()> = Err(NotFoundError::new("orders", "o1").into());
        match result {
            Err(OrderError::NotFound(e)) => {
                assert_eq!(e.collection, "orders");
                assert_eq!(e.id, "o1");
            }
            _ => panic!("expected NotFound"),
        }
    }
}
