//! Payments recorded against an order

use crate::core::date::DateLike;
use crate::entities::serde_helpers::{lenient_opt_decimal, lenient_string};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Payment method
///
/// Unknown method names read from the store map to [`PaymentMethod::Pendente`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum PaymentMethod {
    Dinheiro,
    Pix,
    CartaoCredito,
    CartaoDebito,
    Boleto,
    Transferencia,
    LinkPagamento,
    #[default]
    Pendente,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Dinheiro => "dinheiro",
            PaymentMethod::Pix => "pix",
            PaymentMethod::CartaoCredito => "cartao_credito",
            PaymentMethod::CartaoDebito => "cartao_debito",
            PaymentMethod::Boleto => "boleto",
            PaymentMethod::Transferencia => "transferencia",
            PaymentMethod::LinkPagamento => "link_pagamento",
            PaymentMethod::Pendente => "pendente",
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "dinheiro" => PaymentMethod::Dinheiro,
            "pix" => PaymentMethod::Pix,
            "cartao_credito" => PaymentMethod::CartaoCredito,
            "cartao_debito" => PaymentMethod::CartaoDebito,
            "boleto" => PaymentMethod::Boleto,
            "transferencia" => PaymentMethod::Transferencia,
            "link_pagamento" => PaymentMethod::LinkPagamento,
            "pendente" => PaymentMethod::Pendente,
            other => {
                tracing::warn!(method = other, "unknown payment method, treating as pendente");
                PaymentMethod::Pendente
            }
        }
    }
}

/// One payment
///
/// Older documents carry the amount as `value`; it is migrated into
/// `amount` on read and only `amount` is ever written back.
///
/// `date` is `None` when the stored payment had no readable date. An
/// unreadable stored value is kept and written back untouched until the
/// date is edited.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "PaymentRecord")]
pub struct Payment {
    pub id: String,
    pub method: PaymentMethod,
    pub amount: Decimal,
    pub date: Option<DateTime<Utc>>,
    pub reference: String,
    unreadable_date: Option<DateLike>,
}

impl Payment {
    pub fn new(method: PaymentMethod, amount: Decimal, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            method,
            amount,
            date: Some(date),
            reference: String::new(),
            unreadable_date: None,
        }
    }

    /// Replace the date, dropping any unreadable stored value
    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.date = Some(date);
        self.unreadable_date = None;
    }
}

/// Raw stored shape, including the legacy `value` field
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    id: String,
    #[serde(default)]
    method: Option<PaymentMethod>,
    #[serde(default, deserialize_with = "lenient_opt_decimal")]
    amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_opt_decimal")]
    value: Option<Decimal>,
    #[serde(default)]
    date: Option<DateLike>,
    #[serde(default, deserialize_with = "lenient_string")]
    reference: String,
}

impl From<PaymentRecord> for Payment {
    fn from(record: PaymentRecord) -> Self {
        let amount = record
            .amount
            .or(record.value)
            .unwrap_or_default()
            .max(Decimal::ZERO);
        let (date, unreadable_date) = match record.date {
            Some(raw) => match raw.normalize() {
                Ok(date) => (Some(date), None),
                Err(err) => {
                    tracing::warn!(payment_id = %record.id, error = %err, "unparseable payment date, keeping stored value");
                    (None, Some(raw))
                }
            },
            None => (None, None),
        };

        Self {
            id: if record.id.is_empty() {
                Uuid::new_v4().to_string()
            } else {
                record.id
            },
            method: record.method.unwrap_or_default(),
            amount,
            date,
            reference: record.reference,
            unreadable_date,
        }
    }
}

/// Written shape: canonical timestamp, or the stored value it could not read
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredPayment<'a> {
    id: &'a str,
    method: PaymentMethod,
    amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<DateLike>,
    reference: &'a str,
}

impl Serialize for Payment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        StoredPayment {
            id: &self.id,
            method: self.method,
            amount: self.amount,
            date: self
                .date
                .as_ref()
                .map(DateLike::timestamp)
                .or_else(|| self.unreadable_date.clone()),
            reference: &self.reference,
        }
        .serialize(serializer)
    }
}
