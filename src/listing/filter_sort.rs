//! Client-side filtering and sorting of the order list

use crate::core::collaborators::SettingsStore;
use crate::entities::OrderRecord;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Settings key holding the preferred sort order
pub const SORT_SETTING_KEY: &str = "orders.sort";

/// Sort order of the order list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    CreatedAsc,
    #[default]
    CreatedDesc,
    DeliveryAsc,
    DeliveryDesc,
    ValueAsc,
    ValueDesc,
    ClientAsc,
    ClientDesc,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::CreatedAsc => "created_asc",
            SortKey::CreatedDesc => "created_desc",
            SortKey::DeliveryAsc => "delivery_asc",
            SortKey::DeliveryDesc => "delivery_desc",
            SortKey::ValueAsc => "value_asc",
            SortKey::ValueDesc => "value_desc",
            SortKey::ClientAsc => "client_asc",
            SortKey::ClientDesc => "client_desc",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let key = match raw.trim() {
            "created_asc" => SortKey::CreatedAsc,
            "created_desc" => SortKey::CreatedDesc,
            "delivery_asc" => SortKey::DeliveryAsc,
            "delivery_desc" => SortKey::DeliveryDesc,
            "value_asc" => SortKey::ValueAsc,
            "value_desc" => SortKey::ValueDesc,
            "client_asc" => SortKey::ClientAsc,
            "client_desc" => SortKey::ClientDesc,
            _ => return None,
        };
        Some(key)
    }

    fn is_descending(&self) -> bool {
        matches!(
            self,
            SortKey::CreatedDesc | SortKey::DeliveryDesc | SortKey::ValueDesc | SortKey::ClientDesc
        )
    }
}

/// Creation-date bucket relative to "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatedBucket {
    Today,
    /// Calendar week starting on Sunday
    ThisWeek,
    ThisMonth,
}

impl CreatedBucket {
    fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            CreatedBucket::Today => date == today,
            CreatedBucket::ThisWeek => {
                let start =
                    today - Duration::days(today.weekday().num_days_from_sunday() as i64);
                date >= start && date < start + Duration::days(7)
            }
            CreatedBucket::ThisMonth => date.year() == today.year() && date.month() == today.month(),
        }
    }
}

/// Filter criteria; every `None` criterion matches everything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFilter {
    /// Matched against order number, client name and seller name
    pub text: Option<String>,
    pub order_number: Option<String>,
    pub client_name: Option<String>,
    pub status: Option<String>,
    pub seller_id: Option<String>,
    /// Matched against the product name and category of every item
    pub material: Option<String>,
    pub created: Option<CreatedBucket>,
    /// Inclusive
    pub delivery_from: Option<NaiveDate>,
    /// Inclusive
    pub delivery_to: Option<NaiveDate>,
}

/// Lowercase and strip Portuguese diacritics for comparisons
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Unset or blank criteria are treated as absent
fn criterion(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(fold)
}

fn contains(haystack: &str, needle: &str) -> bool {
    fold(haystack).contains(needle)
}

impl OrderFilter {
    pub fn is_empty(&self) -> bool {
        *self == OrderFilter::default()
    }

    /// Whether one order satisfies every set criterion
    pub fn matches(&self, order: &OrderRecord, now: DateTime<Utc>) -> bool {
        let doc = &order.document;

        if let Some(text) = criterion(&self.text) {
            let hit = contains(&doc.order_number, &text)
                || contains(order.client_name(), &text)
                || contains(order.seller_name(), &text);
            if !hit {
                return false;
            }
        }
        if let Some(number) = criterion(&self.order_number) {
            if !contains(&doc.order_number, &number) {
                return false;
            }
        }
        if let Some(name) = criterion(&self.client_name) {
            if !contains(order.client_name(), &name) {
                return false;
            }
        }
        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            if doc.status != status {
                return false;
            }
        }
        if let Some(seller_id) = self.seller_id.as_deref().filter(|s| !s.is_empty()) {
            if doc.seller_id.as_deref() != Some(seller_id) {
                return false;
            }
        }
        if let Some(material) = criterion(&self.material) {
            let hit = doc.items.iter().any(|item| {
                contains(&item.product_name, &material)
                    || item
                        .category
                        .as_deref()
                        .is_some_and(|category| contains(category, &material))
            });
            if !hit {
                return false;
            }
        }
        if let Some(bucket) = self.created {
            let in_bucket = order
                .created_at()
                .is_some_and(|created| bucket.contains(created.date_naive(), now.date_naive()));
            if !in_bucket {
                return false;
            }
        }
        if self.delivery_from.is_some() || self.delivery_to.is_some() {
            let Some(delivery) = order.delivery_date().map(|d| d.date_naive()) else {
                return false;
            };
            if self.delivery_from.is_some_and(|from| delivery < from)
                || self.delivery_to.is_some_and(|to| delivery > to)
            {
                return false;
            }
        }
        true
    }
}

/// Keep the orders matching every criterion, in input order
pub fn filter(orders: &[OrderRecord], criteria: &OrderFilter, now: DateTime<Utc>) -> Vec<OrderRecord> {
    orders
        .iter()
        .filter(|order| criteria.matches(order, now))
        .cloned()
        .collect()
}

fn date_key(date: Option<DateTime<Utc>>) -> DateTime<Utc> {
    date.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Stable sort; missing dates sort as the epoch
pub fn sort(orders: &[OrderRecord], key: SortKey) -> Vec<OrderRecord> {
    let mut sorted = orders.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = match key {
            SortKey::CreatedAsc | SortKey::CreatedDesc => {
                date_key(a.created_at()).cmp(&date_key(b.created_at()))
            }
            SortKey::DeliveryAsc | SortKey::DeliveryDesc => {
                date_key(a.delivery_date()).cmp(&date_key(b.delivery_date()))
            }
            SortKey::ValueAsc | SortKey::ValueDesc => a.total_value().cmp(&b.total_value()),
            SortKey::ClientAsc | SortKey::ClientDesc => {
                fold(a.client_name()).cmp(&fold(b.client_name()))
            }
        };
        if key.is_descending() {
            ordering.reverse()
        } else {
            ordering
        }
    });
    sorted
}

/// Filter and sort with the user's persisted sort preference
pub struct OrderListFilterSort {
    settings: Arc<dyn SettingsStore>,
}

impl OrderListFilterSort {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Preferred sort order, newest first when unset or unreadable
    pub fn sort_key(&self) -> SortKey {
        match self.settings.get(SORT_SETTING_KEY) {
            Some(raw) => SortKey::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "unknown sort preference, using default");
                SortKey::default()
            }),
            None => SortKey::default(),
        }
    }

    pub fn set_sort_key(&self, key: SortKey) {
        self.settings.set(SORT_SETTING_KEY, key.as_str());
    }

    pub fn sort(&self, orders: &[OrderRecord], key: SortKey) -> Vec<OrderRecord> {
        sort(orders, key)
    }

    pub fn filter(
        &self,
        orders: &[OrderRecord],
        criteria: &OrderFilter,
        now: DateTime<Utc>,
    ) -> Vec<OrderRecord> {
        filter(orders, criteria, now)
    }

    /// Filter, then sort by the preferred key
    pub fn apply(
        &self,
        orders: &[OrderRecord],
        criteria: &OrderFilter,
        now: DateTime<Utc>,
    ) -> Vec<OrderRecord> {
        sort(&filter(orders, criteria, now), self.sort_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fold() {
        assert_eq!(fold("Érico ÇÃO"), "erico cao");
    }

    #[test]
    fn test_week_starts_on_sunday() {
        // Wednesday 2024-05-15
        let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 5, 12).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2024, 5, 18).unwrap();
        let previous_saturday = NaiveDate::from_ymd_opt(2024, 5, 11).unwrap();

        assert!(CreatedBucket::ThisWeek.contains(sunday, today));
        assert!(CreatedBucket::ThisWeek.contains(saturday, today));
        assert!(!CreatedBucket::ThisWeek.contains(previous_saturday, today));
    }

    #[test]
    fn test_sort_key_round_trip() {
        for key in [SortKey::CreatedAsc, SortKey::ClientDesc, SortKey::ValueDesc] {
            assert_eq!(SortKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(SortKey::parse("random"), None);
    }

    #[test]
    fn test_empty_filter() {
        let filter = OrderFilter::default();
        assert!(filter.is_empty());
        let record = OrderRecord::new("o1", Default::default());
        assert!(filter.matches(&record, Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap()));
    }
}
