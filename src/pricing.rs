//! Pure pricing rules: item area, unit price, line total and order totals
//!
//! Nothing here fails. Unparseable or negative inputs are treated as `0`,
//! and an arithmetic overflow yields `0` with a warning, so a half-typed
//! form always shows a number.

use crate::config::PricingConfig;
use crate::core::locale::{parse_decimal_or_zero, round2};
use crate::entities::{ClientCategory, OrderItem, Payment, Product};
use rust_decimal::Decimal;
use serde::Serialize;

/// Derived monetary totals of an order
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub grand_total: Decimal,
    pub paid_total: Decimal,
    /// `max(0, grand_total - paid_total)`
    pub remaining: Decimal,
}

fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

fn times(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or_else(|| {
        tracing::warn!(%a, %b, "multiplication overflow, using 0");
        Decimal::ZERO
    })
}

fn sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .unwrap_or_else(|| {
            tracing::warn!("sum overflow, using 0");
            Decimal::ZERO
        })
}

/// Pricing rules parameterised by configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingCalculator {
    reseller_factor: Decimal,
    override_tolerance: Decimal,
}

impl Default for PricingCalculator {
    fn default() -> Self {
        Self::new(&PricingConfig::default())
    }
}

impl PricingCalculator {
    pub fn new(config: &PricingConfig) -> Self {
        Self {
            reseller_factor: config.reseller_factor,
            override_tolerance: config.override_tolerance,
        }
    }

    /// Area from locale-formatted width/height strings (metres → m²)
    pub fn compute_item_area(&self, width: &str, height: &str) -> Decimal {
        self.area(
            parse_decimal_or_zero(width, "width"),
            parse_decimal_or_zero(height, "height"),
        )
    }

    /// `width × height`, each clamped at 0
    pub fn area(&self, width: Decimal, height: Decimal) -> Decimal {
        times(non_negative(width), non_negative(height))
    }

    /// Price the product lists for a client category
    ///
    /// Resellers pay `priceReseller`, or `price × reseller_factor` when the
    /// product has no reseller price. Final clients pay `priceFinal` or
    /// `price`.
    pub fn category_price(&self, product: &Product, category: ClientCategory) -> Decimal {
        let price = match category {
            ClientCategory::Reseller => product
                .price_reseller
                .unwrap_or_else(|| times(product.price, self.reseller_factor)),
            ClientCategory::Final => product.price_final.unwrap_or(product.price),
        };
        round2(non_negative(price))
    }

    /// Whether `price` deviates from the category default by more than the tolerance
    pub fn is_manual_override(&self, price: Decimal, default_price: Decimal) -> bool {
        (price - default_price).abs() > self.override_tolerance
    }

    /// Unit price of a line: the manual override when it really differs from
    /// the category default, else the default
    pub fn compute_item_unit_price(
        &self,
        product: &Product,
        category: ClientCategory,
        manual_override: Option<Decimal>,
    ) -> Decimal {
        let default_price = self.category_price(product, category);
        match manual_override {
            Some(price) if self.is_manual_override(non_negative(price), default_price) => {
                round2(non_negative(price))
            }
            _ => default_price,
        }
    }

    /// Line total: `quantity × unitPrice × area` for custom-size items,
    /// `quantity × unitPrice` otherwise
    pub fn compute_item_total(&self, item: &OrderItem) -> Decimal {
        let base = times(non_negative(item.quantity), non_negative(item.unit_price));
        if item.is_custom_size() {
            round2(times(base, self.area(item.width, item.height)))
        } else {
            round2(base)
        }
    }

    /// Subtotal, grand total, amount paid and remaining balance
    ///
    /// `remaining` is floored at zero; `grand_total` is not clamped.
    pub fn compute_order_totals(
        &self,
        items: &[OrderItem],
        discount: Decimal,
        extra_services: Decimal,
        delivery_cost: Option<Decimal>,
        payments: &[Payment],
    ) -> OrderTotals {
        let subtotal = round2(sum(items.iter().map(|item| non_negative(item.total))));
        let grand_total = round2(
            sum([
                subtotal,
                non_negative(extra_services),
                non_negative(delivery_cost.unwrap_or_default()),
            ]) - non_negative(discount),
        );
        let paid_total = round2(sum(payments.iter().map(|p| non_negative(p.amount))));
        // A grand total far below zero cannot leave anything to pay
        let remaining = round2(non_negative(
            grand_total.checked_sub(paid_total).unwrap_or_default(),
        ));

        OrderTotals {
            subtotal,
            grand_total,
            paid_total,
            remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{PaymentMethod, ProductType};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn banner() -> Product {
        Product {
            id: "banner".to_string(),
            name: "Banner lona".to_string(),
            price: dec!(50),
            product_type: ProductType::CustomSize,
            ..Default::default()
        }
    }

    fn card() -> Product {
        Product {
            id: "card".to_string(),
            name: "Cartão de visita".to_string(),
            price: dec!(100),
            price_final: Some(dec!(120)),
            price_reseller: Some(dec!(90)),
            ..Default::default()
        }
    }

    fn payment(amount: Decimal) -> Payment {
        Payment::new(PaymentMethod::Pix, amount, Utc::now())
    }

    #[test]
    fn test_area_from_locale_strings() {
        let calc = PricingCalculator::default();
        assert_eq!(calc.compute_item_area("2", "1"), dec!(2));
        assert_eq!(calc.compute_item_area("1,5", "0,5"), dec!(0.75));
        assert_eq!(calc.compute_item_area("", "3"), Decimal::ZERO);
        assert_eq!(calc.compute_item_area("abc", "3"), Decimal::ZERO);
    }

    #[test]
    fn test_custom_size_total() {
        let calc = PricingCalculator::default();
        let item = OrderItem {
            product_type: ProductType::CustomSize,
            quantity: dec!(1),
            unit_price: dec!(50),
            width: dec!(2),
            height: dec!(1),
            ..OrderItem::empty()
        };
        assert_eq!(calc.compute_item_total(&item), dec!(100));
    }

    #[test]
    fn test_standard_total_ignores_dimensions() {
        let calc = PricingCalculator::default();
        let item = OrderItem {
            quantity: dec!(3),
            unit_price: dec!(12.25),
            width: dec!(9),
            height: dec!(9),
            ..OrderItem::empty()
        };
        assert_eq!(calc.compute_item_total(&item), dec!(36.75));
    }

    #[test]
    fn test_half_cent_line_totals_round_up() {
        let calc = PricingCalculator::default();
        for (quantity, unit_price) in [
            (dec!(1), dec!(1.005)),
            (dec!(3), dec!(0.335)),
            (dec!(5), dec!(0.201)),
        ] {
            let item = OrderItem {
                quantity,
                unit_price,
                ..OrderItem::empty()
            };
            assert_eq!(calc.compute_item_total(&item), dec!(1.01), "{quantity} x {unit_price}");
        }
    }

    #[test]
    fn test_negative_inputs_are_zero() {
        let calc = PricingCalculator::default();
        let item = OrderItem {
            quantity: dec!(-2),
            unit_price: dec!(10),
            ..OrderItem::empty()
        };
        assert_eq!(calc.compute_item_total(&item), Decimal::ZERO);
    }

    #[test]
    fn test_overflow_is_zero() {
        let calc = PricingCalculator::default();
        let item = OrderItem {
            quantity: Decimal::MAX,
            unit_price: Decimal::MAX,
            ..OrderItem::empty()
        };
        assert_eq!(calc.compute_item_total(&item), Decimal::ZERO);
    }

    #[test]
    fn test_category_prices() {
        let calc = PricingCalculator::default();
        assert_eq!(calc.category_price(&card(), ClientCategory::Final), dec!(120));
        assert_eq!(calc.category_price(&card(), ClientCategory::Reseller), dec!(90));
        // Fallbacks
        assert_eq!(calc.category_price(&banner(), ClientCategory::Final), dec!(50));
        assert_eq!(calc.category_price(&banner(), ClientCategory::Reseller), dec!(40));
    }

    #[test]
    fn test_manual_override_tolerance() {
        let calc = PricingCalculator::default();
        assert_eq!(
            calc.compute_item_unit_price(&card(), ClientCategory::Final, Some(dec!(120.005))),
            dec!(120)
        );
        assert_eq!(
            calc.compute_item_unit_price(&card(), ClientCategory::Final, Some(dec!(110))),
            dec!(110)
        );
        assert_eq!(
            calc.compute_item_unit_price(&card(), ClientCategory::Reseller, None),
            dec!(90)
        );
    }

    #[test]
    fn test_order_totals_with_partial_payment() {
        let calc = PricingCalculator::default();
        let items = vec![
            OrderItem {
                total: dec!(500),
                ..OrderItem::empty()
            },
            OrderItem {
                total: dec!(250),
                ..OrderItem::empty()
            },
        ];
        let totals = calc.compute_order_totals(
            &items,
            Decimal::ZERO,
            Decimal::ZERO,
            None,
            &[payment(dec!(375))],
        );
        assert_eq!(totals.subtotal, dec!(750));
        assert_eq!(totals.grand_total, dec!(750));
        assert_eq!(totals.paid_total, dec!(375));
        assert_eq!(totals.remaining, dec!(375));
    }

    #[test]
    fn test_order_totals_formula() {
        let calc = PricingCalculator::default();
        let items = vec![OrderItem {
            total: dec!(100),
            ..OrderItem::empty()
        }];
        let totals =
            calc.compute_order_totals(&items, dec!(15), dec!(20), Some(dec!(12.5)), &[]);
        assert_eq!(totals.grand_total, dec!(117.5));
        assert_eq!(totals.remaining, dec!(117.5));
    }

    #[test]
    fn test_cents_add_up_exactly() {
        let calc = PricingCalculator::default();
        let items: Vec<OrderItem> = [dec!(0.1), dec!(0.2)]
            .into_iter()
            .map(|total| OrderItem {
                total,
                ..OrderItem::empty()
            })
            .collect();
        let totals = calc.compute_order_totals(
            &items,
            Decimal::ZERO,
            Decimal::ZERO,
            None,
            &[payment(dec!(0.3))],
        );
        assert_eq!(totals.subtotal, dec!(0.3));
        assert!(totals.remaining.is_zero());
    }

    #[test]
    fn test_remaining_never_negative() {
        let calc = PricingCalculator::default();
        let items = vec![OrderItem {
            total: dec!(100),
            ..OrderItem::empty()
        }];
        let totals = calc.compute_order_totals(
            &items,
            Decimal::ZERO,
            Decimal::ZERO,
            None,
            &[payment(dec!(150))],
        );
        assert_eq!(totals.remaining, Decimal::ZERO);
        assert_eq!(totals.paid_total, dec!(150));
    }
}
