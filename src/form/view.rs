//! Abstraction over the rendered order form

use std::time::Duration;

/// Addressable field of the order form
///
/// Input fields are read by the reconciler; display fields are only ever
/// written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    // Item row inputs
    ItemQuantity(usize),
    ItemUnitPrice(usize),
    ItemWidth(usize),
    ItemHeight(usize),
    ItemDescription(usize),
    // Item row displays
    ItemArea(usize),
    ItemTotal(usize),

    // Payment row inputs
    PaymentMethod(usize),
    PaymentAmount(usize),
    PaymentDate(usize),
    PaymentReference(usize),

    // Order level inputs
    Discount,
    ExtraServices,
    DeliveryCost,
    DeliveryType,

    // Summary displays
    Subtotal,
    DiscountDisplay,
    ExtrasDisplay,
    GrandTotal,
    PaidTotal,
    Remaining,
}

impl FieldKey {
    /// Whether the field is a computed display the user cannot type into
    pub fn is_display(&self) -> bool {
        matches!(
            self,
            FieldKey::ItemArea(_)
                | FieldKey::ItemTotal(_)
                | FieldKey::Subtotal
                | FieldKey::DiscountDisplay
                | FieldKey::ExtrasDisplay
                | FieldKey::GrandTotal
                | FieldKey::PaidTotal
                | FieldKey::Remaining
        )
    }
}

/// The rendered form as seen by the reconciler
pub trait FormView: Send {
    /// Current raw text of a field, `None` when it is not rendered
    fn read(&self, key: FieldKey) -> Option<String>;

    /// Replace the text of a field
    fn write(&mut self, key: FieldKey, value: &str);

    /// Visual change cue on a field for `duration`
    fn highlight(&mut self, key: FieldKey, duration: Duration);
}
