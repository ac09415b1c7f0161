//! The order form: state, view abstraction, reconciliation and the editor
//! that wires them to persistence and notifications

pub mod editor;
pub mod reconciler;
pub mod state;
pub mod view;

pub use editor::{EditorServices, OrderEditor};
pub use reconciler::FormReconciler;
pub use state::{
    FormContext, FormPhase, ItemField, OrderFormState, PaymentField, ProductionProgress,
};
pub use view::{FieldKey, FormView};
