//! Core module containing the store abstraction, error taxonomy and the
//! small parsing/formatting primitives the rest of the engine builds on

pub mod collaborators;
pub mod date;
pub mod error;
pub mod events;
pub mod locale;
pub mod query;
pub mod store;

pub use collaborators::{
    AlwaysConfirm, ConfirmDialog, NoSession, NoticeLevel, Notifier, Seller, SessionProvider,
    SettingsStore,
};
pub use date::DateLike;
pub use error::{
    ConfigError, ErrorNotice, NotFoundError, OrderError, OrderResult, StorageError,
    ValidationError,
};
pub use events::{ChangeFeed, ChangeKind, DocumentChange, EventBus, FeedEvent};
pub use locale::ParseError;
pub use query::{Query, SortDirection, WhereOp};
pub use store::{Document, DocumentStore};
