//! Narrow interfaces to the user interface and session collaborators
//!
//! The order engine never talks to the browser directly. Confirmation
//! dialogs, toasts, the authenticated session and persisted preferences are
//! all injected through the traits below.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Interactive yes/no prompt
#[async_trait]
pub trait ConfirmDialog: Send + Sync {
    /// Ask the user to confirm `message`; `true` means "proceed"
    async fn confirm(&self, message: &str) -> bool;
}

/// Confirmation provider for non-interactive flows (seeding, imports)
///
/// Approves every prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

#[async_trait]
impl ConfirmDialog for AlwaysConfirm {
    async fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// Severity of a toast notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Toast/notification provider
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// The authenticated user acting as seller on new orders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    pub id: String,
    pub name: String,
}

impl Seller {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Source of the currently authenticated user
pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Option<Seller>;
}

/// Session provider used when authentication is not wired in
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSession;

impl SessionProvider for NoSession {
    fn current_user(&self) -> Option<Seller> {
        None
    }
}

/// Cross-session user preferences (e.g. the chosen list sort order)
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}
