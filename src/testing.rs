//! Test doubles for the injected collaborators
//!
//! Scriptable in-process implementations of [`ConfirmDialog`], [`Notifier`],
//! [`SessionProvider`], [`SettingsStore`] and [`FormView`], shared by unit
//! tests, integration tests and the demo, plus [`CapturedLogs`] for
//! asserting on what was logged.

use crate::core::collaborators::{
    ConfirmDialog, NoticeLevel, Notifier, Seller, SessionProvider, SettingsStore,
};
use crate::form::view::{FieldKey, FormView};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Confirmation dialog answering from a script
///
/// Answers are consumed in order; once the script is exhausted the fallback
/// answer is used. Every prompt is recorded.
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    fallback: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    /// Give the same answer to every prompt
    pub fn always(answer: bool) -> Self {
        Self {
            fallback: answer,
            ..Default::default()
        }
    }

    /// Answer the first prompts from `answers`, then decline
    pub fn answers(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Messages shown so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ConfirmDialog for ScriptedConfirm {
    async fn confirm(&self, message: &str) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(message.to_string());
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .unwrap_or(self.fallback)
    }
}

/// Notifier keeping every toast in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<(NoticeLevel, String)> {
        self.notices().pop()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        tracing::debug!(level = ?level, message, "notice");
        if let Ok(mut notices) = self.notices.lock() {
            notices.push((level, message.to_string()));
        }
    }
}

/// Session with a fixed user
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user: Option<Seller>,
}

impl StaticSession {
    pub fn new(user: Option<Seller>) -> Self {
        Self { user }
    }

    pub fn signed_in(id: &str, name: &str) -> Self {
        Self::new(Some(Seller::new(id, name)))
    }
}

impl SessionProvider for StaticSession {
    fn current_user(&self) -> Option<Seller> {
        self.user.clone()
    }
}

/// Preferences kept in a map
#[derive(Debug, Default)]
pub struct InMemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for InMemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
    }
}

/// Form view backed by a map of field texts
///
/// Inputs are set with [`type_into`](Self::type_into); writes and highlights
/// are logged so tests can assert on what the reconciler rendered.
#[derive(Debug, Default)]
pub struct RecordingFormView {
    fields: HashMap<FieldKey, String>,
    writes: Vec<(FieldKey, String)>,
    highlights: Vec<(FieldKey, Duration)>,
}

impl RecordingFormView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the user typing `text` into a field
    pub fn type_into(&mut self, key: FieldKey, text: &str) {
        self.fields.insert(key, text.to_string());
    }

    /// Current text of a field
    pub fn text(&self, key: FieldKey) -> Option<&str> {
        self.fields.get(&key).map(String::as_str)
    }

    pub fn writes(&self) -> &[(FieldKey, String)] {
        &self.writes
    }

    pub fn highlights(&self) -> &[(FieldKey, Duration)] {
        &self.highlights
    }

    pub fn is_highlighted(&self, key: FieldKey) -> bool {
        self.highlights.iter().any(|(k, _)| *k == key)
    }

    /// Forget logged writes and highlights, keeping field texts
    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.highlights.clear();
    }

    /// Snapshot of every field text, sorted for comparison
    pub fn snapshot(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = self
            .fields
            .iter()
            .map(|(k, v)| (format!("{:?}", k), v.clone()))
            .collect();
        fields.sort();
        fields
    }
}

impl FormView for RecordingFormView {
    fn read(&self, key: FieldKey) -> Option<String> {
        self.fields.get(&key).cloned()
    }

    fn write(&mut self, key: FieldKey, value: &str) {
        self.fields.insert(key, value.to_string());
        self.writes.push((key, value.to_string()));
    }

    fn highlight(&mut self, key: FieldKey, duration: Duration) {
        self.highlights.push((key, duration));
    }
}

/// Log output of one closure, formatted as the fmt subscriber prints it
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    /// Run `f` with a thread-local subscriber recording every event
    pub fn capture<T>(f: impl FnOnce() -> T) -> (T, CapturedLogs) {
        let logs = CapturedLogs::default();
        let buffer = Arc::clone(&logs.buffer);
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || CaptureWriter(Arc::clone(&buffer)))
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish();
        let value = tracing::subscriber::with_default(subscriber, f);
        (value, logs)
    }

    pub fn text(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text().contains(needle)
    }

    /// Captured lines at `WARN` level containing `needle`
    pub fn warnings_containing(&self, needle: &str) -> usize {
        self.text()
            .lines()
            .filter(|line| line.contains(" WARN ") && line.contains(needle))
            .count()
    }
}
