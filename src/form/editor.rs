//! Order form controller
//!
//! [`OrderEditor`] is what a page binds its events to. It owns the form
//! state and the view, routes input through the reconciler, persists through
//! the adapter and turns every outcome into a notification.

use crate::core::collaborators::{ConfirmDialog, NoticeLevel, Notifier, SessionProvider};
use crate::core::error::{OrderError, OrderResult, ValidationError};
use crate::core::locale::format_currency;
use crate::core::store::DocumentStore;
use crate::entities::{ClientCategory, ClientSnapshot};
use crate::form::reconciler::FormReconciler;
use crate::form::state::{FormContext, FormPhase, OrderFormState};
use crate::form::view::FormView;
use crate::listing::OpenOrderChange;
use crate::persistence::OrderPersistenceAdapter;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Injected collaborators of an editor
#[derive(Clone)]
pub struct EditorServices {
    pub store: Arc<dyn DocumentStore>,
    pub confirm: Arc<dyn ConfirmDialog>,
    pub notifier: Arc<dyn Notifier>,
    pub session: Arc<dyn SessionProvider>,
}

pub struct OrderEditor<V: FormView> {
    state: OrderFormState,
    view: V,
    reconciler: FormReconciler,
    adapter: OrderPersistenceAdapter,
    services: EditorServices,
}

impl<V: FormView> OrderEditor<V> {
    pub fn new(ctx: FormContext, view: V, services: EditorServices) -> Self {
        let reconciler = FormReconciler::new(&ctx.config);
        let adapter = OrderPersistenceAdapter::new(
            Arc::clone(&services.store),
            Arc::clone(&services.confirm),
            Arc::clone(&ctx.config),
        );
        Self {
            state: OrderFormState::new(ctx),
            view,
            reconciler,
            adapter,
            services,
        }
    }

    /// Open a blank order for the signed-in user
    pub fn start_new(&mut self, now: DateTime<Utc>) {
        let seller = self.services.session.current_user();
        self.state.init_new(seller, now);
        self.reconciler.render(&self.state, &mut self.view);
    }

    /// Load a persisted order into the form
    pub async fn open(&mut self, id: &str, now: DateTime<Utc>) -> OrderResult<()> {
        match self.adapter.load(id).await {
            Ok(document) => {
                self.state.init_from_existing(id, &document, now);
                self.reconciler.render(&self.state, &mut self.view);
                Ok(())
            }
            Err(err) => Err(self.report(err)),
        }
    }

    pub fn on_item_input(&mut self, index: usize) -> bool {
        self.reconciler
            .reconcile_item_row(&mut self.state, &mut self.view, index)
    }

    pub fn on_payment_input(&mut self, index: usize) -> bool {
        self.reconciler
            .reconcile_payment_row(&mut self.state, &mut self.view, index)
    }

    pub fn on_order_input(&mut self) -> bool {
        self.reconciler
            .reconcile_order_level(&mut self.state, &mut self.view)
    }

    pub fn add_item(&mut self, product_id: Option<&str>) -> usize {
        let index = self.state.add_item(product_id);
        self.reconciler.render(&self.state, &mut self.view);
        index
    }

    pub async fn remove_item(&mut self, index: usize) -> bool {
        let removed = self
            .state
            .remove_item(index, self.services.confirm.as_ref())
            .await;
        if removed {
            self.reconciler.render(&self.state, &mut self.view);
        }
        removed
    }

    pub fn add_payment(&mut self, now: DateTime<Utc>) -> usize {
        let index = self.state.add_payment(now);
        self.reconciler.render(&self.state, &mut self.view);
        index
    }

    pub fn remove_payment(&mut self, index: usize) -> bool {
        let removed = self.state.remove_payment(index);
        if removed {
            self.reconciler.render(&self.state, &mut self.view);
        }
        removed
    }

    pub async fn select_client(&mut self, client: ClientSnapshot) {
        self.state
            .select_client(client, self.services.confirm.as_ref())
            .await;
        self.reconciler.render(&self.state, &mut self.view);
    }

    /// Switch the pricing tier, asking before manual prices are overwritten
    pub async fn set_client_category(&mut self, category: ClientCategory) -> bool {
        let repriced = self
            .state
            .set_client_category(category, self.services.confirm.as_ref())
            .await;
        self.reconciler.render(&self.state, &mut self.view);
        repriced
    }

    /// Save and notify the outcome
    pub async fn save(&mut self) -> OrderResult<String> {
        let is_edit = self.state.is_persisted();
        match self.adapter.save(&mut self.state, is_edit).await {
            Ok(id) => {
                let message = format!(
                    "Pedido {} salvo. Total {}",
                    self.state.order_number(),
                    format_currency(
                        self.state.totals().grand_total,
                        &self.state.context().config.display.currency_symbol
                    )
                );
                self.services.notifier.notify(NoticeLevel::Success, &message);
                Ok(id)
            }
            Err(err) => Err(self.report(err)),
        }
    }

    /// Delete the open order after confirmation
    pub async fn delete(&mut self) -> OrderResult<bool> {
        let Some(id) = self.state.id().map(String::from) else {
            return Err(self.report(ValidationError::MissingId.into()));
        };
        match self.adapter.delete(&id).await {
            Ok(true) => {
                self.state.mark_deleted();
                self.services
                    .notifier
                    .notify(NoticeLevel::Success, "Pedido excluído.");
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(err) => Err(self.report(err)),
        }
    }

    /// React to a remote change of the open order
    ///
    /// The echo of this form's own save carries the `updatedAt` it wrote and
    /// is ignored. Returns whether the form was reloaded or closed.
    pub fn apply_remote(&mut self, change: &OpenOrderChange, now: DateTime<Utc>) -> bool {
        match change {
            OpenOrderChange::Modified(record) => {
                if self.state.is_own_version(record.document.updated_at.as_ref()) {
                    tracing::debug!(order_id = %record.id, "own save echoed by the feed, ignored");
                    return false;
                }
                self.state.init_from_existing(&record.id, &record.document, now);
                self.reconciler.render(&self.state, &mut self.view);
                self.services.notifier.notify(
                    NoticeLevel::Info,
                    "Este pedido foi alterado em outra sessão e foi recarregado.",
                );
                true
            }
            OpenOrderChange::Deleted(_) => {
                self.state.mark_deleted();
                self.services.notifier.notify(
                    NoticeLevel::Warning,
                    "Este pedido foi excluído em outra sessão.",
                );
                true
            }
        }
    }

    fn report(&self, err: OrderError) -> OrderError {
        let notice = err.to_notice();
        self.services.notifier.notify(notice.level, &notice.message);
        err
    }

    pub fn state(&self) -> &OrderFormState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut OrderFormState {
        &mut self.state
    }

    pub fn phase(&self) -> FormPhase {
        self.state.phase()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}
