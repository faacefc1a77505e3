use std::sync::Arc;

use super::ScreenContext;
use crate::error::CoreError;
use crate::model::{Draft, EntityId, Payment};
use crate::selection::filter_by_display;
use crate::store::{DeleteOutcome, ResourceMirror};

/// Payments list with search by reference.
pub struct PaymentLedger {
    payments: ResourceMirror<Payment>,
    ctx: ScreenContext,
}

impl PaymentLedger {
    pub(crate) fn new(ctx: ScreenContext) -> Self {
        Self {
            payments: ResourceMirror::new(Arc::clone(&ctx.client), ctx.cancel.clone()),
            ctx,
        }
    }

    pub fn payments(&self) -> &ResourceMirror<Payment> {
        &self.payments
    }

    pub async fn mount(&self) -> Result<(), CoreError> {
        let result = self.payments.load().await;
        self.ctx.settle(result, |_| None)
    }

    pub fn rows(&self, query: &str) -> Vec<Arc<Payment>> {
        filter_by_display(&self.payments.snapshot(), query)
    }

    pub async fn create(&self, draft: Draft) -> Result<Option<Arc<Payment>>, CoreError> {
        let result = self.payments.create(draft).await;
        self.ctx.settle(result, |_| Some("Payment recorded".into()))
    }

    pub async fn update(&self, id: &EntityId, patch: Draft) -> Result<(), CoreError> {
        let result = self.payments.update(id, patch).await;
        self.ctx.settle(result, |_| Some("Payment updated".into()))
    }

    pub async fn delete(
        &self,
        id: &EntityId,
        confirm: impl FnOnce(&Payment) -> bool,
    ) -> Result<DeleteOutcome, CoreError> {
        let result = self.payments.delete(id, confirm).await;
        self.ctx.settle(result, |outcome| {
            (*outcome == DeleteOutcome::Deleted).then(|| "Payment deleted".into())
        })
    }

    pub fn close(&self) {
        self.ctx.cancel.cancel();
    }
}
