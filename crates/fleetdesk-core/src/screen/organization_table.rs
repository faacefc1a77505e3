use std::sync::Arc;

use fleetdesk_api::SessionContext;

use super::ScreenContext;
use crate::error::CoreError;
use crate::model::{Draft, EntityId, Organization};
use crate::selection::filter_by_display;
use crate::store::{DeleteOutcome, ResourceMirror};

/// Tabular list of organizations with create, rename, and delete.
pub struct OrganizationTable {
    organizations: ResourceMirror<Organization>,
    session: SessionContext,
    ctx: ScreenContext,
}

impl OrganizationTable {
    pub(crate) fn new(ctx: ScreenContext) -> Self {
        Self {
            organizations: ResourceMirror::new(Arc::clone(&ctx.client), ctx.cancel.clone()),
            session: ctx.client.session().clone(),
            ctx,
        }
    }

    pub fn organizations(&self) -> &ResourceMirror<Organization> {
        &self.organizations
    }

    /// Load the list. Failures are also posted as a notification.
    pub async fn mount(&self) -> Result<(), CoreError> {
        let result = self.organizations.load().await;
        self.ctx.settle(result, |_| None)
    }

    /// Rows matching `query`, in server order.
    pub fn rows(&self, query: &str) -> Vec<Arc<Organization>> {
        filter_by_display(&self.organizations.snapshot(), query)
    }

    pub async fn create(&self, draft: Draft) -> Result<Option<Arc<Organization>>, CoreError> {
        let result = self.organizations.create(draft).await;
        self.ctx
            .settle(result, |_| Some("Organization created".into()))
    }

    pub async fn update(&self, id: &EntityId, patch: Draft) -> Result<(), CoreError> {
        let result = self.organizations.update(id, patch).await;
        self.ctx
            .settle(result, |_| Some("Organization updated".into()))
    }

    /// Delete after confirmation. Deleting the organization the session
    /// points at also clears that pointer.
    pub async fn delete(
        &self,
        id: &EntityId,
        confirm: impl FnOnce(&Organization) -> bool,
    ) -> Result<DeleteOutcome, CoreError> {
        let result = match self.organizations.delete(id, confirm).await {
            Ok(DeleteOutcome::Deleted) => self
                .session
                .forget_organization(&id.to_string())
                .map(|_| DeleteOutcome::Deleted)
                .map_err(CoreError::from),
            other => other,
        };
        self.ctx.settle(result, |outcome| {
            (*outcome == DeleteOutcome::Deleted).then(|| "Organization deleted".into())
        })
    }

    pub fn close(&self) {
        self.ctx.cancel.cancel();
    }
}
