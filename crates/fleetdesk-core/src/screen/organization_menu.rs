use std::sync::Arc;

use fleetdesk_api::{OrganizationRef, SessionContext};
use tracing::warn;

use super::ScreenContext;
use crate::error::CoreError;
use crate::model::{Draft, EntityId, Organization};
use crate::selection::{Picker, SelectionState};
use crate::store::{DeleteOutcome, ResourceMirror};

/// Switcher for the organization the session is working in.
///
/// Switching writes the session's selected-organization pointer; deleting
/// the active organization clears it.
pub struct OrganizationMenu {
    organizations: ResourceMirror<Organization>,
    picker: Picker<Organization>,
    session: SessionContext,
    ctx: ScreenContext,
}

impl OrganizationMenu {
    pub(crate) fn new(ctx: ScreenContext) -> Self {
        let organizations = ResourceMirror::new(Arc::clone(&ctx.client), ctx.cancel.clone());
        let picker = Picker::new(&organizations);
        Self {
            organizations,
            picker,
            session: ctx.client.session().clone(),
            ctx,
        }
    }

    pub fn organizations(&self) -> &ResourceMirror<Organization> {
        &self.organizations
    }

    /// Load the list and drop a session pointer whose organization is gone.
    pub async fn mount(&mut self) -> Result<(), CoreError> {
        let result = self.organizations.load().await;
        self.picker.reconcile();
        let result = result.and_then(|()| self.forget_dangling_pointer());
        self.ctx.settle(result, |_| None)
    }

    fn forget_dangling_pointer(&self) -> Result<(), CoreError> {
        let Some(active) = self.session.selected_organization() else {
            return Ok(());
        };
        if self.organizations.get(&EntityId::from(active.id.as_str())).is_none() {
            warn!(id = %active.id, name = %active.name, "active organization no longer exists");
            self.session.select_organization(None)?;
        }
        Ok(())
    }

    /// The organization the session points at, if any.
    pub fn active(&self) -> Option<OrganizationRef> {
        self.session.selected_organization()
    }

    pub fn search(&mut self, text: &str) {
        self.picker.type_text(text);
    }

    pub fn candidates(&self) -> Vec<Arc<Organization>> {
        self.picker.candidates()
    }

    pub fn picker(&self) -> &Picker<Organization> {
        &self.picker
    }

    /// Make `id` the active organization.
    pub fn switch_to(&mut self, id: &EntityId) -> Result<OrganizationRef, CoreError> {
        let result = self.picker.pick(id).and_then(|s| self.activate(s));
        self.ctx
            .settle(result, |org| Some(format!("Switched to {}", org.name)))
    }

    /// Make the organization matched by the typed text active.
    pub fn switch_to_typed(&mut self) -> Result<OrganizationRef, CoreError> {
        let result = self
            .picker
            .require_selection()
            .and_then(|s| self.activate(s));
        self.ctx
            .settle(result, |org| Some(format!("Switched to {}", org.name)))
    }

    fn activate(&self, selection: SelectionState) -> Result<OrganizationRef, CoreError> {
        let org = OrganizationRef {
            id: selection.id.to_string(),
            name: selection.display_name,
        };
        self.session.select_organization(Some(org.clone()))?;
        Ok(org)
    }

    pub async fn create(&self, draft: Draft) -> Result<Option<Arc<Organization>>, CoreError> {
        let result = self.organizations.create(draft).await;
        self.ctx
            .settle(result, |_| Some("Organization created".into()))
    }

    pub async fn delete(
        &mut self,
        id: &EntityId,
        confirm: impl FnOnce(&Organization) -> bool,
    ) -> Result<DeleteOutcome, CoreError> {
        let result = match self.organizations.delete(id, confirm).await {
            Ok(DeleteOutcome::Deleted) => {
                self.picker.reconcile();
                self.session
                    .forget_organization(&id.to_string())
                    .map(|_| DeleteOutcome::Deleted)
                    .map_err(CoreError::from)
            }
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
