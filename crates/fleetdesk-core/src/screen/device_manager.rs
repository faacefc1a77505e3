use std::sync::Arc;

use tracing::debug;

use super::ScreenContext;
use crate::error::CoreError;
use crate::model::{Device, Draft, EntityId, Organization};
use crate::selection::{Picker, SelectionState, filter_by_display};
use crate::store::{DeleteOutcome, ResourceMirror};

/// Device list plus the organization picker a new device is filed under.
///
/// Owns two mirrors that load concurrently on mount.
pub struct DeviceManager {
    devices: ResourceMirror<Device>,
    organizations: ResourceMirror<Organization>,
    picker: Picker<Organization>,
    ctx: ScreenContext,
}

impl DeviceManager {
    pub(crate) fn new(ctx: ScreenContext) -> Self {
        let devices = ResourceMirror::new(Arc::clone(&ctx.client), ctx.cancel.clone());
        let organizations = ResourceMirror::new(Arc::clone(&ctx.client), ctx.cancel.clone());
        let picker = Picker::new(&organizations);
        Self {
            devices,
            organizations,
            picker,
            ctx,
        }
    }

    pub fn devices(&self) -> &ResourceMirror<Device> {
        &self.devices
    }

    pub fn organizations(&self) -> &ResourceMirror<Organization> {
        &self.organizations
    }

    /// Load devices and organizations together; either may finish first.
    pub async fn mount(&mut self) -> Result<(), CoreError> {
        let (devices, organizations) =
            tokio::join!(self.devices.load(), self.organizations.load());
        self.picker.reconcile();
        self.ctx.settle(devices.and(organizations), |_| None)
    }

    pub fn rows(&self, query: &str) -> Vec<Arc<Device>> {
        filter_by_display(&self.devices.snapshot(), query)
    }

    // ── Organization picker ──────────────────────────────────────────

    pub fn search_organization(&mut self, text: &str) {
        self.picker.type_text(text);
    }

    pub fn organization_candidates(&self) -> Vec<Arc<Organization>> {
        self.picker.candidates()
    }

    pub fn pick_organization(&mut self, id: &EntityId) -> Result<SelectionState, CoreError> {
        self.picker.pick(id)
    }

    pub fn selected_organization(&self) -> Option<&SelectionState> {
        self.picker.selection()
    }

    pub fn picker(&self) -> &Picker<Organization> {
        &self.picker
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Create a device under the picked organization.
    ///
    /// The organization comes from the picker and overrides any
    /// `organizationId` in `draft`. The device list is reloaded afterwards,
    /// so the result is normally `None`.
    pub async fn create(&mut self, draft: Draft) -> Result<Option<Arc<Device>>, CoreError> {
        let result = self.try_create(draft).await;
        self.ctx.settle(result, |_| Some("Device created".into()))
    }

    async fn try_create(&mut self, mut draft: Draft) -> Result<Option<Arc<Device>>, CoreError> {
        self.devices.ensure_mutable()?;
        let parent = self.picker.require_selection()?;
        let parent_id = serde_json::to_value(&parent.id)
            .map_err(|e| CoreError::Internal(format!("cannot encode organization id: {e}")))?;
        draft.set("organizationId", parent_id);
        debug!(organization = %parent.display_name, "creating device");

        let created = self.devices.create(draft).await?;
        self.picker.clear();
        Ok(created)
    }

    /// Rename a device or replace its image.
    pub async fn update(&self, id: &EntityId, patch: Draft) -> Result<(), CoreError> {
        let result = self.devices.update(id, patch).await;
        self.ctx.settle(result, |_| Some("Device updated".into()))
    }

    pub async fn delete(
        &self,
        id: &EntityId,
        confirm: impl FnOnce(&Device) -> bool,
    ) -> Result<DeleteOutcome, CoreError> {
        let result = self.devices.delete(id, confirm).await;
        self.ctx.settle(result, |outcome| {
            (*outcome == DeleteOutcome::Deleted).then(|| "Device deleted".into())
        })
    }

    pub fn close(&self) {
        self.ctx.cancel.cancel();
    }
}
