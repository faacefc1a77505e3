// ── Device domain type ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::entity_id::EntityId;
use crate::resource::{BodyKind, CreateStrategy, Resource, ResourceKind, ResourceSpec};

/// A managed device, always created under an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: EntityId,
    pub name: String,
    #[serde(
        rename = "organizationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub organization_id: Option<EntityId>,
    /// Image URL as served, or a local `file://` reference right after an
    /// upload until the next reload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Device {
    const SPEC: ResourceSpec = ResourceSpec {
        kind: ResourceKind::Devices,
        singular: "device",
        list_path: "devices",
        create_path: "devices",
        item_base: "devices",
        body_kind: BodyKind::Multipart,
        create_strategy: CreateStrategy::Reload,
        required_on_create: &["name", "organizationId"],
        required_on_update: &["name"],
    };

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}
