// ── Payment domain type ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::entity_id::EntityId;
use crate::resource::{BodyKind, CreateStrategy, Resource, ResourceKind, ResourceSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: EntityId,
    /// Invoice or transfer reference; the display field.
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        rename = "organizationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub organization_id: Option<EntityId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Payment {
    const SPEC: ResourceSpec = ResourceSpec {
        kind: ResourceKind::Payments,
        singular: "payment",
        list_path: "payments",
        create_path: "payments",
        item_base: "payments",
        body_kind: BodyKind::Json,
        create_strategy: CreateStrategy::Append,
        required_on_create: &["reference", "amount"],
        required_on_update: &[],
    };

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.reference
    }
}
