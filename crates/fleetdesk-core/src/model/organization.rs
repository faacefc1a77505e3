// ── Organization domain type ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::entity_id::EntityId;
use crate::resource::{BodyKind, CreateStrategy, Resource, ResourceKind, ResourceSpec};

/// Tenant that owns devices and payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: EntityId,
    pub name: String,
    /// Fields this client does not model, kept for round-tripping.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Organization {
    const SPEC: ResourceSpec = ResourceSpec {
        kind: ResourceKind::Organizations,
        singular: "organization",
        list_path: "organizations",
        create_path: "organizations",
        item_base: "organizations",
        body_kind: BodyKind::Json,
        create_strategy: CreateStrategy::Append,
        required_on_create: &["name"],
        required_on_update: &["name"],
    };

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_round_trip() {
        let raw = json!({ "id": "1", "name": "Org A", "plan": "gold" });
        let org: Organization = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(org.extra["plan"], "gold");
        assert_eq!(serde_json::to_value(&org).unwrap(), raw);
    }

    #[test]
    fn name_is_required() {
        let result = serde_json::from_value::<Organization>(json!({ "id": "1" }));
        assert!(result.is_err());
    }
}
