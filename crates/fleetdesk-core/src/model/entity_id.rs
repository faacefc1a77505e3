// ── Entity identity ──
//
// Servers hand out UUIDs, opaque strings, or plain integers as ids. The
// wire shape is kept for round-tripping while equality and hashing work on
// the textual form, so `2` from a JSON body and `"2"` from a command line
// name the same entity.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical identifier for any server record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Numeric(u64),
    Uuid(Uuid),
    Text(String),
}

impl EntityId {
    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            _ => None,
        }
    }

    fn canonical(&self) -> Cow<'_, str> {
        match self {
            Self::Numeric(n) => Cow::Owned(n.to_string()),
            Self::Uuid(u) => Cow::Owned(u.hyphenated().to_string()),
            Self::Text(s) => Cow::Borrowed(s),
        }
    }
}

impl PartialEq for EntityId {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for EntityId {}

impl Hash for EntityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<Uuid> for EntityId {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        Self::Numeric(n)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        match Uuid::parse_str(&s) {
            Ok(u) => Self::Uuid(u),
            Err(_) => Self::Text(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_and_text_forms_compare_equal() {
        let wire: EntityId = serde_json::from_value(json!(2)).unwrap();
        assert!(matches!(wire, EntityId::Numeric(2)));
        assert_eq!(wire, EntityId::from("2"));
    }

    #[test]
    fn uuid_strings_are_recognized() {
        let id: EntityId =
            serde_json::from_value(json!("550e8400-e29b-41d4-a716-446655440000")).unwrap();
        assert!(id.as_uuid().is_some());
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn wire_shape_survives_serialization() {
        let ids: Vec<EntityId> = serde_json::from_value(json!([7, "abc"])).unwrap();
        assert_eq!(serde_json::to_value(&ids).unwrap(), json!([7, "abc"]));
    }

    #[test]
    fn hash_follows_textual_form() {
        let mut set = std::collections::HashSet::new();
        set.insert(EntityId::Numeric(5));
        assert!(set.contains(&EntityId::from("5")));
    }
}
