// ── Per-resource wire configuration ──
//
// Everything that differs between organizations, devices, and payments is
// data on a `ResourceSpec`. The mirror, picker, and screens are generic
// over `Resource` and never branch on the concrete type.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::EntityId;

/// The three collections the console manages.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    Organizations,
    Devices,
    Payments,
}

/// How a request body is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    /// `multipart/form-data`, text fields plus file parts.
    Multipart,
}

/// What the mirror does after a successful create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateStrategy {
    /// Upsert the server's echo (merged over the draft) at the end.
    Append,
    /// Re-fetch the whole list.
    Reload,
}

/// Endpoint and validation table for one resource.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSpec {
    pub kind: ResourceKind,
    /// Human-readable singular, used in messages ("organization").
    pub singular: &'static str,
    pub list_path: &'static str,
    pub create_path: &'static str,
    /// Prefix of `item_path`; the id is appended as the last segment.
    pub item_base: &'static str,
    pub body_kind: BodyKind,
    pub create_strategy: CreateStrategy,
    pub required_on_create: &'static [&'static str],
    pub required_on_update: &'static [&'static str],
}

impl ResourceSpec {
    /// Path used for update and delete.
    pub fn item_path(&self, id: &EntityId) -> String {
        format!("{}/{id}", self.item_base)
    }
}

/// A server record the engine can mirror.
///
/// Implementors are plain serde structs; the engine serializes them to
/// merge update patches and deserializes server echoes into them.
pub trait Resource: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    const SPEC: ResourceSpec;

    fn id(&self) -> &EntityId;

    /// Field shown in lists and matched by search.
    fn display_name(&self) -> &str;
}
