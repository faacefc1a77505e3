//! Resource synchronization engine behind the fleetdesk admin console.
//!
//! - **[`ResourceMirror`]**: ordered, id-unique local copy of one server
//!   collection, kept in a `tokio::sync::watch` channel. Create, update,
//!   and delete are applied locally only after the server confirms them.
//!
//! - **[`Picker`]** and [`filter_by_display`]: case-insensitive search plus a
//!   single selection that never outlives the entity it names.
//!
//! - **[`NotificationChannel`]**: one transient status message at a time,
//!   cleared automatically after [`NOTIFICATION_TTL`].
//!
//! - **Screens** ([`DeviceManager`], [`OrganizationTable`],
//!   [`OrganizationMenu`], [`PaymentLedger`]): the engine wired up per
//!   use case, opened from a [`Console`].
//!
//! Every resource is described by a [`ResourceSpec`]; the engine itself is
//! generic over [`Resource`].

pub mod config;
pub mod console;
pub mod error;
pub mod model;
pub mod notify;
pub mod resource;
pub mod screen;
pub mod selection;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConsoleConfig, TlsVerification};
pub use console::Console;
pub use error::CoreError;
pub use model::{Device, Draft, EntityId, Organization, Payment};
pub use notify::{NOTIFICATION_TTL, Notification, NotificationChannel, NotificationKind};
pub use resource::{BodyKind, CreateStrategy, Resource, ResourceKind, ResourceSpec};
pub use screen::{DeviceManager, OrganizationMenu, OrganizationTable, PaymentLedger};
pub use selection::{Picker, SelectionState, filter_by_display};
pub use store::{DeleteOutcome, LoadState, MirrorState, ResourceMirror};

// Pipeline types front ends need alongside the engine.
pub use fleetdesk_api::{FilePart, OrganizationRef, SessionContext, SessionStore};
