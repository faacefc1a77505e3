// ── Domain model ──

pub mod device;
pub mod draft;
pub mod entity_id;
pub mod organization;
pub mod payment;

pub use device::Device;
pub use draft::Draft;
pub use entity_id::EntityId;
pub use organization::Organization;
pub use payment::Payment;
