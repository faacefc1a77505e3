// fleetdesk-api: request pipeline for the fleetdesk admin REST service.
//
// Bearer-token session, JSON and multipart bodies, and a single normalized
// error shape for server and transport failures.

pub mod body;
pub mod client;
pub mod error;
pub mod session;
pub mod transport;

pub use body::{FilePart, MultipartBody, RequestBody};
pub use client::{ApiClient, Method};
pub use error::{Error, RequestError};
pub use session::{
    MemorySessionStore, OrganizationRef, PersistedSession, SessionContext, SessionStore,
};
pub use transport::{TlsMode, TransportConfig};
