// Session context
//
// The bearer credential and the "selected organization" pointer are shared
// by every screen. They live behind an `ArcSwap` so readers always see a
// whole snapshot; writers replace it wholesale (last write wins) and then
// write through to the optional persistent store.

use std::sync::Arc;

use arc_swap::ArcSwap;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

/// Weak pointer to the organization the user is working in.
///
/// Carries only the id and a cached display name. It does not own the
/// entity; the organization may have been deleted server-side since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRef {
    pub id: String,
    pub name: String,
}

/// Key/value layout of the persisted session.
///
/// Field names match the storage keys (`accessToken`, `refreshToken`,
/// `selectedOrganizationId`, `selectedOrganizationName`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_organization_name: Option<String>,
}

/// Where the session is persisted between runs.
///
/// Pure get/set: implementations hold no logic beyond reading and writing
/// the [`PersistedSession`] record.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<PersistedSession, Error>;
    fn save(&self, session: &PersistedSession) -> Result<(), Error>;
}

/// Process-local store, used by tests and one-shot invocations.
pub struct MemorySessionStore {
    record: ArcSwap<PersistedSession>,
}

impl MemorySessionStore {
    pub fn new(initial: PersistedSession) -> Self {
        Self {
            record: ArcSwap::from_pointee(initial),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(PersistedSession::default())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<PersistedSession, Error> {
        Ok((**self.record.load()).clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), Error> {
        self.record.store(Arc::new(session.clone()));
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct SessionState {
    access_token: Option<SecretString>,
    refresh_token: Option<SecretString>,
    selected_organization: Option<OrganizationRef>,
}

impl SessionState {
    fn from_persisted(record: PersistedSession) -> Self {
        let selected_organization = match (
            record.selected_organization_id,
            record.selected_organization_name,
        ) {
            (Some(id), name) if !id.is_empty() => Some(OrganizationRef {
                id,
                name: name.unwrap_or_default(),
            }),
            _ => None,
        };
        Self {
            access_token: record
                .access_token
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
            refresh_token: record
                .refresh_token
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
            selected_organization,
        }
    }

    fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            access_token: self
                .access_token
                .as_ref()
                .map(|t| t.expose_secret().to_owned()),
            refresh_token: self
                .refresh_token
                .as_ref()
                .map(|t| t.expose_secret().to_owned()),
            selected_organization_id: self.selected_organization.as_ref().map(|o| o.id.clone()),
            selected_organization_name: self
                .selected_organization
                .as_ref()
                .map(|o| o.name.clone()),
        }
    }
}

struct SessionInner {
    state: ArcSwap<SessionState>,
    store: Option<Arc<dyn SessionStore>>,
}

/// Shared handle to the credential and selected-organization pointer.
///
/// Cheaply cloneable. Every component that needs the credential receives a
/// clone explicitly; nothing reads ambient global state.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .field("selected_organization", &self.selected_organization())
            .field("persistent", &self.inner.store.is_some())
            .finish()
    }
}

impl SessionContext {
    /// An empty, unauthenticated session that is never persisted.
    pub fn in_memory() -> Self {
        Self::from_state(SessionState::default(), None)
    }

    /// An in-memory session already holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        let state = SessionState {
            access_token: Some(SecretString::from(token.into())),
            ..SessionState::default()
        };
        Self::from_state(state, None)
    }

    /// Restore a session from `store`; later writes are written back to it.
    pub fn restore(store: Arc<dyn SessionStore>) -> Result<Self, Error> {
        let record = store.load()?;
        debug!(
            authenticated = record.access_token.is_some(),
            "restored session from store"
        );
        Ok(Self::from_state(
            SessionState::from_persisted(record),
            Some(store),
        ))
    }

    fn from_state(state: SessionState, store: Option<Arc<dyn SessionStore>>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                state: ArcSwap::from_pointee(state),
                store,
            }),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn access_token(&self) -> Option<SecretString> {
        self.inner.state.load().access_token.clone()
    }

    /// The bearer token, or [`Error::Unauthenticated`] when none is set.
    pub fn require_token(&self) -> Result<SecretString, Error> {
        self.access_token().ok_or(Error::Unauthenticated)
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.load().access_token.is_some()
    }

    pub fn refresh_token(&self) -> Option<SecretString> {
        self.inner.state.load().refresh_token.clone()
    }

    pub fn selected_organization(&self) -> Option<OrganizationRef> {
        self.inner.state.load().selected_organization.clone()
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Store the tokens obtained from a successful sign-in.
    pub fn set_tokens(
        &self,
        access: SecretString,
        refresh: Option<SecretString>,
    ) -> Result<(), Error> {
        self.update(|state| {
            state.access_token = Some(access.clone());
            state.refresh_token = refresh.clone();
        })
    }

    /// Drop both tokens and the selected organization.
    pub fn clear(&self) -> Result<(), Error> {
        self.update(|state| *state = SessionState::default())
    }

    /// Point the session at `org`, or clear the pointer with `None`.
    pub fn select_organization(&self, org: Option<OrganizationRef>) -> Result<(), Error> {
        self.update(|state| state.selected_organization = org.clone())
    }

    /// Clear the selected-organization pointer if it refers to `id`.
    ///
    /// Returns `true` when the pointer was cleared.
    pub fn forget_organization(&self, id: &str) -> Result<bool, Error> {
        let matches = self
            .selected_organization()
            .is_some_and(|org| org.id == id);
        if matches {
            self.select_organization(None)?;
        }
        Ok(matches)
    }

    fn update(&self, apply: impl Fn(&mut SessionState)) -> Result<(), Error> {
        self.inner.state.rcu(|current| {
            let mut next = SessionState::clone(current);
            apply(&mut next);
            next
        });

        if let Some(store) = &self.inner.store {
            store.save(&self.inner.state.load().to_persisted())?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_session_requires_token() {
        let session = SessionContext::in_memory();
        assert!(matches!(session.require_token(), Err(Error::Unauthenticated)));
    }

    #[test]
    fn writes_go_through_to_store() {
        let store = Arc::new(MemorySessionStore::default());
        let session = SessionContext::restore(store.clone()).unwrap();

        session
            .set_tokens(SecretString::from("abc"), Some(SecretString::from("r1")))
            .unwrap();
        session
            .select_organization(Some(OrganizationRef {
                id: "7".into(),
                name: "Acme".into(),
            }))
            .unwrap();

        let saved = store.load().unwrap();
        assert_eq!(saved.access_token.as_deref(), Some("abc"));
        assert_eq!(saved.refresh_token.as_deref(), Some("r1"));
        assert_eq!(saved.selected_organization_id.as_deref(), Some("7"));
        assert_eq!(saved.selected_organization_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn persisted_layout_uses_camel_case_keys() {
        let record = PersistedSession {
            access_token: Some("t".into()),
            refresh_token: None,
            selected_organization_id: Some("1".into()),
            selected_organization_name: Some("Org A".into()),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["accessToken"], "t");
        assert_eq!(json["selectedOrganizationId"], "1");
        assert_eq!(json["selectedOrganizationName"], "Org A");
        assert!(json.get("refreshToken").is_none());
    }

    #[test]
    fn blank_stored_token_counts_as_absent() {
        let store = Arc::new(MemorySessionStore::new(PersistedSession {
            access_token: Some(String::new()),
            ..PersistedSession::default()
        }));
        let session = SessionContext::restore(store).unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn forget_organization_only_clears_matching_pointer() {
        let session = SessionContext::with_token("t");
        session
            .select_organization(Some(OrganizationRef {
                id: "1".into(),
                name: "Org A".into(),
            }))
            .unwrap();

        assert!(!session.forget_organization("2").unwrap());
        assert!(session.selected_organization().is_some());
        assert!(session.forget_organization("1").unwrap());
        assert!(session.selected_organization().is_none());
    }

    #[test]
    fn clear_drops_everything() {
        let session = SessionContext::with_token("t");
        session.clear().unwrap();
        assert!(session.access_token().is_none());
        assert!(session.selected_organization().is_none());
    }
}
