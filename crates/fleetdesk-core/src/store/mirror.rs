// ── Resource mirror ──
//
// Ordered, id-unique local copy of one server collection. Mutations are
// confirmed by the server before they touch local state; a failed request
// leaves the mirror exactly as it was.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use fleetdesk_api::ApiClient;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::state::{LoadState, MirrorState};
use crate::error::CoreError;
use crate::model::{Draft, EntityId};
use crate::resource::{CreateStrategy, Resource};

/// Result of a delete that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The confirmation callback said no; nothing was sent.
    Declined,
}

/// Local mirror of the server collection for `T`.
///
/// State lives in a `watch` channel so renderers can subscribe; every
/// update replaces the entity map behind an `Arc`, so snapshots handed out
/// earlier never change under the reader.
pub struct ResourceMirror<T: Resource> {
    client: Arc<ApiClient>,
    state: watch::Sender<MirrorState<T>>,
    /// Bumped by every `load()`; only the latest one may apply.
    generation: AtomicU64,
    cancel: CancellationToken,
}

impl<T: Resource> ResourceMirror<T> {
    pub fn new(client: Arc<ApiClient>, cancel: CancellationToken) -> Self {
        let (state, _) = watch::channel(MirrorState::default());
        Self {
            client,
            state,
            generation: AtomicU64::new(0),
            cancel,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn state(&self) -> MirrorState<T> {
        self.state.borrow().clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.state.borrow().load.clone()
    }

    /// Entities in server order.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.state.borrow().to_vec()
    }

    pub fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.state.borrow().get(id)
    }

    pub fn len(&self) -> usize {
        self.state.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<MirrorState<T>> {
        self.state.subscribe()
    }

    /// `true` once the owning screen has been torn down.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    // ── Load ─────────────────────────────────────────────────────────

    /// Fetch the full list and replace the local contents.
    ///
    /// A load that has been overtaken by a newer one, or that completes
    /// after teardown, is discarded and returns `Ok(())`. A failed load
    /// keeps the previous entities and records the reason.
    pub async fn load(&self) -> Result<(), CoreError> {
        if self.is_closed() {
            debug!(kind = %T::SPEC.kind, "load after close ignored");
            return Ok(());
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| s.load = LoadState::Loading);

        let result = self.fetch_all().await;

        if self.is_closed() {
            debug!(kind = %T::SPEC.kind, "late load response dropped after close");
            return Ok(());
        }
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(kind = %T::SPEC.kind, generation, "superseded load discarded");
            return Ok(());
        }

        match result {
            Ok(entities) => {
                info!(kind = %T::SPEC.kind, count = entities.len(), "mirror loaded");
                self.state.send_modify(|s| {
                    s.load = LoadState::Ready;
                    s.entities = Arc::new(entities);
                });
                Ok(())
            }
            Err(e) => {
                warn!(kind = %T::SPEC.kind, error = %e, "mirror load failed");
                let reason = e.to_string();
                self.state.send_modify(|s| s.load = LoadState::Failed(reason));
                Err(e)
            }
        }
    }

    async fn fetch_all(&self) -> Result<IndexMap<EntityId, Arc<T>>, CoreError> {
        let value = self.client.get(T::SPEC.list_path).await?;
        let items: Vec<T> = match value {
            Value::Null => Vec::new(),
            Value::Array(_) => {
                let body = value.to_string();
                serde_json::from_value(value).map_err(|e| fleetdesk_api::Error::Deserialization {
                    message: format!("unexpected {} list payload: {e}", T::SPEC.kind),
                    body,
                })?
            }
            other => {
                return Err(CoreError::Internal(format!(
                    "expected a JSON array of {}, got {}",
                    T::SPEC.kind,
                    json_kind(&other)
                )));
            }
        };

        let mut entities = IndexMap::with_capacity(items.len());
        for item in items {
            let id = item.id().clone();
            if entities.contains_key(&id) {
                warn!(kind = %T::SPEC.kind, %id, "duplicate id in list response, keeping first");
                continue;
            }
            entities.insert(id, Arc::new(item));
        }
        Ok(entities)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Local checks every mutation runs before anything else: a credential
    /// must be present and no load may be in flight.
    pub fn ensure_mutable(&self) -> Result<(), CoreError> {
        self.client.session().require_token()?;
        if self.load_state().is_loading() {
            return Err(CoreError::NotReady {
                kind: T::SPEC.kind,
            });
        }
        Ok(())
    }

    /// Create a record from `draft`.
    ///
    /// Returns the new entity when the server's echo was usable and the
    /// resource appends; `None` when the list was reloaded instead (or the
    /// screen closed while the request was in flight). Once the server has
    /// accepted the record, a failed reload does not fail the create: the
    /// stale list is recorded in `LoadState::Failed`.
    pub async fn create(&self, draft: Draft) -> Result<Option<Arc<T>>, CoreError> {
        if self.is_closed() {
            return Ok(None);
        }
        self.ensure_mutable()?;
        draft.require(T::SPEC.required_on_create)?;

        let echo = self
            .client
            .post(T::SPEC.create_path, draft.clone().into_body(T::SPEC.body_kind))
            .await?;

        if self.is_closed() {
            debug!(kind = %T::SPEC.kind, "create response dropped after close");
            return Ok(None);
        }

        if T::SPEC.create_strategy == CreateStrategy::Append {
            if let Some(entity) = draft.resolve_echo::<T>(&echo) {
                let entity = Arc::new(entity);
                self.upsert(Arc::clone(&entity));
                return Ok(Some(entity));
            }
            warn!(kind = %T::SPEC.kind, "create echo unusable, reloading list");
        }

        if let Err(e) = self.load().await {
            warn!(kind = %T::SPEC.kind, error = %e, "created, but the list could not be reloaded");
        }
        Ok(None)
    }

    /// Send `patch` as a PUT and, once the server accepts it, merge it into
    /// the local entity.
    pub async fn update(&self, id: &EntityId, patch: Draft) -> Result<(), CoreError> {
        if self.is_closed() {
            return Ok(());
        }
        self.ensure_mutable()?;
        patch.require(T::SPEC.required_on_update)?;
        let current = self.get(id).ok_or_else(|| self.not_found(id))?;
        patch.apply_to(&*current)?;

        self.client
            .put(&T::SPEC.item_path(id), patch.clone().into_body(T::SPEC.body_kind))
            .await?;

        if self.is_closed() {
            debug!(kind = %T::SPEC.kind, %id, "update response dropped after close");
            return Ok(());
        }

        // Merge into whatever the slot holds now; a load may have landed
        // while the PUT was in flight.
        let mut merge_error = None;
        self.state.send_if_modified(|s| {
            let Some(latest) = s.entities.get(id) else {
                return false;
            };
            match patch.apply_to(&**latest) {
                Ok(updated) => {
                    if let Some(slot) = Arc::make_mut(&mut s.entities).get_mut(id) {
                        *slot = Arc::new(updated);
                    }
                    true
                }
                Err(e) => {
                    merge_error = Some(e);
                    false
                }
            }
        });
        if let Some(e) = merge_error {
            warn!(kind = %T::SPEC.kind, %id, error = %e, "accepted update no longer fits the reloaded entity");
        }
        Ok(())
    }

    /// Delete `id` after `confirm` approves it.
    ///
    /// `confirm` sees the entity about to go and runs before any request.
    pub async fn delete(
        &self,
        id: &EntityId,
        confirm: impl FnOnce(&T) -> bool,
    ) -> Result<DeleteOutcome, CoreError> {
        if self.is_closed() {
            return Ok(DeleteOutcome::Declined);
        }
        self.ensure_mutable()?;
        let current = self.get(id).ok_or_else(|| self.not_found(id))?;
        if !confirm(&current) {
            debug!(kind = %T::SPEC.kind, %id, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        self.client.delete(&T::SPEC.item_path(id)).await?;

        if self.is_closed() {
            debug!(kind = %T::SPEC.kind, %id, "delete response dropped after close");
            return Ok(DeleteOutcome::Deleted);
        }

        self.state.send_modify(|s| {
            Arc::make_mut(&mut s.entities).shift_remove(id);
        });
        Ok(DeleteOutcome::Deleted)
    }

    /// Stop applying responses. In-flight requests still complete on the
    /// wire; their results are dropped.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn upsert(&self, entity: Arc<T>) {
        let id = entity.id().clone();
        self.state.send_modify(|s| {
            Arc::make_mut(&mut s.entities).insert(id, entity);
        });
    }

    fn not_found(&self, id: &EntityId) -> CoreError {
        CoreError::NotFound {
            kind: T::SPEC.kind,
            identifier: id.to_string(),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
impl<T: Resource> ResourceMirror<T> {
    /// A mirror whose client points nowhere, for tests that never send.
    pub(crate) fn offline() -> Self {
        let client = ApiClient::with_client(
            reqwest::Client::new(),
            "http://127.0.0.1:1/",
            fleetdesk_api::SessionContext::with_token("test"),
        )
        .unwrap();
        Self::new(Arc::new(client), CancellationToken::new())
    }

    /// Put the mirror in `Ready` with `items`, bypassing the network.
    pub(crate) fn seed(&self, items: Vec<T>) {
        let entities = items
            .into_iter()
            .map(|item| (item.id().clone(), Arc::new(item)))
            .collect();
        self.state.send_modify(|s| {
            s.load = LoadState::Ready;
            s.entities = Arc::new(entities);
        });
    }
}
