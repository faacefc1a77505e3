// ── Search and single selection ──
//
// `filter_by_display` narrows a list for rendering. `Picker` drives a
// type-to-select box over a mirror: it never holds a selection the mirror
// does not contain.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::CoreError;
use crate::model::EntityId;
use crate::resource::Resource;
use crate::store::{MirrorState, ResourceMirror};

/// Case-insensitive substring match on the display field.
///
/// An empty query keeps everything. Order is preserved.
pub fn filter_by_display<T: Resource>(entities: &[Arc<T>], query: &str) -> Vec<Arc<T>> {
    if query.is_empty() {
        return entities.to_vec();
    }
    let needle = query.to_lowercase();
    entities
        .iter()
        .filter(|e| e.display_name().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// The chosen entity, by id plus the name shown for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub id: EntityId,
    pub display_name: String,
}

impl SelectionState {
    fn of<T: Resource>(entity: &T) -> Self {
        Self {
            id: entity.id().clone(),
            display_name: entity.display_name().to_owned(),
        }
    }
}

/// Type-to-select picker bound to one mirror.
pub struct Picker<T: Resource> {
    source: watch::Receiver<MirrorState<T>>,
    text: String,
    selection: Option<SelectionState>,
    dropdown_visible: bool,
}

impl<T: Resource> Picker<T> {
    pub fn new(mirror: &ResourceMirror<T>) -> Self {
        Self {
            source: mirror.subscribe(),
            text: String::new(),
            selection: None,
            dropdown_visible: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn dropdown_visible(&self) -> bool {
        self.dropdown_visible
    }

    /// Replace the query text.
    ///
    /// An exact case-insensitive match on a display name selects that
    /// entity (the first one, in mirror order) and hides the dropdown. Any
    /// other text clears the selection; non-empty text opens the dropdown.
    pub fn type_text(&mut self, text: &str) {
        text.clone_into(&mut self.text);

        if text.is_empty() {
            self.selection = None;
            self.dropdown_visible = false;
            return;
        }

        let needle = text.to_lowercase();
        let exact = self
            .source
            .borrow()
            .entities
            .values()
            .find(|e| e.display_name().to_lowercase() == needle)
            .map(|e| SelectionState::of(&**e));

        self.dropdown_visible = exact.is_none();
        self.selection = exact;
    }

    /// Entities matching the current text, for the dropdown.
    pub fn candidates(&self) -> Vec<Arc<T>> {
        filter_by_display(&self.source.borrow().to_vec(), &self.text)
    }

    /// Choose `id` explicitly. Clears the text and hides the dropdown.
    pub fn pick(&mut self, id: &EntityId) -> Result<SelectionState, CoreError> {
        let entity = self
            .source
            .borrow()
            .get(id)
            .ok_or_else(|| CoreError::NotFound {
                kind: T::SPEC.kind,
                identifier: id.to_string(),
            })?;
        let selection = SelectionState::of(&*entity);
        self.selection = Some(selection.clone());
        self.text.clear();
        self.dropdown_visible = false;
        Ok(selection)
    }

    /// Drop the selection if the ready mirror no longer holds it.
    pub fn reconcile(&mut self) {
        let state = self.source.borrow_and_update();
        if !state.load.is_ready() {
            return;
        }
        let stale = self
            .selection
            .as_ref()
            .is_some_and(|current| !state.entities.contains_key(&current.id));
        if stale {
            self.selection = None;
        }
    }

    /// The current selection, re-checked against the mirror.
    pub fn selection(&self) -> Option<&SelectionState> {
        let selection = self.selection.as_ref()?;
        let state = self.source.borrow();
        if state.load.is_ready() && !state.entities.contains_key(&selection.id) {
            return None;
        }
        Some(selection)
    }

    /// The selection an operation needs as its parent.
    ///
    /// Fails with `ParentRequired` when there is nothing to choose from and
    /// `ValidationFailed` when nothing has been chosen.
    pub fn require_selection(&self) -> Result<SelectionState, CoreError> {
        {
            let state = self.source.borrow();
            if state.load.is_loading() {
                return Err(CoreError::NotReady {
                    kind: T::SPEC.kind,
                });
            }
            if state.is_empty() {
                return Err(CoreError::ParentRequired {
                    message: format!(
                        "No {kind} exist yet: create a new {singular} first",
                        kind = T::SPEC.kind,
                        singular = T::SPEC.singular,
                    ),
                });
            }
        }
        self.selection().cloned().ok_or_else(|| {
            CoreError::validation(format!("no {} selected", T::SPEC.singular))
        })
    }

    /// Forget text, selection, and dropdown.
    pub fn clear(&mut self) {
        self.text.clear();
        self.selection = None;
        self.dropdown_visible = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Organization;
    use pretty_assertions::assert_eq;
    use serde_json::Map;

    fn org(id: &str, name: &str) -> Organization {
        Organization {
            id: EntityId::from(id),
            name: name.into(),
            extra: Map::new(),
        }
    }

    fn names(list: &[Arc<Organization>]) -> Vec<&str> {
        list.iter().map(|o| o.name.as_str()).collect()
    }

    fn seeded() -> ResourceMirror<Organization> {
        let mirror = ResourceMirror::offline();
        mirror.seed(vec![
            org("1", "Acme Corp"),
            org("2", "Globex"),
            org("3", "acme labs"),
        ]);
        mirror
    }

    #[test]
    fn filter_is_case_insensitive_and_ordered() {
        let mirror = seeded();
        let all = mirror.snapshot();
        assert_eq!(
            names(&filter_by_display(&all, "ACME")),
            vec!["Acme Corp", "acme labs"]
        );
        assert_eq!(names(&filter_by_display(&all, "")).len(), 3);
        assert!(filter_by_display(&all, "initech").is_empty());
    }

    #[test]
    fn exact_text_selects_and_hides_dropdown() {
        let mirror = seeded();
        let mut picker = Picker::new(&mirror);

        picker.type_text("acme corp");
        assert_eq!(
            picker.selection().map(|s| s.display_name.as_str()),
            Some("Acme Corp")
        );
        assert!(!picker.dropdown_visible());
    }

    #[test]
    fn partial_text_clears_selection_and_lists_candidates() {
        let mirror = seeded();
        let mut picker = Picker::new(&mirror);
        picker.type_text("acme corp");

        picker.type_text("Acme Cor");
        assert!(picker.selection().is_none());
        assert!(picker.dropdown_visible());
        assert_eq!(names(&picker.candidates()), vec!["Acme Corp"]);
    }

    #[test]
    fn empty_text_clears_everything() {
        let mirror = seeded();
        let mut picker = Picker::new(&mirror);
        picker.type_text("Globex");
        picker.type_text("");
        assert!(picker.selection().is_none());
        assert!(!picker.dropdown_visible());
    }

    #[test]
    fn pick_clears_text() {
        let mirror = seeded();
        let mut picker = Picker::new(&mirror);
        picker.type_text("glo");

        let chosen = picker.pick(&EntityId::from("2")).unwrap();
        assert_eq!(chosen.display_name, "Globex");
        assert_eq!(picker.text(), "");
        assert!(!picker.dropdown_visible());
        assert!(picker.pick(&EntityId::from("99")).is_err());
    }

    #[test]
    fn selection_follows_removal() {
        let mirror = seeded();
        let mut picker = Picker::new(&mirror);
        picker.pick(&EntityId::from("1")).unwrap();

        mirror.seed(vec![org("2", "Globex")]);
        assert!(picker.selection().is_none());
        picker.reconcile();
        assert!(matches!(
            picker.require_selection(),
            Err(CoreError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn empty_mirror_requires_parent() {
        let mirror = ResourceMirror::<Organization>::offline();
        mirror.seed(Vec::new());
        let picker = Picker::new(&mirror);
        let err = picker.require_selection().unwrap_err();
        assert!(matches!(err, CoreError::ParentRequired { .. }));
        assert!(err.to_string().contains("create a new organization first"));
    }
}
