use super::{GraphError, Resolution};
use crate::model::{Item, ItemKind, Label};
use crate::sync::{self, Arc, Mutex, MutexGuard};
use fxhash::FxHashSet;

/// A handle to a record in the graph's arena.
///
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecordId(usize);

impl RecordId {
    pub(crate) fn new(idx: usize) -> Self {
        Self(idx)
    }

    pub(crate) fn index(&self) -> usize {
        self.0
    }
}

/// The graph's bookkeeping for one label. Created the first time anything mentions the label,
/// which may well be before the item itself is declared.
///
#[derive(Debug)]
pub(crate) struct DependencyRecord {
    id: RecordId,
    label: Label,
    state: Mutex<RecordState>,
}

impl DependencyRecord {
    pub(crate) fn new(id: RecordId, label: Label, kind: ItemKind) -> Self {
        Self {
            id,
            label,
            state: Mutex::new(RecordState {
                kind,
                ..Default::default()
            }),
        }
    }

    pub(crate) fn id(&self) -> RecordId {
        self.id
    }

    pub(crate) fn label(&self) -> &Label {
        &self.label
    }

    /// Every read or write of the record's edges and counters goes through this lock.
    pub(crate) fn state(&self) -> MutexGuard<'_, RecordState> {
        sync::lock(&self.state)
    }

    pub(crate) fn into_state(self) -> RecordState {
        self.state
            .into_inner()
            .unwrap_or_else(sync::PoisonError::into_inner)
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordState {
    pub(crate) kind: ItemKind,

    /// Set as soon as a declaration for this label starts being ingested.
    pub(crate) declared: bool,

    /// Attached once every edge of the declaration has been added.
    pub(crate) item: Option<Arc<Item>>,

    pub(crate) all_deps: FxHashSet<RecordId>,

    /// Records currently blocked on this one resolving.
    pub(crate) waiting_on_resolution: FxHashSet<RecordId>,

    pub(crate) unresolved_count: usize,

    pub(crate) resolved: bool,

    pub(crate) resolution: Option<Arc<Resolution>>,
}

impl RecordState {
    /// Records an edge to `dep`. Returns whether the count went up, in which case the caller
    /// must put this record on `dep`'s wait list.
    pub(crate) fn add_dep(&mut self, dep: RecordId, dep_resolved: bool) -> bool {
        if self.all_deps.insert(dep) && !dep_resolved {
            self.unresolved_count += 1;
            true
        } else {
            false
        }
    }

    /// Called once per dependency that was unresolved when its edge was added, right after it
    /// resolves. Returns whether this was the last one.
    pub(crate) fn on_dependency_resolved(
        &mut self,
        me: &Label,
        dep: RecordId,
    ) -> Result<bool, GraphError> {
        if !self.all_deps.contains(&dep) {
            return Err(GraphError::inconsistency(format!(
                "{me} was notified about a dependency it never declared"
            )));
        }
        if self.unresolved_count == 0 {
            return Err(GraphError::inconsistency(format!(
                "{me} was notified about a resolved dependency with nothing left to wait on"
            )));
        }
        self.unresolved_count -= 1;
        Ok(self.unresolved_count == 0)
    }

    /// Whether this record has everything it needs to run its resolution step.
    pub(crate) fn is_ready(&self) -> bool {
        self.item.is_some() && self.unresolved_count == 0 && !self.resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label() -> Label {
        "//a:a".parse().unwrap()
    }

    #[test]
    fn adding_the_same_dep_twice_counts_it_once() {
        let mut state = RecordState::default();
        assert!(state.add_dep(RecordId::new(1), false));
        assert!(!state.add_dep(RecordId::new(1), false));
        assert_eq!(state.unresolved_count, 1);
        assert_eq!(state.all_deps.len(), 1);
    }

    #[test]
    fn resolved_deps_never_count() {
        let mut state = RecordState::default();
        assert!(!state.add_dep(RecordId::new(1), true));
        assert_eq!(state.unresolved_count, 0);
        assert!(state.all_deps.contains(&RecordId::new(1)));
    }

    #[test]
    fn notification_reports_the_last_dependency() {
        let mut state = RecordState::default();
        state.add_dep(RecordId::new(1), false);
        state.add_dep(RecordId::new(2), false);

        assert_matches!(state.on_dependency_resolved(&label(), RecordId::new(1)), Ok(false));
        assert_matches!(state.on_dependency_resolved(&label(), RecordId::new(2)), Ok(true));
    }

    #[test]
    fn double_notification_is_an_inconsistency() {
        let mut state = RecordState::default();
        state.add_dep(RecordId::new(1), false);
        state.on_dependency_resolved(&label(), RecordId::new(1)).unwrap();

        assert_matches!(
            state.on_dependency_resolved(&label(), RecordId::new(1)),
            Err(GraphError::StructuralInconsistency(_))
        );
    }

    #[test]
    fn notification_about_a_stranger_is_an_inconsistency() {
        let mut state = RecordState::default();
        state.add_dep(RecordId::new(1), false);

        assert_matches!(
            state.on_dependency_resolved(&label(), RecordId::new(7)),
            Err(GraphError::StructuralInconsistency(_))
        );
    }
}
