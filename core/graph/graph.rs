use super::*;
use crate::events::event::GraphEvent;
use crate::events::EventChannel;
use crate::model::{Item, ItemKind, Label};
use crate::sync::{self, Arc, Mutex, RwLock};
use dashmap::DashMap;
use tracing::*;

/// The set of every declared or referenced item of one build description, and the bookkeeping
/// that tells when each of them becomes resolved.
///
/// Records live in an arena owned by the graph and point at each other by `RecordId`, so cycles
/// in the build description are just cycles of indices.
///
/// Declarations may be ingested from several threads at once. Each record is guarded by its own
/// lock; there is no lock over the whole graph. Edges between two records are added while holding
/// both locks (always taken in arena order), and a record's resolution flips under its own lock,
/// so an edge is either added before its target resolves (and the source waits for it) or after
/// (and the source does not count it).
///
#[derive(Debug, Default)]
pub struct ResolutionGraph {
    index: DashMap<Label, RecordId>,
    arena: RwLock<Vec<Arc<DependencyRecord>>>,
    failures: Mutex<Vec<GraphError>>,
    event_channel: Arc<EventChannel>,
}

impl ResolutionGraph {
    pub fn new(event_channel: Arc<EventChannel>) -> Self {
        Self {
            event_channel,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        sync::read(&self.arena).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn record(&self, id: RecordId) -> Arc<DependencyRecord> {
        sync::read(&self.arena)[id.index()].clone()
    }

    pub fn find(&self, label: &Label) -> Option<RecordId> {
        self.index.get(label).map(|r| *r.value())
    }

    fn get_or_create(&self, label: &Label, kind: ItemKind) -> RecordId {
        if let Some(id) = self.find(label) {
            return id;
        }
        // New records are only ever created under the arena's write lock.
        let mut arena = sync::write(&self.arena);
        if let Some(id) = self.find(label) {
            return id;
        }
        let id = RecordId::new(arena.len());
        trace!("Created record {} for {} {}", id.index(), kind, label);
        arena.push(Arc::new(DependencyRecord::new(id, label.clone(), kind)));
        self.index.insert(label.clone(), id);
        id
    }

    /// Get the record for `label`, creating it if this is the first time it is mentioned.
    ///
    /// A label must always be referred to as the same kind of item.
    ///
    #[tracing::instrument(name = "ResolutionGraph::reference", skip(self))]
    pub fn reference(&self, label: &Label, kind: ItemKind) -> Result<RecordId, GraphError> {
        if !kind.is_known() {
            return Err(GraphError::inconsistency(format!(
                "{label} was referenced as an item of unknown kind"
            )));
        }

        let id = self.get_or_create(label, kind);
        let found = self.record(id).state().kind;
        if found != kind {
            return Err(GraphError::KindMismatch {
                label: label.clone(),
                expected: kind,
                found,
            });
        }
        Ok(id)
    }

    /// Record that `from` depends on `to`. Adding an edge that already exists does nothing.
    ///
    /// Returns whether the edge was new.
    ///
    pub fn add_dependency(&self, from: RecordId, to: RecordId) -> Result<bool, GraphError> {
        if from == to {
            let record = self.record(from);
            let mut state = record.state();
            let is_new = !state.all_deps.contains(&to);
            let resolved = state.resolved;
            if state.add_dep(to, resolved) {
                state.waiting_on_resolution.insert(from);
            }
            return Ok(is_new);
        }

        let (first, second) = if from < to { (from, to) } else { (to, from) };
        let first = self.record(first);
        let second = self.record(second);
        let first_state = first.state();
        let second_state = second.state();
        let (mut from_state, mut to_state) = if from < to {
            (first_state, second_state)
        } else {
            (second_state, first_state)
        };

        if from_state.resolved {
            return Err(GraphError::inconsistency(format!(
                "attempted to add a dependency to an already resolved record ({})",
                self.label_of(from)
            )));
        }

        let is_new = !from_state.all_deps.contains(&to);
        if from_state.add_dep(to, to_state.resolved) {
            to_state.waiting_on_resolution.insert(from);
        }
        Ok(is_new)
    }

    /// Ingest one declaration: add an edge for every label it refers to, attach the item, and
    /// resolve it (and everything it unblocks) if it has nothing left to wait on.
    ///
    #[tracing::instrument(name = "ResolutionGraph::declare", skip(self, item), fields(label = %item.label()))]
    pub fn declare(&self, item: Item) -> Result<RecordId, GraphError> {
        let label = item.label().clone();
        let kind = item.kind();
        let id = self.reference(&label, kind)?;

        {
            let record = self.record(id);
            let mut state = record.state();
            if state.declared {
                return Err(GraphError::DuplicateDeclaration(label));
            }
            state.declared = true;
        }

        for (dep_label, dep_kind) in item.dependencies() {
            let dep = self.reference(dep_label, dep_kind)?;
            self.add_dependency(id, dep)?;
        }

        let ready = {
            let record = self.record(id);
            let mut state = record.state();
            state.item = Some(Arc::new(item));
            state.is_ready()
        };

        debug!("Declared {} {}", kind, label);
        self.event_channel
            .send(GraphEvent::ItemDeclared { label, kind });

        if ready {
            self.resolve(id)?;
        }

        Ok(id)
    }

    /// Run the resolution step of a ready record, then of every record that becomes ready as a
    /// consequence, until nothing else unblocks.
    ///
    fn resolve(&self, id: RecordId) -> Result<(), GraphError> {
        let mut ready = vec![id];

        while let Some(id) = ready.pop() {
            let record = self.record(id);
            let item = record.state().item.clone().ok_or_else(|| {
                GraphError::inconsistency(format!(
                    "{} was scheduled for resolution before being declared",
                    record.label()
                ))
            })?;

            let resolution = match finalize::finalize(self, &item) {
                Ok(resolution) => resolution,
                Err(err) => {
                    warn!("Could not resolve {}: {}", record.label(), err);
                    self.fail(err);
                    continue;
                }
            };

            let (kind, waiters) = {
                let mut state = record.state();
                if state.resolved {
                    return Err(GraphError::inconsistency(format!(
                        "{} was resolved twice",
                        record.label()
                    )));
                }
                state.resolved = true;
                state.resolution = Some(Arc::new(resolution));
                (state.kind, std::mem::take(&mut state.waiting_on_resolution))
            };

            trace!("Resolved {} {}", kind, record.label());
            self.event_channel.send(GraphEvent::ItemResolved {
                label: record.label().clone(),
                kind,
            });

            for waiter in waiters {
                let waiter = self.record(waiter);
                let mut state = waiter.state();
                if state.on_dependency_resolved(waiter.label(), id)? && state.item.is_some() {
                    ready.push(waiter.id());
                }
            }
        }

        Ok(())
    }

    fn fail(&self, err: GraphError) {
        sync::lock(&self.failures).push(err);
    }

    fn label_of(&self, id: RecordId) -> Label {
        self.record(id).label().clone()
    }

    /// The dependencies of a record that have not resolved yet.
    ///
    /// This asks each dependency whether the record is still on its wait list, rather than
    /// looking at the dependency's resolved flag.
    ///
    pub fn unresolved_deps(&self, id: RecordId) -> Vec<RecordId> {
        let deps: Vec<RecordId> = self.record(id).state().all_deps.iter().copied().collect();
        let mut unresolved: Vec<RecordId> = deps
            .into_iter()
            .filter(|dep| self.record(*dep).state().waiting_on_resolution.contains(&id))
            .collect();
        unresolved.sort();
        unresolved
    }

    pub fn is_resolved(&self, label: &Label) -> bool {
        self.find(label)
            .map(|id| self.record(id).state().resolved)
            .unwrap_or(false)
    }

    /// A snapshot of a record's bookkeeping, for diagnostics and tests.
    pub fn record_state(&self, label: &Label) -> Option<RecordSnapshot> {
        let id = self.find(label)?;
        let unresolved_deps = self
            .unresolved_deps(id)
            .into_iter()
            .map(|dep| self.label_of(dep))
            .collect();
        let record = self.record(id);
        let state = record.state();
        Some(RecordSnapshot {
            label: label.clone(),
            kind: state.kind,
            declared: state.item.is_some(),
            resolved: state.resolved,
            unresolved_count: state.unresolved_count,
            dep_count: state.all_deps.len(),
            unresolved_deps,
        })
    }

    /// The item and resolution of an already resolved label.
    pub(crate) fn resolved(&self, label: &Label) -> Option<(Arc<Item>, Arc<Resolution>)> {
        let id = self.find(label)?;
        let record = self.record(id);
        let state = record.state();
        match (&state.item, &state.resolution) {
            (Some(item), Some(resolution)) if state.resolved => {
                Some((item.clone(), resolution.clone()))
            }
            _ => None,
        }
    }

    /// Signal that every declaration has been submitted.
    ///
    /// If every record resolved, hands back the read-only resolved graph. Otherwise reports what
    /// is missing and what is stuck in a cycle.
    ///
    #[tracing::instrument(name = "ResolutionGraph::finish", skip(self))]
    pub fn finish(self) -> Result<ResolvedGraph, GraphError> {
        let failures = std::mem::take(&mut *sync::lock(&self.failures));
        if let Some(err) = GraphError::from_many(failures) {
            return Err(err);
        }

        let unresolved: Vec<RecordId> = sync::read(&self.arena)
            .iter()
            .filter(|r| !r.state().resolved)
            .map(|r| r.id())
            .collect();

        let total = self.len();
        self.event_channel.send(GraphEvent::ResolutionFinished {
            resolved: total - unresolved.len(),
            unresolved: unresolved.len(),
        });

        if !unresolved.is_empty() {
            let report = UnresolvedReport::build(&self, &unresolved);
            debug!("{} records never resolved", unresolved.len());
            return Err(GraphError::Unresolved(report));
        }

        let arena = std::mem::take(&mut *sync::write(&self.arena));
        let mut items = vec![];
        for record in arena {
            let record = Arc::try_unwrap(record).map_err(|r| {
                GraphError::inconsistency(format!("{} is still shared after finishing", r.label()))
            })?;
            let label = record.label().clone();
            let state = record.into_state();
            match (state.item, state.resolution) {
                (Some(item), Some(resolution)) => items.push((label, item, resolution)),
                _ => {
                    return Err(GraphError::inconsistency(format!(
                        "{label} is marked resolved without an item"
                    )))
                }
            }
        }

        Ok(ResolvedGraph::new(items))
    }
}

/// A point-in-time copy of one record's bookkeeping.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSnapshot {
    pub label: Label,
    pub kind: ItemKind,
    pub declared: bool,
    pub resolved: bool,
    pub unresolved_count: usize,
    pub dep_count: usize,
    pub unresolved_deps: Vec<Label>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event::Event;
    use crate::model::{Config, OutputType, Pool, Target};

    fn label(s: &str) -> Label {
        s.parse().unwrap()
    }

    fn group(name: &str, deps: &[&str]) -> Item {
        Target::builder()
            .label(label(name))
            .output_type(OutputType::Group)
            .public_deps(deps.iter().map(|d| label(d)).collect())
            .build()
            .unwrap()
            .into()
    }

    #[test]
    fn an_item_without_deps_resolves_on_declaration() {
        let graph = ResolutionGraph::default();
        graph.declare(group("//a:a", &[])).unwrap();
        assert!(graph.is_resolved(&label("//a:a")));
    }

    #[test]
    fn forward_references_resolve_once_declared() {
        let graph = ResolutionGraph::default();
        graph.declare(group("//app:app", &["//lib:lib"])).unwrap();

        let app = graph.record_state(&label("//app:app")).unwrap();
        assert!(!app.resolved);
        assert_eq!(app.unresolved_count, 1);
        assert_eq!(app.unresolved_deps, vec![label("//lib:lib")]);

        let lib = graph.record_state(&label("//lib:lib")).unwrap();
        assert!(!lib.declared);

        graph.declare(group("//lib:lib", &[])).unwrap();
        assert!(graph.is_resolved(&label("//app:app")));
        assert_eq!(
            graph.record_state(&label("//app:app")).unwrap().unresolved_count,
            0
        );
    }

    #[test]
    fn adding_the_same_edge_twice_does_not_change_the_count() {
        let graph = ResolutionGraph::default();
        let a = graph.reference(&label("//a:a"), ItemKind::Target).unwrap();
        let b = graph.reference(&label("//b:b"), ItemKind::Target).unwrap();

        assert!(graph.add_dependency(a, b).unwrap());
        assert!(!graph.add_dependency(a, b).unwrap());

        let state = graph.record_state(&label("//a:a")).unwrap();
        assert_eq!(state.unresolved_count, 1);
        assert_eq!(state.dep_count, 1);
    }

    #[test]
    fn edges_to_resolved_records_are_not_counted() {
        let graph = ResolutionGraph::default();
        graph.declare(group("//b:b", &[])).unwrap();
        let a = graph.reference(&label("//a:a"), ItemKind::Target).unwrap();
        let b = graph.find(&label("//b:b")).unwrap();

        assert!(graph.add_dependency(a, b).unwrap());
        let state = graph.record_state(&label("//a:a")).unwrap();
        assert_eq!(state.unresolved_count, 0);
        assert_eq!(state.dep_count, 1);
    }

    #[test]
    fn cascades_through_a_chain_declared_backwards() {
        let graph = ResolutionGraph::default();
        graph.declare(group("//c:c", &["//b:b"])).unwrap();
        graph.declare(group("//b:b", &["//a:a"])).unwrap();
        assert!(!graph.is_resolved(&label("//c:c")));

        graph.declare(group("//a:a", &[])).unwrap();
        for l in ["//a:a", "//b:b", "//c:c"] {
            assert!(graph.is_resolved(&label(l)), "{l} should be resolved");
        }
    }

    #[test]
    fn declaring_twice_is_an_error() {
        let graph = ResolutionGraph::default();
        graph.declare(group("//a:a", &[])).unwrap();
        assert_matches!(
            graph.declare(group("//a:a", &[])),
            Err(GraphError::DuplicateDeclaration(l)) if l == label("//a:a")
        );
    }

    #[test]
    fn referencing_a_label_as_two_kinds_is_an_error() {
        let graph = ResolutionGraph::default();
        graph.reference(&label("//a:a"), ItemKind::Config).unwrap();
        assert_matches!(
            graph.declare(group("//a:a", &[])),
            Err(GraphError::KindMismatch {
                expected: ItemKind::Target,
                found: ItemKind::Config,
                ..
            })
        );
    }

    #[test]
    fn unknown_kinds_are_an_inconsistency() {
        let graph = ResolutionGraph::default();
        assert_matches!(
            graph.reference(&label("//a:a"), ItemKind::Unknown),
            Err(GraphError::StructuralInconsistency(_))
        );
    }

    #[test]
    fn configs_and_pools_take_part_in_resolution() {
        let graph = ResolutionGraph::default();
        let target: Item = Target::builder()
            .label(label("//app:app"))
            .output_type(OutputType::Action)
            .configs(vec![label("//build:opt")])
            .pool(label("//build:pool"))
            .build()
            .unwrap()
            .into();
        graph.declare(target).unwrap();
        graph
            .declare(
                Config::builder()
                    .label(label("//build:opt"))
                    .build()
                    .unwrap()
                    .into(),
            )
            .unwrap();
        assert!(!graph.is_resolved(&label("//app:app")));

        graph
            .declare(
                Pool::builder()
                    .label(label("//build:pool"))
                    .depth(2)
                    .build()
                    .unwrap()
                    .into(),
            )
            .unwrap();
        assert!(graph.is_resolved(&label("//app:app")));
    }

    #[test]
    fn publishes_an_event_per_resolved_item() {
        let channel = Arc::new(EventChannel::new());
        let consumer = channel.consumer();
        let graph = ResolutionGraph::new(channel);
        graph.declare(group("//b:b", &["//a:a"])).unwrap();
        graph.declare(group("//a:a", &[])).unwrap();

        let resolved: Vec<Label> = consumer
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                Event::GraphEvent(GraphEvent::ItemResolved { label, .. }) => Some(label),
                _ => None,
            })
            .collect();
        assert_eq!(resolved, vec![label("//a:a"), label("//b:b")]);
    }

    #[test]
    fn resolution_is_monotonic() {
        let graph = ResolutionGraph::default();
        graph.declare(group("//a:a", &[])).unwrap();
        graph.declare(group("//b:b", &["//a:a"])).unwrap();
        graph.declare(group("//c:c", &["//a:a", "//missing:x"])).unwrap();
        assert!(graph.is_resolved(&label("//a:a")));
        assert!(graph.is_resolved(&label("//b:b")));
    }

    #[test]
    fn finishing_a_complete_graph_yields_every_item() {
        let graph = ResolutionGraph::default();
        graph.declare(group("//b:b", &["//a:a"])).unwrap();
        graph.declare(group("//a:a", &[])).unwrap();

        let resolved = graph.finish().unwrap();
        assert_eq!(resolved.len(), 2);
        assert!(resolved.target(&label("//b:b")).is_some());
    }

    #[test]
    fn a_self_edge_is_a_cycle() {
        let graph = ResolutionGraph::default();
        graph.declare(group("//a:a", &["//a:a"])).unwrap();
        let state = graph.record_state(&label("//a:a")).unwrap();
        assert_eq!(state.unresolved_count, 1);
        assert_eq!(state.unresolved_deps, vec![label("//a:a")]);
    }

    #[quickcheck]
    fn every_dag_resolves_whatever_the_declaration_order(edges: Vec<(u8, u8)>, order: Vec<u8>) {
        const N: u8 = 12;

        // Only keep edges from a higher to a lower node to guarantee a DAG.
        let mut deps: Vec<Vec<String>> = vec![vec![]; N as usize];
        for (a, b) in edges {
            let (a, b) = (a % N, b % N);
            if a > b {
                deps[a as usize].push(format!("//n:{b}"));
            }
        }

        let mut nodes: Vec<u8> = (0..N).collect();
        for (i, o) in order.iter().enumerate() {
            nodes.swap(i % N as usize, (*o % N) as usize);
        }

        let graph = ResolutionGraph::default();
        for n in nodes {
            let d: Vec<&str> = deps[n as usize].iter().map(|s| s.as_str()).collect();
            graph.declare(group(&format!("//n:{n}"), &d)).unwrap();
        }

        for n in 0..N {
            assert!(graph.is_resolved(&label(&format!("//n:{n}"))));
        }
    }

    #[cfg(shuttle)]
    #[test]
    fn conc_declaring_a_diamond_from_many_threads_resolves_everything() {
        use crate::sync::*;

        shuttle::check_random(
            move || {
                let graph = Arc::new(ResolutionGraph::default());
                let items = vec![
                    group("//d:d", &["//b:b", "//c:c"]),
                    group("//b:b", &["//a:a"]),
                    group("//c:c", &["//a:a"]),
                    group("//a:a", &[]),
                ];

                let mut handles = vec![];
                for item in items {
                    let graph = graph.clone();
                    handles.push(thread::spawn(move || {
                        graph.declare(item).unwrap();
                    }));
                }
                for handle in handles {
                    handle.join().unwrap()
                }

                for l in ["//a:a", "//b:b", "//c:c", "//d:d"] {
                    assert!(graph.is_resolved(&label(l)));
                }
            },
            100,
        );
    }
}
