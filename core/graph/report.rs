use super::{error::format_labels, error::format_path, GraphError, RecordId, ResolutionGraph};
use crate::model::{ItemKind, Label};
use fxhash::{FxHashMap, FxHashSet};
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use std::collections::VecDeque;
use std::fmt;

/// A label something depends on that was never declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingReference {
    pub label: Label,
    pub kind: ItemKind,
    pub referenced_by: Vec<Label>,
}

/// A set of declared records that can only resolve after each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyCycle {
    /// Sorted.
    pub members: Vec<Label>,

    /// One concrete walk through the cycle, starting and ending at the same label.
    pub path: Vec<Label>,
}

/// A declared record that is not part of a cycle itself, but waits on something that will never
/// resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedItem {
    pub label: Label,
    pub unresolved_count: usize,
    pub waiting_on: Vec<Label>,
}

/// Why a graph failed to quiesce with every record resolved.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnresolvedReport {
    pub missing: Vec<MissingReference>,
    pub cycles: Vec<DependencyCycle>,
    pub blocked: Vec<BlockedItem>,
}

impl UnresolvedReport {
    pub(crate) fn build(graph: &ResolutionGraph, unresolved: &[RecordId]) -> Self {
        let labels: FxHashMap<RecordId, Label> = (0..graph.len())
            .map(RecordId::new)
            .map(|id| (id, graph.record(id).label().clone()))
            .collect();

        let mut missing_ids: FxHashSet<RecordId> = FxHashSet::default();
        let mut declared: Vec<RecordId> = vec![];
        for id in unresolved {
            if graph.record(*id).state().item.is_some() {
                declared.push(*id);
            } else {
                missing_ids.insert(*id);
            }
        }

        // Who refers to each missing label, across the whole graph.
        let mut referrers: FxHashMap<RecordId, Vec<Label>> = FxHashMap::default();
        for (id, label) in &labels {
            let record = graph.record(*id);
            let state = record.state();
            for dep in state.all_deps.iter().filter(|d| missing_ids.contains(*d)) {
                referrers.entry(*dep).or_default().push(label.clone());
            }
        }

        let mut missing: Vec<MissingReference> = missing_ids
            .iter()
            .map(|id| {
                let mut referenced_by = referrers.remove(id).unwrap_or_default();
                referenced_by.sort();
                MissingReference {
                    label: labels[id].clone(),
                    kind: graph.record(*id).state().kind,
                    referenced_by,
                }
            })
            .collect();
        missing.sort_by(|a, b| a.label.cmp(&b.label));

        let mut waits: FxHashMap<RecordId, Vec<RecordId>> = FxHashMap::default();
        let mut edges: DiGraphMap<RecordId, ()> = DiGraphMap::new();
        for id in &declared {
            edges.add_node(*id);
            let deps = graph.unresolved_deps(*id);
            for dep in &deps {
                if !missing_ids.contains(dep) {
                    edges.add_edge(*id, *dep, ());
                }
            }
            waits.insert(*id, deps);
        }

        let mut in_cycle: FxHashSet<RecordId> = FxHashSet::default();
        let mut cycles = vec![];
        for scc in tarjan_scc(&edges) {
            let is_cycle = scc.len() > 1 || edges.contains_edge(scc[0], scc[0]);
            if !is_cycle {
                continue;
            }
            in_cycle.extend(scc.iter().copied());

            let mut members: Vec<Label> = scc.iter().map(|id| labels[id].clone()).collect();
            members.sort();

            let start = scc
                .iter()
                .copied()
                .min_by(|a, b| labels[a].cmp(&labels[b]))
                .unwrap_or(scc[0]);
            let path = cycle_path(&edges, &scc, start)
                .into_iter()
                .map(|id| labels[&id].clone())
                .collect();

            cycles.push(DependencyCycle { members, path });
        }
        cycles.sort_by(|a, b| a.members.cmp(&b.members));

        let mut blocked: Vec<BlockedItem> = declared
            .iter()
            .filter(|id| !in_cycle.contains(*id))
            .map(|id| {
                let mut waiting_on: Vec<Label> = waits
                    .get(id)
                    .map(|deps| deps.iter().map(|d| labels[d].clone()).collect())
                    .unwrap_or_default();
                waiting_on.sort();
                BlockedItem {
                    label: labels[id].clone(),
                    unresolved_count: graph.record(*id).state().unresolved_count,
                    waiting_on,
                }
            })
            .collect();
        blocked.sort_by(|a, b| a.label.cmp(&b.label));

        Self {
            missing,
            cycles,
            blocked,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.cycles.is_empty() && self.blocked.is_empty()
    }

    /// The user-facing failures in this report: one per missing label and one per cycle.
    pub fn errors(&self) -> Vec<GraphError> {
        self.missing
            .iter()
            .map(|m| GraphError::UnresolvedReference {
                label: m.label.clone(),
                kind: m.kind,
                referenced_by: m.referenced_by.clone(),
            })
            .chain(self.cycles.iter().map(|c| GraphError::DependencyCycle {
                members: c.members.clone(),
                path: c.path.clone(),
            }))
            .collect()
    }
}

/// Shortest walk from `start` back to itself, staying inside the strongly connected component.
fn cycle_path(
    edges: &DiGraphMap<RecordId, ()>,
    scc: &[RecordId],
    start: RecordId,
) -> Vec<RecordId> {
    let members: FxHashSet<RecordId> = scc.iter().copied().collect();
    let mut parent: FxHashMap<RecordId, RecordId> = FxHashMap::default();
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        for next in edges.neighbors(node) {
            if !members.contains(&next) {
                continue;
            }
            if next == start {
                let mut path = vec![start, node];
                let mut current = node;
                while current != start {
                    current = parent[&current];
                    path.push(current);
                }
                path.reverse();
                return path;
            }
            if let std::collections::hash_map::Entry::Vacant(e) = parent.entry(next) {
                e.insert(node);
                queue.push_back(next);
            }
        }
    }

    vec![start]
}

impl fmt::Display for UnresolvedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The build graph could not be fully resolved:")?;
        for m in &self.missing {
            writeln!(
                f,
                "  {} {} was referenced but never declared (referenced by {})",
                m.kind,
                m.label,
                format_labels(&m.referenced_by)
            )?;
        }
        for c in &self.cycles {
            writeln!(
                f,
                "  {} declared but never satisfied (cycle): {}",
                format_labels(&c.members),
                format_path(&c.path)
            )?;
        }
        for b in &self.blocked {
            writeln!(
                f,
                "  {} is still waiting on {} dependencies: {}",
                b.label,
                b.unresolved_count,
                format_labels(&b.waiting_on)
            )?;
        }
        Ok(())
    }
}
