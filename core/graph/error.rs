use super::UnresolvedReport;
use crate::model::{ItemKind, Label};
use thiserror::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The graph's own bookkeeping is broken. This is always a bug in the resolver.
    #[error("Internal inconsistency in the resolution graph: {0}")]
    StructuralInconsistency(String),

    #[error("The item {label} was defined as a {found} but referenced as a {expected}")]
    KindMismatch {
        label: Label,
        expected: ItemKind,
        found: ItemKind,
    },

    #[error("The item {0} was declared more than once")]
    DuplicateDeclaration(Label),

    #[error("The {kind} {label} is referenced by {} but was never declared", format_labels(.referenced_by))]
    UnresolvedReference {
        label: Label,
        kind: ItemKind,
        referenced_by: Vec<Label>,
    },

    #[error("Dependency cycle: {}", format_path(.path))]
    DependencyCycle { members: Vec<Label>, path: Vec<Label> },

    #[error("{0}")]
    Unresolved(UnresolvedReport),

    #[error("{} errors while resolving the graph:\n{}", .0.len(), format_errors(.0))]
    Many(Vec<GraphError>),
}

impl GraphError {
    pub(crate) fn inconsistency<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        GraphError::StructuralInconsistency(msg.into())
    }

    /// Collapses a list of errors into one.
    pub(crate) fn from_many(mut errors: Vec<GraphError>) -> Option<GraphError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(GraphError::Many(errors)),
        }
    }
}

pub(crate) fn format_labels(labels: &[Label]) -> String {
    labels
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn format_path(labels: &[Label]) -> String {
    labels
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn format_errors(errors: &[GraphError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
