use crate::model::{Label, OutputFile};
use thiserror::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("{0} is not part of the resolved graph")]
    UnknownLabel(Label),

    #[error("{0} is not a target")]
    NotATarget(Label),

    #[error("{0} is not compiled with rustc, so it has no Rust link arguments")]
    NotARustTarget(Label),

    #[error("{first} and {second} both produce {artifact} but are named {first_name:?} and {second_name:?} respectively")]
    ClassificationAmbiguity {
        artifact: OutputFile,
        first: Label,
        first_name: String,
        second: Label,
        second_name: String,
    },

    #[error("The extern crate {crate_name} of {target} points to both {first} and {second}")]
    ConflictingExterns {
        target: Label,
        crate_name: String,
        first: String,
        second: String,
    },

    #[error("Internal inconsistency while computing link arguments: {0}")]
    StructuralInconsistency(String),
}

impl LinkError {
    pub(crate) fn inconsistency<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        LinkError::StructuralInconsistency(msg.into())
    }
}
