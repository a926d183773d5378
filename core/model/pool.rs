use super::Label;
use serde::{Deserialize, Serialize};

/// A named limit on how many jobs of a kind may run at once.
///
#[derive(Builder, Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pool {
    label: Label,

    #[builder(default)]
    depth: u32,
}

impl Pool {
    pub fn builder() -> PoolBuilder {
        PoolBuilder::default()
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }
}
