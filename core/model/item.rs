use super::{Config, ItemKind, Label, Pool, Target, Toolchain};
use serde::{Deserialize, Serialize};

/// A fully parsed declaration from a build description.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    Target(Target),
    Config(Config),
    Toolchain(Toolchain),
    Pool(Pool),
}

impl Item {
    pub fn label(&self) -> &Label {
        match self {
            Item::Target(t) => t.label(),
            Item::Config(c) => c.label(),
            Item::Toolchain(t) => t.label(),
            Item::Pool(p) => p.label(),
        }
    }

    pub fn kind(&self) -> ItemKind {
        ItemKind::of(self)
    }

    pub fn is_of_kind(&self, kind: ItemKind) -> bool {
        kind.is_known() && self.kind() == kind
    }

    pub fn as_target(&self) -> Option<&Target> {
        match self {
            Item::Target(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_config(&self) -> Option<&Config> {
        match self {
            Item::Config(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_toolchain(&self) -> Option<&Toolchain> {
        match self {
            Item::Toolchain(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_pool(&self) -> Option<&Pool> {
        match self {
            Item::Pool(p) => Some(p),
            _ => None,
        }
    }

    /// Every label this item refers to, with the kind of item it must turn out to be.
    pub fn dependencies(&self) -> Vec<(&Label, ItemKind)> {
        match self {
            Item::Target(t) => t
                .public_deps()
                .iter()
                .chain(t.private_deps())
                .chain(t.data_deps())
                .map(|l| (l, ItemKind::Target))
                .chain(t.configs().iter().map(|l| (l, ItemKind::Config)))
                .chain(t.toolchain().map(|l| (l, ItemKind::Toolchain)))
                .chain(t.pool().map(|l| (l, ItemKind::Pool)))
                .collect(),
            Item::Config(c) => c.configs().iter().map(|l| (l, ItemKind::Config)).collect(),
            Item::Toolchain(t) => t.deps().iter().map(|l| (l, ItemKind::Target)).collect(),
            Item::Pool(_) => vec![],
        }
    }
}

impl From<Target> for Item {
    fn from(value: Target) -> Self {
        Item::Target(value)
    }
}

impl From<Config> for Item {
    fn from(value: Config) -> Self {
        Item::Config(value)
    }
}

impl From<Toolchain> for Item {
    fn from(value: Toolchain) -> Self {
        Item::Toolchain(value)
    }
}

impl From<Pool> for Item {
    fn from(value: Pool) -> Self {
        Item::Pool(value)
    }
}
