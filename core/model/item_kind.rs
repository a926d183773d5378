use super::Item;
use serde::{Deserialize, Serialize};

/// The closed set of things a build description can declare.
///
/// `Unknown` never describes a real item. Seeing it anywhere in the graph means the graph itself
/// is broken.
///
#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Target,
    Config,
    Toolchain,
    Pool,
    #[default]
    Unknown,
}

impl ItemKind {
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Target => "target",
            ItemKind::Config => "config",
            ItemKind::Toolchain => "toolchain",
            ItemKind::Pool => "pool",
            ItemKind::Unknown => "unknown",
        }
    }

    pub fn of(item: &Item) -> ItemKind {
        match item {
            Item::Target(_) => ItemKind::Target,
            Item::Config(_) => ItemKind::Config,
            Item::Toolchain(_) => ItemKind::Toolchain,
            Item::Pool(_) => ItemKind::Pool,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ItemKind::Unknown)
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl quickcheck::Arbitrary for ItemKind {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            *g.choose(&[
                ItemKind::Target,
                ItemKind::Config,
                ItemKind::Toolchain,
                ItemKind::Pool,
            ])
            .unwrap()
        }
    }

    #[test]
    fn names_match_the_build_language() {
        assert_eq!(ItemKind::Target.name(), "target");
        assert_eq!(ItemKind::Config.name(), "config");
        assert_eq!(ItemKind::Toolchain.name(), "toolchain");
        assert_eq!(ItemKind::Pool.name(), "pool");
        assert_eq!(ItemKind::Unknown.name(), "unknown");
    }

    #[quickcheck]
    fn only_unknown_is_not_known(kind: ItemKind) {
        assert!(kind.is_known());
        assert!(!ItemKind::Unknown.is_known());
    }
}
