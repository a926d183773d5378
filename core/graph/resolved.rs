use super::{Resolution, TargetResolution};
use crate::model::{Config, Item, Label, Target, Toolchain};
use crate::sync::Arc;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct ResolvedItem {
    item: Arc<Item>,
    resolution: Arc<Resolution>,
}

impl ResolvedItem {
    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }
}

/// The outcome of a graph where every record resolved. Read-only, and ordered by label.
///
#[derive(Debug, Clone, Default)]
pub struct ResolvedGraph {
    items: BTreeMap<Label, ResolvedItem>,
}

impl ResolvedGraph {
    pub(crate) fn new(items: Vec<(Label, Arc<Item>, Arc<Resolution>)>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|(label, item, resolution)| (label, ResolvedItem { item, resolution }))
                .collect(),
        }
    }

    pub fn get(&self, label: &Label) -> Option<&ResolvedItem> {
        self.items.get(label)
    }

    pub fn target(&self, label: &Label) -> Option<(&Target, &TargetResolution)> {
        let resolved = self.items.get(label)?;
        Some((resolved.item.as_target()?, resolved.resolution.as_target()?))
    }

    pub fn config(&self, label: &Label) -> Option<&Config> {
        self.items.get(label)?.item.as_config()
    }

    pub fn toolchain(&self, label: &Label) -> Option<&Toolchain> {
        self.items.get(label)?.item.as_toolchain()
    }

    pub fn targets(&self) -> impl Iterator<Item = (&Target, &TargetResolution)> {
        self.items.values().filter_map(|r| {
            Some((r.item.as_target()?, r.resolution.as_target()?))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label, &ResolvedItem)> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
