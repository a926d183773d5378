use crate::model::{ItemKind, Label};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum GraphEvent {
    ItemDeclared { label: Label, kind: ItemKind },
    ItemResolved { label: Label, kind: ItemKind },
    ResolutionFinished { resolved: usize, unresolved: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LinkEvent {
    LinkArgsComputed { target: Label, externs: usize },
}

#[derive(Default, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Event {
    /// The "nothing happened" event.
    #[default]
    Noop,
    GraphEvent(GraphEvent),
    LinkEvent(LinkEvent),
}

impl From<GraphEvent> for Event {
    fn from(value: GraphEvent) -> Self {
        Event::GraphEvent(value)
    }
}

impl From<LinkEvent> for Event {
    fn from(value: LinkEvent) -> Self {
        Event::LinkEvent(value)
    }
}
