use super::LinkError;
use crate::graph::ResolvedGraph;
use crate::model::{ConfigValues, Label, Target};
use fxhash::FxHashSet;

/// Walks the config values that apply to a target: its own values first, then those of each
/// config it lists, depth-first in declaration order. A config reached twice is visited once.
///
pub struct ConfigValuesIter<'a> {
    graph: &'a ResolvedGraph,
    own: Option<&'a ConfigValues>,
    stack: Vec<&'a Label>,
    seen: FxHashSet<&'a Label>,
}

impl<'a> ConfigValuesIter<'a> {
    pub fn new(graph: &'a ResolvedGraph, target: &'a Target) -> Self {
        Self {
            graph,
            own: Some(target.config_values()),
            stack: target.configs().iter().rev().collect(),
            seen: FxHashSet::default(),
        }
    }

    /// Collects every value, failing if a listed config is missing from the graph.
    pub fn collect_all(self) -> Result<Vec<&'a ConfigValues>, LinkError> {
        self.collect()
    }
}

impl<'a> Iterator for ConfigValuesIter<'a> {
    type Item = Result<&'a ConfigValues, LinkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(own) = self.own.take() {
            return Some(Ok(own));
        }

        loop {
            let label = self.stack.pop()?;
            if !self.seen.insert(label) {
                continue;
            }
            let config = match self.graph.config(label) {
                Some(config) => config,
                None => return Some(Err(LinkError::UnknownLabel(label.clone()))),
            };
            self.stack.extend(config.configs().iter().rev());
            return Some(Ok(config.values()));
        }
    }
}

/// Concatenates one list from every value, keeping duplicates.
pub fn merged<'a, F>(values: &[&'a ConfigValues], get: F) -> Vec<String>
where
    F: Fn(&'a ConfigValues) -> &'a [String],
{
    values.iter().flat_map(|v| get(v).iter().cloned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ResolutionGraph;
    use crate::model::{Config, Item, OutputType};

    fn label(s: &str) -> Label {
        s.parse().unwrap()
    }

    fn config(name: &str, flag: &str, nested: &[&str]) -> Item {
        Config::builder()
            .label(label(name))
            .values(
                ConfigValues::builder()
                    .rustflags(vec![flag.to_string()])
                    .build()
                    .unwrap(),
            )
            .configs(nested.iter().map(|l| label(l)).collect::<Vec<_>>())
            .build()
            .unwrap()
            .into()
    }

    #[test]
    fn own_values_come_first_then_configs_depth_first() {
        let graph = ResolutionGraph::default();
        graph.declare(config("//c:base", "-Cbase", &[])).unwrap();
        graph.declare(config("//c:opt", "-Copt", &["//c:base"])).unwrap();
        graph.declare(config("//c:lto", "-Clto", &["//c:base"])).unwrap();
        graph
            .declare(
                Target::builder()
                    .label(label("//t:t"))
                    .output_type(OutputType::RustLibrary)
                    .configs(vec![label("//c:opt"), label("//c:lto")])
                    .config_values(
                        ConfigValues::builder()
                            .rustflags(vec!["-Cown".to_string()])
                            .build()
                            .unwrap(),
                    )
                    .build()
                    .unwrap()
                    .into(),
            )
            .unwrap();
        let graph = graph.finish().unwrap();

        let (target, _) = graph.target(&label("//t:t")).unwrap();
        let values = ConfigValuesIter::new(&graph, target).collect_all().unwrap();
        assert_eq!(
            merged(&values, ConfigValues::rustflags),
            vec!["-Cown", "-Copt", "-Cbase", "-Clto"]
        );
    }
}
