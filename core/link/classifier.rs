use super::LinkError;
use crate::graph::{ResolvedGraph, TargetResolution};
use crate::model::{Label, OutputFile, OutputType, Target};
use crate::util::UniqueVec;
use fxhash::FxHashSet;

/// The dependencies of one target, split by how they take part in its link.
///
#[derive(Debug, Default)]
pub struct ClassifiedDeps<'a> {
    /// Object files of source sets, linked straight into the target.
    pub extra_object_files: UniqueVec<OutputFile>,

    /// Dependencies whose output goes on the link line.
    pub linkable_deps: Vec<&'a Target>,

    /// Dependencies that must be built first but are not linked.
    pub non_linkable_deps: Vec<&'a Target>,

    pub framework_deps: Vec<&'a Target>,

    seen: FxHashSet<Label>,
}

impl<'a> ClassifiedDeps<'a> {
    /// Classify the direct linked dependencies of `target`, followed by the native libraries that
    /// reached it through intermediate targets, and finally its data dependencies.
    ///
    pub fn of(
        graph: &'a ResolvedGraph,
        target: &'a Target,
        resolution: &'a TargetResolution,
    ) -> Result<Self, LinkError> {
        let mut classified = ClassifiedDeps::default();

        let linked = target.linked_deps().map(|(label, _)| label);
        let inherited = resolution.native_libs().ordered();
        for label in linked.chain(inherited) {
            let dep = lookup(graph, target, label)?;
            classified.classify(target, dep);
        }

        for label in target.data_deps() {
            let dep = lookup(graph, target, label)?;
            if classified.seen.insert(dep.label().clone()) {
                classified.non_linkable_deps.push(dep);
            }
        }

        Ok(classified)
    }

    fn classify(&mut self, target: &Target, dep: &'a Target) {
        if !self.seen.insert(dep.label().clone()) {
            return;
        }

        let can_link_libs = target.is_final();

        let links_as_objects = dep.output_type() == OutputType::SourceSet
            || (target.output_type() == OutputType::StaticLibrary
                && target.is_complete_static_lib()
                && dep.output_type() == OutputType::StaticLibrary
                && !dep.is_complete_static_lib());

        if links_as_objects {
            if can_link_libs {
                self.extra_object_files
                    .extend(dep.object_files().iter().cloned());
            }
            self.non_linkable_deps.push(dep);
        } else if target.output_type() == OutputType::RustLibrary && dep.is_linkable() {
            // Rust libraries are not final, but their link line carries every library below them.
            self.linkable_deps.push(dep);
        } else if target.is_complete_static_lib() && dep.is_final() {
            self.non_linkable_deps.push(dep);
        } else if can_link_libs && dep.is_linkable() {
            self.linkable_deps.push(dep);
        } else if dep.output_type() == OutputType::CreateBundle && dep.bundle_is_framework() {
            self.framework_deps.push(dep);
        } else {
            self.non_linkable_deps.push(dep);
        }
    }

    /// Linkable dependencies first, then non-linkable ones. These are the candidates for
    /// `--extern`.
    pub fn extern_candidates(&self) -> impl Iterator<Item = &'a Target> + '_ {
        self.linkable_deps
            .iter()
            .chain(self.non_linkable_deps.iter())
            .copied()
    }
}

fn lookup<'a>(
    graph: &'a ResolvedGraph,
    target: &Target,
    label: &Label,
) -> Result<&'a Target, LinkError> {
    match graph.target(label) {
        Some((dep, _)) => Ok(dep),
        None if graph.get(label).is_some() => Err(LinkError::NotATarget(label.clone())),
        None => Err(LinkError::inconsistency(format!(
            "{} depends on {} which is not in the resolved graph",
            target.label(),
            label
        ))),
    }
}
