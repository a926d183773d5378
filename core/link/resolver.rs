use super::*;
use crate::events::event::LinkEvent;
use crate::events::EventChannel;
use crate::graph::{ResolvedGraph, TargetResolution};
use crate::model::{ConfigValues, CrateType, Label, LibFile, OutputFile, OutputType, RustTool, Target};
use crate::sync::Arc;
use crate::util::UniqueVec;
use fxhash::FxHashMap;
use tracing::*;

/// Computes the `rustc` arguments of Rust targets out of a fully resolved graph.
///
pub struct RustLinkResolver<'a> {
    graph: &'a ResolvedGraph,
    default_rust_tool: &'a RustTool,
    event_channel: Arc<EventChannel>,
}

impl<'a> RustLinkResolver<'a> {
    pub fn new(
        graph: &'a ResolvedGraph,
        default_rust_tool: &'a RustTool,
        event_channel: Arc<EventChannel>,
    ) -> Self {
        Self {
            graph,
            default_rust_tool,
            event_channel,
        }
    }

    #[tracing::instrument(name = "RustLinkResolver::link_args", skip(self))]
    pub fn link_args(&self, label: &Label) -> Result<RustLinkArgs, LinkError> {
        let (target, resolution) = match self.graph.target(label) {
            Some(found) => found,
            None if self.graph.get(label).is_some() => {
                return Err(LinkError::NotATarget(label.clone()))
            }
            None => return Err(LinkError::UnknownLabel(label.clone())),
        };

        if target.output_type() == OutputType::SourceSet
            || !target.source_types_used().rust_source_used()
        {
            return Err(LinkError::NotARustTarget(label.clone()));
        }

        let args = LinkArgsBuilder::new(self.graph, target, resolution, self.tool_for(target))
            .build()?;

        debug!(
            "{} has {} externs and {} search paths",
            label,
            args.externs.len(),
            args.search_only_paths.len()
        );
        self.event_channel.send(LinkEvent::LinkArgsComputed {
            target: label.clone(),
            externs: args.externs.len(),
        });

        Ok(args)
    }

    fn tool_for(&self, target: &Target) -> &'a RustTool {
        target
            .toolchain()
            .and_then(|l| self.graph.toolchain(l))
            .and_then(|t| t.rust_tool())
            .unwrap_or(self.default_rust_tool)
    }
}

/// The externs emitted so far, keyed by the artifact they point at.
#[derive(Default)]
struct EmittedExterns {
    externs: Vec<ExternCrateArg>,
    by_artifact: FxHashMap<OutputFile, (Label, String)>,
}

impl EmittedExterns {
    /// Marks the artifact of `dep` as emitted, adding it to the extern prelude if asked to and if
    /// it was not emitted before. An artifact already claimed by another label under a different
    /// crate name is ambiguous.
    fn claim(
        &mut self,
        dep: &Target,
        crate_name: &str,
        add_extern: bool,
    ) -> Result<bool, LinkError> {
        let artifact = dep.dependency_output_file();
        if let Some((first, first_name)) = self.by_artifact.get(artifact) {
            if first != dep.label() && first_name != crate_name {
                return Err(LinkError::ClassificationAmbiguity {
                    artifact: artifact.clone(),
                    first: first.clone(),
                    first_name: first_name.clone(),
                    second: dep.label().clone(),
                    second_name: crate_name.to_string(),
                });
            }
            return Ok(false);
        }

        self.by_artifact.insert(
            artifact.clone(),
            (dep.label().clone(), crate_name.to_string()),
        );
        if add_extern {
            self.externs.push(ExternCrateArg {
                crate_name: crate_name.to_string(),
                path: artifact.to_string(),
                source: Some(dep.label().clone()),
            });
        }
        Ok(true)
    }
}

struct LinkArgsBuilder<'a> {
    graph: &'a ResolvedGraph,
    target: &'a Target,
    resolution: &'a TargetResolution,
    tool: &'a RustTool,
}

impl<'a> LinkArgsBuilder<'a> {
    fn new(
        graph: &'a ResolvedGraph,
        target: &'a Target,
        resolution: &'a TargetResolution,
        tool: &'a RustTool,
    ) -> Self {
        Self {
            graph,
            target,
            resolution,
            tool,
        }
    }

    fn build(self) -> Result<RustLinkArgs, LinkError> {
        let classified = ClassifiedDeps::of(self.graph, self.target, self.resolution)?;
        let configs = ConfigValuesIter::new(self.graph, self.target).collect_all()?;

        let mut implicit_deps: UniqueVec<OutputFile> = UniqueVec::new();
        let mut order_only_deps: Vec<OutputFile> = vec![];
        let mut nonrustdeps: Vec<OutputFile> = vec![];

        implicit_deps.extend(self.target.sources().iter().map(|s| OutputFile::new(s.as_str())));
        implicit_deps.extend(
            self.target
                .config_values()
                .inputs()
                .iter()
                .map(|s| OutputFile::new(s.as_str())),
        );
        implicit_deps.extend(classified.extra_object_files.iter().cloned());
        nonrustdeps.extend(classified.extra_object_files.iter().cloned());

        for dep in &classified.framework_deps {
            order_only_deps.push(dep.dependency_output_file().clone());
        }
        for dep in &classified.non_linkable_deps {
            order_only_deps.push(dep.dependency_output_file().clone());
        }
        for dep in &classified.linkable_deps {
            // Crates without metadata (cdylibs) link like any native library.
            if !dep.exposes_rust_metadata() {
                nonrustdeps.push(dep.link_output_file().clone());
            }
            implicit_deps.push(dep.dependency_output_file().clone());
        }

        for values in &configs {
            for (_, lib) in values.externs() {
                if lib.is_path() {
                    implicit_deps.push(OutputFile::new(lib.as_str()));
                }
            }
        }

        let mut emitted = EmittedExterns::default();

        for dep in classified.extern_candidates() {
            let is_extern_kind = dep.exposes_rust_metadata()
                && (matches!(
                    dep.output_type(),
                    OutputType::RustLibrary | OutputType::RustProcMacro
                ) || (dep.source_types_used().rust_source_used()
                    && dep.inferred_crate_type() == CrateType::Dylib));
            if is_extern_kind {
                emitted.claim(dep, &self.crate_name_of(dep), true)?;
            }
        }

        // Every transitive crate is searchable, whether or not it is also nameable.
        let mut search_paths: UniqueVec<SearchPath> = UniqueVec::new();
        for (label, has_direct_access) in self.resolution.rust_libs().ordered_and_public_flag() {
            let dep = match self.graph.target(label) {
                Some((dep, _)) => dep,
                None => continue,
            };
            if !dep.exposes_rust_metadata() {
                continue;
            }
            emitted.claim(dep, &self.crate_name_of(dep), *has_direct_access)?;
            search_paths.push(SearchPath(dep.dependency_output_file().dir().to_string()));
        }

        let mut externs = emitted.externs;
        self.append_config_externs(&configs, &mut externs)?;

        let native_link_args = self.native_link_args(&nonrustdeps, &configs);

        let rust_values = self.target.rust_values();
        Ok(RustLinkArgs {
            target: self.target.label().clone(),
            crate_name: if rust_values.crate_name().is_empty() {
                self.target.label().name().to_string()
            } else {
                rust_values.crate_name().to_string()
            },
            crate_type: self.target.inferred_crate_type(),
            externs,
            search_only_paths: search_paths.into_vec(),
            native_link_args,
            custom_linker_flags: merged(&configs, ConfigValues::ldflags),
            rustflags: merged(&configs, ConfigValues::rustflags),
            rustenv: merged(&configs, ConfigValues::rustenv),
            implicit_deps: implicit_deps.into_vec(),
            order_only_deps,
        })
    }

    /// The name `dep` is known by in this target: its alias if the target renamed it, otherwise
    /// its own crate name.
    fn crate_name_of(&self, dep: &Target) -> String {
        if let Some(alias) = self.target.rust_values().aliased_deps().get(dep.label()) {
            return alias.clone();
        }
        match dep.rust_values().crate_name() {
            "" => dep.label().name().to_string(),
            name => name.to_string(),
        }
    }

    fn append_config_externs(
        &self,
        configs: &[&ConfigValues],
        externs: &mut Vec<ExternCrateArg>,
    ) -> Result<(), LinkError> {
        let mut seen: FxHashMap<&str, &LibFile> = FxHashMap::default();
        for values in configs {
            for (crate_name, lib) in values.externs() {
                match seen.get(crate_name.as_str()) {
                    Some(first) if *first != lib => {
                        return Err(LinkError::ConflictingExterns {
                            target: self.target.label().clone(),
                            crate_name: crate_name.clone(),
                            first: first.to_string(),
                            second: lib.to_string(),
                        })
                    }
                    Some(_) => continue,
                    None => {
                        seen.insert(crate_name, lib);
                    }
                }
                externs.push(ExternCrateArg {
                    crate_name: crate_name.clone(),
                    path: lib.to_string(),
                    source: None,
                });
            }
        }
        Ok(())
    }

    fn native_link_args(&self, nonrustdeps: &[OutputFile], configs: &[&ConfigValues]) -> Vec<String> {
        let mut args = vec![];

        let mut dirs: UniqueVec<&str> = UniqueVec::new();
        dirs.extend(nonrustdeps.iter().map(|d| d.dir()));
        args.extend(dirs.iter().map(|d| format!("-Lnative={d}")));

        // rustc may have left the linker in static-only mode.
        if !nonrustdeps.is_empty() {
            args.push("-Clink-arg=-Bdynamic".to_string());
        }
        args.extend(nonrustdeps.iter().map(|d| format!("-Clink-arg={d}")));

        let mut lib_dirs: UniqueVec<String> = UniqueVec::new();
        lib_dirs.extend(merged(configs, ConfigValues::lib_dirs));
        args.extend(
            lib_dirs
                .iter()
                .map(|d| format!("{}{}", self.tool.lib_dir_switch(), d)),
        );

        let mut libs: UniqueVec<String> = UniqueVec::new();
        libs.extend(merged(configs, ConfigValues::libs));
        args.extend(
            libs.iter()
                .map(|l| format!("{}{}", self.tool.lib_switch(), l)),
        );

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ResolutionGraph;
    use crate::model::{Item, RustValues, TargetBuilder};

    fn label(s: &str) -> Label {
        s.parse().unwrap()
    }

    fn rlib(name: &str) -> TargetBuilder {
        let l = label(name);
        let mut builder = Target::builder();
        builder
            .label(l.clone())
            .output_type(OutputType::RustLibrary)
            .sources(vec![format!("{}lib.rs", l.dir().trim_start_matches('/'))])
            .rust_values(RustValues::builder().crate_name(l.name()).build().unwrap())
            .dependency_output_file(format!(
                "obj/{}lib{}.rlib",
                l.dir().trim_start_matches('/'),
                l.name()
            ));
        builder
    }

    fn resolve(items: Vec<Item>) -> ResolvedGraph {
        let graph = ResolutionGraph::default();
        for item in items {
            graph.declare(item).unwrap();
        }
        graph.finish().unwrap()
    }

    fn link_args(graph: &ResolvedGraph, name: &str) -> Result<RustLinkArgs, LinkError> {
        let tool = RustTool::default();
        RustLinkResolver::new(graph, &tool, Arc::new(EventChannel::new())).link_args(&label(name))
    }

    #[test]
    fn an_alias_takes_priority_over_the_crate_name() {
        let mut aliases = std::collections::BTreeMap::new();
        aliases.insert(label("//d:d"), "renamed".to_string());
        let graph = resolve(vec![
            rlib("//d:d").build().unwrap().into(),
            rlib("//a:a")
                .public_deps(vec![label("//d:d")])
                .rust_values(
                    RustValues::builder()
                        .crate_name("a")
                        .aliased_deps(aliases)
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap()
                .into(),
        ]);

        let args = link_args(&graph, "//a:a").unwrap();
        assert_eq!(args.externs_line(), "--extern renamed=obj/d/libd.rlib");
    }

    #[test]
    fn two_labels_producing_one_artifact_under_different_names_is_ambiguous() {
        let graph = resolve(vec![
            rlib("//d:d").build().unwrap().into(),
            rlib("//e:e")
                .dependency_output_file("obj/d/libd.rlib")
                .build()
                .unwrap()
                .into(),
            rlib("//a:a")
                .public_deps(vec![label("//d:d"), label("//e:e")])
                .build()
                .unwrap()
                .into(),
        ]);

        assert_matches!(
            link_args(&graph, "//a:a"),
            Err(LinkError::ClassificationAmbiguity { first, second, .. })
                if first == label("//d:d") && second == label("//e:e")
        );
    }

    #[test]
    fn config_externs_follow_dependency_externs() {
        let graph = resolve(vec![
            rlib("//d:d").build().unwrap().into(),
            rlib("//a:a")
                .public_deps(vec![label("//d:d")])
                .config_values(
                    ConfigValues::builder()
                        .externs(vec![(
                            "serde".to_string(),
                            LibFile::Path("prebuilt/libserde.rlib".to_string()),
                        )])
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap()
                .into(),
        ]);

        let args = link_args(&graph, "//a:a").unwrap();
        assert_eq!(
            args.externs_line(),
            "--extern d=obj/d/libd.rlib --extern serde=prebuilt/libserde.rlib"
        );
        assert!(args
            .implicit_deps
            .contains(&OutputFile::new("prebuilt/libserde.rlib")));
    }

    #[test]
    fn library_switches_come_from_the_toolchain() {
        let graph = resolve(vec![
            Item::Toolchain(
                crate::model::Toolchain::builder()
                    .label(label("//tc:msvc"))
                    .rust_tool(
                        RustTool::builder()
                            .lib_switch("/l:")
                            .lib_dir_switch("/L:")
                            .build()
                            .unwrap(),
                    )
                    .build()
                    .unwrap(),
            ),
            rlib("//a:a")
                .toolchain(label("//tc:msvc"))
                .config_values(
                    ConfigValues::builder()
                        .lib_dirs(vec!["third_party/z".to_string()])
                        .libs(vec!["z".to_string()])
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap()
                .into(),
        ]);

        let args = link_args(&graph, "//a:a").unwrap();
        assert_eq!(args.native_link_args, vec!["/L:third_party/z", "/l:z"]);
    }

    #[test]
    fn non_rust_targets_have_no_link_args() {
        let graph = resolve(vec![Target::builder()
            .label(label("//c:c"))
            .output_type(OutputType::StaticLibrary)
            .sources(vec!["c.c".to_string()])
            .build()
            .unwrap()
            .into()]);

        assert_matches!(link_args(&graph, "//c:c"), Err(LinkError::NotARustTarget(_)));
        assert_matches!(link_args(&graph, "//nope:nope"), Err(LinkError::UnknownLabel(_)));
    }
}
