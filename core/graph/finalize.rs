use super::{GraphError, Resolution, ResolutionGraph, TargetResolution};
use crate::link::InheritedLibraries;
use crate::model::{Item, Target};
use tracing::*;

/// The kind-specific resolution step, run once every dependency of `item` has resolved.
pub(crate) fn finalize(graph: &ResolutionGraph, item: &Item) -> Result<Resolution, GraphError> {
    match item {
        Item::Target(target) => finalize_target(graph, target).map(Resolution::Target),
        Item::Config(_) => Ok(Resolution::Config),
        Item::Toolchain(_) => Ok(Resolution::Toolchain),
        Item::Pool(_) => Ok(Resolution::Pool),
    }
}

/// Compute the Rust crates a target can see and the native libraries it passes along, from the
/// already computed sets of its linked dependencies.
///
fn finalize_target(graph: &ResolutionGraph, target: &Target) -> Result<TargetResolution, GraphError> {
    let mut rust_libs = InheritedLibraries::new();
    let mut inheritable = InheritedLibraries::new();
    let mut native_libs = InheritedLibraries::new();

    for (label, is_public) in target.linked_deps() {
        let (dep_item, dep_resolution) = graph.resolved(label).ok_or_else(|| {
            GraphError::inconsistency(format!(
                "{} was finalized before its dependency {} resolved",
                target.label(),
                label
            ))
        })?;
        let (dep, resolution) = match (dep_item.as_target(), dep_resolution.as_target()) {
            (Some(dep), Some(resolution)) => (dep, resolution),
            _ => {
                return Err(GraphError::inconsistency(format!(
                    "{} depends on {} which did not resolve as a target",
                    target.label(),
                    label
                )))
            }
        };

        if dep.is_rust_crate() {
            rust_libs.append(label.clone(), true);
            rust_libs.append_inherited(resolution.inheritable_libs(), true);

            inheritable.append(label.clone(), is_public);
            inheritable.append_inherited(resolution.inheritable_libs(), is_public);
        } else {
            if dep.is_linkable() {
                native_libs.append(label.clone(), is_public);
            }
            // Groups and other non-crate intermediates pass their crates straight through.
            if !dep.is_final() {
                rust_libs.append_inherited(resolution.inheritable_libs(), true);
                inheritable.append_inherited(resolution.inheritable_libs(), is_public);
            }
        }

        if !dep.is_final() {
            native_libs.append_inherited(resolution.native_libs(), is_public);
        }
    }

    // Final targets link everything in, nothing flows through them.
    if target.is_final() {
        inheritable = InheritedLibraries::new();
    }

    trace!(
        "{} sees {} rust crates, passes on {}",
        target.label(),
        rust_libs.len(),
        inheritable.len()
    );

    Ok(TargetResolution::new(rust_libs, inheritable, native_libs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CrateType, Label, OutputType, RustValues};

    fn label(s: &str) -> Label {
        s.parse().unwrap()
    }

    fn rlib(name: &str, public: &[&str], private: &[&str]) -> Item {
        Target::builder()
            .label(label(name))
            .output_type(OutputType::RustLibrary)
            .sources(vec!["lib.rs".to_string()])
            .public_deps(public.iter().map(|d| label(d)).collect())
            .private_deps(private.iter().map(|d| label(d)).collect())
            .build()
            .unwrap()
            .into()
    }

    fn resolution_of(graph: &ResolutionGraph, l: &str) -> TargetResolution {
        let (_, resolution) = graph.resolved(&label(l)).unwrap();
        resolution.as_target().unwrap().clone()
    }

    #[test]
    fn public_deps_are_inherited_private_ones_are_hidden() {
        let graph = ResolutionGraph::default();
        graph.declare(rlib("//d:d", &[], &[])).unwrap();
        graph.declare(rlib("//c:c", &[], &[])).unwrap();
        graph.declare(rlib("//b:b", &["//d:d"], &["//c:c"])).unwrap();
        graph.declare(rlib("//a:a", &["//b:b"], &[])).unwrap();

        let b = resolution_of(&graph, "//b:b");
        assert_eq!(
            b.inheritable_libs().ordered_and_public_flag(),
            &[(label("//d:d"), true), (label("//c:c"), false)]
        );

        let a = resolution_of(&graph, "//a:a");
        assert_eq!(a.rust_libs().has_direct_access(&label("//b:b")), Some(true));
        assert_eq!(a.rust_libs().has_direct_access(&label("//d:d")), Some(true));
        assert_eq!(a.rust_libs().has_direct_access(&label("//c:c")), Some(false));
    }

    #[test]
    fn final_targets_pass_nothing_on() {
        let graph = ResolutionGraph::default();
        graph.declare(rlib("//d:d", &[], &[])).unwrap();
        graph
            .declare(
                Target::builder()
                    .label(label("//p:p"))
                    .output_type(OutputType::RustProcMacro)
                    .sources(vec!["lib.rs".to_string()])
                    .rust_values(
                        RustValues::builder()
                            .crate_type(CrateType::ProcMacro)
                            .build()
                            .unwrap(),
                    )
                    .public_deps(vec![label("//d:d")])
                    .build()
                    .unwrap()
                    .into(),
            )
            .unwrap();

        let p = resolution_of(&graph, "//p:p");
        assert!(p.rust_libs().contains(&label("//d:d")));
        assert!(p.inheritable_libs().is_empty());
    }

    #[test]
    fn groups_forward_the_crates_they_depend_on() {
        let graph = ResolutionGraph::default();
        graph.declare(rlib("//r:r", &[], &[])).unwrap();
        graph
            .declare(
                Target::builder()
                    .label(label("//g:g"))
                    .output_type(OutputType::Group)
                    .public_deps(vec![label("//r:r")])
                    .build()
                    .unwrap()
                    .into(),
            )
            .unwrap();
        graph.declare(rlib("//a:a", &["//g:g"], &[])).unwrap();
        graph.declare(rlib("//top:top", &[], &["//a:a"])).unwrap();

        let g = resolution_of(&graph, "//g:g");
        assert_eq!(
            g.inheritable_libs().ordered_and_public_flag(),
            &[(label("//r:r"), true)]
        );

        let a = resolution_of(&graph, "//a:a");
        assert_eq!(a.rust_libs().has_direct_access(&label("//r:r")), Some(true));
        assert!(!a.rust_libs().contains(&label("//g:g")));

        let top = resolution_of(&graph, "//top:top");
        assert_eq!(top.rust_libs().has_direct_access(&label("//r:r")), Some(true));
    }

    #[test]
    fn native_libs_flow_through_intermediate_targets() {
        let graph = ResolutionGraph::default();
        graph
            .declare(
                Target::builder()
                    .label(label("//f:f"))
                    .output_type(OutputType::StaticLibrary)
                    .sources(vec!["f.c".to_string()])
                    .build()
                    .unwrap()
                    .into(),
            )
            .unwrap();
        graph.declare(rlib("//r:r", &["//f:f"], &[])).unwrap();
        graph.declare(rlib("//top:top", &[], &["//r:r"])).unwrap();

        let top = resolution_of(&graph, "//top:top");
        assert!(top.native_libs().contains(&label("//f:f")));
        assert!(!top.rust_libs().contains(&label("//f:f")));
    }
}
