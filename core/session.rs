use crate::graph::{GraphError, ResolutionGraph, ResolvedGraph};
use crate::link::{LinkError, RustLinkArgs, RustLinkResolver};
use crate::loader::{BuildDescriptionFile, LoaderError};
use crate::model::{Item, Label, OutputType};
use crate::ResolverConfig;
use std::path::Path;
use thiserror::*;
use tracing::*;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Graph(GraphError),

    #[error(transparent)]
    Link(LinkError),

    #[error(transparent)]
    Loader(LoaderError),

    #[error("The target {0} does not say which toolchain it is built with")]
    MissingToolchain(Label),

    #[error("A worker thread panicked while declaring items")]
    WorkerPanicked,
}

impl From<GraphError> for SessionError {
    fn from(value: GraphError) -> Self {
        SessionError::Graph(value)
    }
}

impl From<LinkError> for SessionError {
    fn from(value: LinkError) -> Self {
        SessionError::Link(value)
    }
}

impl From<LoaderError> for SessionError {
    fn from(value: LoaderError) -> Self {
        SessionError::Loader(value)
    }
}

/// One resolution of one build description.
///
/// Items are declared (from any number of threads) until the description is exhausted, and then
/// the session is finished, which either yields a `ResolvedSession` or reports what kept the
/// graph from resolving.
///
/// ```rust,no_run
/// use brisk_core::*;
/// use std::path::Path;
///
/// let session = BuildSession::new(ResolverConfig::default());
/// session.load(Path::new("Brisk.json")).unwrap();
/// let resolved = session.finish().unwrap();
/// for args in resolved.link_args_for_all().unwrap() {
///     println!("{}", args);
/// }
/// ```
///
pub struct BuildSession {
    config: ResolverConfig,
    graph: ResolutionGraph,
}

impl BuildSession {
    pub fn new(config: ResolverConfig) -> Self {
        let graph = ResolutionGraph::new(config.event_channel());
        Self { config, graph }
    }

    pub fn graph(&self) -> &ResolutionGraph {
        &self.graph
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn declare(&self, item: Item) -> Result<(), SessionError> {
        if self.config.require_toolchains() {
            if let Item::Target(target) = &item {
                if target.toolchain().is_none() {
                    return Err(SessionError::MissingToolchain(target.label().clone()));
                }
            }
        }
        self.graph.declare(item)?;
        Ok(())
    }

    /// Declare every item, spreading them over up to `max_workers` threads. Every item is
    /// attempted; all failures are reported together.
    #[tracing::instrument(name = "BuildSession::declare_all", skip(self, items))]
    pub fn declare_all(&self, items: Vec<Item>) -> Result<(), SessionError> {
        if items.is_empty() {
            return Ok(());
        }

        let workers = self.config.max_workers().max(1).min(items.len());
        let chunk_size = (items.len() + workers - 1) / workers;
        debug!(
            "Declaring {} items over {} workers",
            items.len(),
            workers
        );

        let mut chunks: Vec<Vec<Item>> = vec![];
        let mut items = items.into_iter().peekable();
        while items.peek().is_some() {
            chunks.push(items.by_ref().take(chunk_size).collect());
        }

        let results: Vec<Vec<SessionError>> = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = chunks
                .into_iter()
                .map(|chunk| {
                    scope.spawn(move |_| {
                        chunk
                            .into_iter()
                            .filter_map(|item| self.declare(item).err())
                            .collect::<Vec<SessionError>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|_| vec![SessionError::WorkerPanicked]))
                .collect()
        })
        .map_err(|_| SessionError::WorkerPanicked)?;

        let mut errors: Vec<SessionError> = results.into_iter().flatten().collect();
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => {
                let mut graph_errors = vec![];
                for err in errors {
                    match err {
                        SessionError::Graph(err) => graph_errors.push(err),
                        other => return Err(other),
                    }
                }
                Err(SessionError::Graph(GraphError::Many(graph_errors)))
            }
        }
    }

    /// Read a build description and declare everything in it.
    pub fn load(&self, path: &Path) -> Result<(), SessionError> {
        let description = BuildDescriptionFile::read(path)?;
        self.declare_all(description.items)
    }

    #[tracing::instrument(name = "BuildSession::finish", skip(self))]
    pub fn finish(self) -> Result<ResolvedSession, SessionError> {
        let graph = self.graph.finish()?;
        info!("Resolved {} items", graph.len());
        Ok(ResolvedSession {
            config: self.config,
            graph,
        })
    }
}

/// A build description where every item resolved. Link arguments are computed on demand.
///
pub struct ResolvedSession {
    config: ResolverConfig,
    graph: ResolvedGraph,
}

impl ResolvedSession {
    pub fn graph(&self) -> &ResolvedGraph {
        &self.graph
    }

    pub fn into_graph(self) -> ResolvedGraph {
        self.graph
    }

    fn resolver(&self) -> RustLinkResolver<'_> {
        RustLinkResolver::new(
            &self.graph,
            self.config.default_rust_tool(),
            self.config.event_channel(),
        )
    }

    pub fn link_args(&self, label: &Label) -> Result<RustLinkArgs, LinkError> {
        self.resolver().link_args(label)
    }

    /// Link arguments for every Rust target, in label order.
    pub fn link_args_for_all(&self) -> Result<Vec<RustLinkArgs>, LinkError> {
        let resolver = self.resolver();
        self.graph
            .targets()
            .filter(|(t, _)| {
                t.output_type() != OutputType::SourceSet && t.source_types_used().rust_source_used()
            })
            .map(|(t, _)| resolver.link_args(t.label()))
            .collect()
    }
}
