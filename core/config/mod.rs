use crate::events::EventChannel;
use crate::model::RustTool;
use crate::sync::Arc;
use thiserror::*;

/// A collection of options that affect how a build graph is resolved and how link arguments are
/// computed. This is not specific to one build description.
///
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(error = "ConfigError", validate = "Self::validate"))]
pub struct ResolverConfig {
    /// The maximum number of threads used to ingest declarations in parallel.
    #[builder(default = "self.default_max_workers()")]
    max_workers: usize,

    /// Linker switches to use for targets whose toolchain does not describe a Rust tool.
    #[builder(default)]
    default_rust_tool: RustTool,

    /// Reject targets that do not name the toolchain they are built with.
    #[builder(default = "false")]
    require_toolchains: bool,

    /// The Event Channel graph events are published to.
    /// NOTE: this is safe to clone since it is really an [Arc] to a shared queue.
    #[builder(default = "self.default_event_channel()")]
    event_channel: Arc<EventChannel>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get(),
            default_rust_tool: RustTool::default(),
            require_toolchains: false,
            event_channel: EventChannel::new().into(),
        }
    }
}

impl ResolverConfig {
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::default()
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn default_rust_tool(&self) -> &RustTool {
        &self.default_rust_tool
    }

    pub fn require_toolchains(&self) -> bool {
        self.require_toolchains
    }

    pub fn event_channel(&self) -> Arc<EventChannel> {
        self.event_channel.clone()
    }
}

impl ResolverConfigBuilder {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.max_workers {
            Some(0) => Err(ConfigError::NoWorkers),
            _ => Ok(()),
        }
    }

    fn default_max_workers(&self) -> usize {
        num_cpus::get()
    }

    fn default_event_channel(&self) -> Arc<EventChannel> {
        EventChannel::new().into()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Attempted to build a ResolverConfig while missing fields: {0:?}")]
    BuilderError(derive_builder::UninitializedFieldError),

    #[error("max_workers must be at least 1")]
    NoWorkers,
}

impl From<derive_builder::UninitializedFieldError> for ConfigError {
    fn from(value: derive_builder::UninitializedFieldError) -> Self {
        ConfigError::BuilderError(value)
    }
}
