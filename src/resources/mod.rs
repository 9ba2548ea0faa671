//! Cluster resource handlers.
//!
//! One handler per resource kind knows the REST path, the response envelope
//! and the server-managed fields of that kind. The planner and applier only
//! talk to handlers through [`ResourceHandler`] and [`HandlerRegistry`].

mod component_template;
mod handler;
mod index;
mod index_template;
mod ingest_pipeline;
mod lifecycle_policy;
mod normalize;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use component_template::ComponentTemplateHandler;
pub use handler::{ClusterHandlers, HandlerRegistry, ResourceHandler};
pub use index::IndexHandler;
pub use index_template::IndexTemplateHandler;
pub use ingest_pipeline::IngestPipelineHandler;
pub use lifecycle_policy::LifecyclePolicyHandler;
pub use normalize::{normalize, NormalizationRule, StripScope};
pub use types::{DesiredResource, JsonObject, ResourceKind};

#[cfg(test)]
pub(crate) use handler::MockResourceHandler;
