//! Application use cases

pub mod publish_workflow;
pub mod translate;

pub use publish_workflow::{PublishWorkflow, WorkflowError, WorkflowOptions};
pub use translate::MarkdownTranslator;
