//! Core vocabulary for stock-crew
//!
//! This crate defines the types shared by every other crate in the workspace:
//! the closed set of analysis [`Kind`]s, the [`Job`] a kind is turned into,
//! the inputs a job is rendered with, and the traits at the seams to the
//! outside world ([`ReasoningBackend`], [`DescriptorProvider`], [`Tool`]).

pub mod backend;
pub mod descriptor;
pub mod error;
pub mod job;
pub mod kind;
pub mod tool;

pub use backend::{BackendOutput, ReasoningBackend, TaskReport, UsageStats};
pub use descriptor::{Descriptor, DescriptorProvider};
pub use error::{Error, Result};
pub use job::{Job, JobSpec, JobVariant, Persona, RenderedTask, TaskInputs, TaskTemplate};
pub use kind::{Kind, ParseKindError};
pub use tool::Tool;
