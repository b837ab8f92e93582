//! Job construction and caching
//!
//! - [`templates`]: persona and task text per kind
//! - [`JobBuilder`]: builds specialist jobs, degrading to [`FallbackFactory`]
//! - [`JobRegistry`]: at-most-once construction per kind

pub mod builder;
pub mod fallback;
pub mod registry;
pub mod templates;

pub use builder::{JobBuilder, JobFactory};
pub use fallback::FallbackFactory;
pub use registry::JobRegistry;
