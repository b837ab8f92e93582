//! Market data providers

pub mod yahoo;

pub use yahoo::YahooDescriptorProvider;
