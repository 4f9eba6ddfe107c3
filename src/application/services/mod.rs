//! Business logic services for the application layer.

pub mod code_generator;
pub mod resolution_service;

pub use code_generator::CodeGenerator;
pub use resolution_service::{LookupSource, Resolution, ResolutionService};
