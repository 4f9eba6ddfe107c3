//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository and
//! cache calls. Services consume traits and provide a clean API for HTTP
//! handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::resolution_service::ResolutionService`] - Resolution, creation and statistics
//! - [`services::code_generator::CodeGenerator`] - Short code generation and reservation

pub mod services;
