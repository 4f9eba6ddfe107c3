//! Helpers shared across layers.

pub mod db_error;
