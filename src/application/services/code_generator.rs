//! Short code generation and reservation.

use std::sync::Arc;

use rand::Rng;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::{CodeGeneratorConfig, DEFAULT_CODE_ALPHABET};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Produces short codes and checks them against the store.
///
/// The existence check here only narrows the window for collisions. The
/// store's unique constraint is what makes two concurrent reservations of the
/// same code impossible, so callers must still handle
/// [`AppError::DuplicateCode`] from [`LinkRepository::create`].
pub struct CodeGenerator {
    repository: Arc<dyn LinkRepository>,
    alphabet: Vec<u8>,
    length: usize,
    max_attempts: usize,
}

impl CodeGenerator {
    pub fn new(repository: Arc<dyn LinkRepository>, config: CodeGeneratorConfig) -> Self {
        let alphabet = if config.alphabet.is_empty() {
            DEFAULT_CODE_ALPHABET.as_bytes().to_vec()
        } else {
            config.alphabet.into_bytes()
        };

        Self {
            repository,
            alphabet,
            length: config.length.max(1),
            max_attempts: config.max_attempts.max(1),
        }
    }

    /// Generates a random candidate of the configured length.
    ///
    /// No uniqueness guarantee.
    pub fn generate(&self) -> String {
        self.generate_with_length(self.length)
    }

    fn generate_with_length(&self, length: usize) -> String {
        let mut rng = rand::rng();
        (0..length)
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())] as char)
            .collect()
    }

    /// Returns a code that is unused at the time of the check.
    ///
    /// - With a custom alias, fails with [`AppError::AliasTaken`] if the alias exists.
    /// - Otherwise generates candidates until one is free. After `max_attempts`
    ///   collisions at the configured length, one more round is tried with
    ///   codes one character longer.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if both rounds collide on every attempt.
    /// Returns [`AppError::Unavailable`] if the store cannot be reached.
    pub async fn reserve_unique(&self, custom_alias: Option<&str>) -> Result<String, AppError> {
        if let Some(alias) = custom_alias {
            if self.repository.find_by_code(alias).await?.is_some() {
                return Err(AppError::alias_taken(
                    "Custom alias already taken",
                    json!({ "alias": alias }),
                ));
            }
            return Ok(alias.to_string());
        }

        for length in [self.length, self.length + 1] {
            for attempt in 1..=self.max_attempts {
                let code = self.generate_with_length(length);

                if self.repository.find_by_code(&code).await?.is_none() {
                    return Ok(code);
                }

                debug!(attempt, length, "Generated code {} collided", code);
            }

            warn!(
                "{} collisions at code length {}; lengthening codes",
                self.max_attempts, length
            );
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions", "attempts": self.max_attempts * 2 }),
        ))
    }
}
