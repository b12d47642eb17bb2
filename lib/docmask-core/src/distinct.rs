use serde_json::Value;
use tracing::warn;

use crate::error::GenerateError;
use crate::generator::SubstituteGenerator;
use crate::type_tag::TypeTag;

/// Default number of generation attempts before giving up on distinctness.
pub const DEFAULT_MAX_ATTEMPTS: usize = 32;

/// Wraps a generator so that substitutes differ from the value they replace.
///
/// The generator is asked again while it returns a value equal to the
/// original. Small categories (two-letter state codes) may collide a few
/// times; after `max_attempts` the last generated value is returned anyway and
/// a warning is logged, so the loop always terminates.
#[derive(Debug)]
pub struct Distinct<'g, G: ?Sized> {
    generator: &'g mut G,
    max_attempts: usize,
}

impl<'g, G> Distinct<'g, G>
where
    G: SubstituteGenerator + ?Sized,
{
    /// Wrap a generator with [`DEFAULT_MAX_ATTEMPTS`].
    pub fn new(generator: &'g mut G) -> Self {
        Self::with_max_attempts(generator, DEFAULT_MAX_ATTEMPTS)
    }

    /// Wrap a generator with a custom attempt ceiling (at least one attempt is
    /// always made).
    pub fn with_max_attempts(generator: &'g mut G, max_attempts: usize) -> Self {
        Self {
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Generate a substitute of `tag` different from `original`.
    ///
    /// # Errors
    ///
    /// Propagates the first generator failure; failures are never retried.
    pub fn generate_distinct(
        &mut self,
        tag: &TypeTag,
        original: &Value,
    ) -> Result<Value, GenerateError> {
        let mut candidate = self.generator.generate(tag)?;
        let mut attempts = 1;
        while candidate == *original {
            if attempts >= self.max_attempts {
                warn!(
                    %tag,
                    attempts,
                    "no distinct substitute found, keeping the last generated value"
                );
                break;
            }
            candidate = self.generator.generate(tag)?;
            attempts += 1;
        }
        Ok(candidate)
    }
}

/// One-shot form of [`Distinct::generate_distinct`] with the default ceiling.
///
/// # Errors
///
/// Propagates generator failures.
pub fn generate_distinct<G>(
    generator: &mut G,
    tag: &TypeTag,
    original: &Value,
) -> Result<Value, GenerateError>
where
    G: SubstituteGenerator + ?Sized,
{
    Distinct::new(generator).generate_distinct(tag, original)
}
