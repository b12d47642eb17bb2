//! Substitute value generation.
//!
//! The [`SubstituteGenerator`] trait is the only capability the masking core
//! needs: given a [`TypeTag`], produce a plausible random value of that
//! category. It is implemented for:
//!
//! - [`FakeGenerator`], backed by the `fake` crate over a seedable RNG
//! - Functions `FnMut(&TypeTag) -> Result<Value, GenerateError>`
//!
//! # Examples
//!
//! ```rust
//! use docmask_core::{FakeGenerator, GenerateError, SubstituteGenerator, TypeTag};
//!
//! let mut generator = FakeGenerator::seeded(42);
//! let city = generator.generate(&TypeTag::City)?;
//! assert!(city.is_string());
//!
//! // A fixed-value generator, handy in tests
//! let mut constant = |_tag: &TypeTag| Ok::<_, GenerateError>(serde_json::json!("XXX"));
//! assert_eq!(constant.generate(&TypeTag::Name)?, "XXX");
//! # Ok::<(), GenerateError>(())
//! ```

use chrono::{DateTime, Days, NaiveDate, Utc};
use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, StateAbbr, StreetName, ZipCode};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::{FirstName, LastName};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};

use crate::error::GenerateError;
use crate::type_tag::TypeTag;

/// Exclusive upper bound of generated `id` values (up to 10 digits).
const ID_UPPER_BOUND: u64 = 10_000_000_000;

/// Produces a fresh substitute value for a type tag.
///
/// Implementations are not expected to be idempotent, and may return the
/// original value by chance: see [`Distinct`](crate::Distinct) for the
/// wrapper that rules that out.
pub trait SubstituteGenerator {
    /// Generate a value of the given category.
    ///
    /// # Errors
    ///
    /// Returns an error if no value can be produced. The error aborts the run.
    fn generate(&mut self, tag: &TypeTag) -> Result<Value, GenerateError>;
}

impl<F> SubstituteGenerator for F
where
    F: FnMut(&TypeTag) -> Result<Value, GenerateError>,
{
    fn generate(&mut self, tag: &TypeTag) -> Result<Value, GenerateError> {
        self(tag)
    }
}

/// Synthetic data generator backed by the `fake` crate.
///
/// Each instance owns its RNG, so independent instances can be used from
/// independent tasks. Use [`seeded`](Self::seeded) for reproducible output.
#[derive(Debug, Clone)]
pub struct FakeGenerator<R = StdRng> {
    rng: R,
}

impl FakeGenerator {
    /// A generator seeded from system entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// A deterministic generator.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for FakeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> FakeGenerator<R> {
    /// A generator over a caller-provided RNG.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    fn text(&mut self, tag: &TypeTag) -> String {
        let rng = &mut self.rng;
        match tag {
            TypeTag::Name => FirstName().fake_with_rng(rng),
            TypeTag::Company => CompanyName().fake_with_rng(rng),
            TypeTag::Email => SafeEmail().fake_with_rng(rng),
            TypeTag::Address => {
                let number: String = BuildingNumber().fake_with_rng(rng);
                let street: String = StreetName().fake_with_rng(rng);
                format!("{number} {street}")
            }
            TypeTag::DateStr | TypeTag::Date => random_date(rng).to_string(),
            TypeTag::ZipCode => ZipCode().fake_with_rng(rng),
            TypeTag::StateCode => StateAbbr().fake_with_rng(rng),
            TypeTag::LastName => LastName().fake_with_rng(rng),
            TypeTag::LastNameFirstName => {
                let last: String = LastName().fake_with_rng(rng);
                let first: String = FirstName().fake_with_rng(rng);
                format!("{last},{first}")
            }
            TypeTag::City => CityName().fake_with_rng(rng),
            TypeTag::Id => rng.gen_range(0..ID_UPPER_BOUND).to_string(),
            TypeTag::Other(_) => Word().fake_with_rng(rng),
        }
    }
}

impl<R: Rng> SubstituteGenerator for FakeGenerator<R> {
    fn generate(&mut self, tag: &TypeTag) -> Result<Value, GenerateError> {
        let text = self.text(tag);
        let value = match tag {
            TypeTag::Date => json!({ "$date": format!("{text}T00:00:00.000Z") }),
            _ => Value::String(text),
        };
        Ok(value)
    }
}

/// A day between the Unix epoch and today.
fn random_date<R: Rng + ?Sized>(rng: &mut R) -> NaiveDate {
    let epoch = DateTime::<Utc>::UNIX_EPOCH.date_naive();
    let today = Utc::now().date_naive();
    let span = u64::try_from((today - epoch).num_days()).unwrap_or_default();
    let offset = rng.gen_range(0..=span);
    epoch.checked_add_days(Days::new(offset)).unwrap_or(epoch)
}
