//! # Shrinkgen
//!
//! Composable data generators for property-based testing. A generator
//! produces values from a seeded [`random::RandomSource`], and most
//! generators can also *shrink* a value toward a minimal counterexample or
//! *expand* it into nearby variants.
//!
//! ## Module Structure
//!
//! - **`errors`**: the crate's error type
//! - **`value`**: generated values
//! - **`random`**: seeded primitive sampling and magic values
//! - **`seed_cache`**: seed to random-source cache
//! - **`context`**: per-run scratch state
//! - **`item`**: literal-or-generator entries and `unwrap`
//! - **`generator`**: every generator variant
//! - **`iterator`**: the production and mutation driver

pub mod context;
pub mod errors;
pub mod generator;
pub mod item;
pub mod iterator;
pub mod random;
pub mod seed_cache;
pub mod value;

pub use crate::errors::{GeneratorError, Result};

/// The types most callers need.
pub mod prelude {
    pub use crate::context::Context;
    pub use crate::errors::{ErrorKind, GeneratorError, Result};
    pub use crate::generator::sequence::SequenceOptions;
    pub use crate::generator::shape::Template;
    pub use crate::generator::unique::UniqueOptions;
    pub use crate::generator::{Generator, Length};
    pub use crate::item::{unwrap, Item};
    pub use crate::iterator::{GeneratorIterator, IteratorOptions};
    pub use crate::random::{MagicValues, RandomSource};
    pub use crate::seed_cache::SeedCache;
    pub use crate::value::Value;
}
