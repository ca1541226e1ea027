//! # Generator Iterator
//!
//! [`GeneratorIterator`] drives one generator with one random source and one
//! context. It is the production and mutation loop a property test uses:
//! `next`/`take` produce values, `shrink`/`expand` rewrite the generator
//! around a value and start a fresh context.
//!
//! ## Example
//!
//! ```rust
//! use shrinkgen::prelude::*;
//!
//! let options = IteratorOptions { seed: Some(7), skip_seed_cache: true };
//! let mut it = GeneratorIterator::new(Generator::integer(-10, 10)?, options);
//! let mut value = it.next()?;
//! while it.is_shrinkable() {
//!     it.shrink(&value);
//!     value = it.next()?;
//! }
//! assert_eq!(value, Value::Int(0));
//! # Ok::<(), shrinkgen::errors::GeneratorError>(())
//! ```

use crate::context::Context;
use crate::errors::{GeneratorError, Result};
use crate::generator::Generator;
use crate::random::{RandomSource, SharedRandomSource};
use crate::seed_cache::SeedCache;
use crate::value::Value;
use rand::Rng;
use serde::Deserialize;
use tracing::debug;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Environment variable holding the iterator seed (`random` picks one).
pub const SEED_ENV: &str = "SHRINKGEN_SEED";

/// Environment variable that, when `1` or `true`, bypasses the seed cache.
pub const SKIP_SEED_CACHE_ENV: &str = "SHRINKGEN_SKIP_SEED_CACHE";

fn default_seed() -> Option<u64> {
    Some(DEFAULT_SEED)
}

// ============================================================================
// OPTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IteratorOptions {
    /// `None` draws a seed from entropy.
    #[serde(default = "default_seed")]
    pub seed: Option<u64>,
    /// Use a private random source instead of the cached one for the seed.
    #[serde(default)]
    pub skip_seed_cache: bool,
}

impl Default for IteratorOptions {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            skip_seed_cache: false,
        }
    }
}

impl IteratorOptions {
    /// Private source for `seed`.
    pub fn isolated(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            skip_seed_cache: true,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| GeneratorError::config(format!("invalid iterator options: {e}")))
    }

    /// Reads [`SEED_ENV`] and [`SKIP_SEED_CACHE_ENV`], falling back to the
    /// defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();
        if let Ok(raw) = std::env::var(SEED_ENV) {
            options.seed = parse_seed(&raw)?;
        }
        if let Ok(raw) = std::env::var(SKIP_SEED_CACHE_ENV) {
            options.skip_seed_cache = parse_flag(&raw)?;
        }
        Ok(options)
    }
}

fn parse_seed(raw: &str) -> Result<Option<u64>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("random") {
        return Ok(None);
    }
    raw.parse::<u64>()
        .map(Some)
        .map_err(|e| GeneratorError::config(format!("{SEED_ENV}={raw:?} is not a seed: {e}")))
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "" | "0" | "false" | "no" => Ok(false),
        other => Err(GeneratorError::config(format!(
            "{SKIP_SEED_CACHE_ENV}={other:?} is not a boolean"
        ))),
    }
}

// ============================================================================
// ITERATOR
// ============================================================================

#[derive(Debug)]
pub struct GeneratorIterator {
    generator: Generator,
    rng: SharedRandomSource,
    ctx: Context,
    seed: u64,
    shrinkable: bool,
    expandable: bool,
}

impl GeneratorIterator {
    /// Builds an iterator over the thread's default [`SeedCache`].
    pub fn new(generator: Generator, options: IteratorOptions) -> Self {
        Self::with_cache(generator, options, &SeedCache::global())
    }

    pub fn with_cache(generator: Generator, options: IteratorOptions, cache: &SeedCache) -> Self {
        let seed = options
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen_range(0..u64::from(u32::MAX)));
        let rng = if options.skip_seed_cache {
            RandomSource::new(seed).shared()
        } else {
            cache.get(seed)
        };
        let shrinkable = generator.is_shrinkable();
        let expandable = generator.is_expandable();
        Self {
            generator,
            rng,
            ctx: Context::new(),
            seed,
            shrinkable,
            expandable,
        }
    }

    /// Produces the next value. The context persists between calls, so
    /// stateful generators continue where they left off.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Value> {
        let mut rng = self.rng.borrow_mut();
        self.generator.generate(&mut rng, &mut self.ctx)
    }

    /// The next `n` values in order. `n` must be positive.
    #[tracing::instrument(level = "debug", skip(self), fields(generator = self.generator.name()))]
    pub fn take(&mut self, n: usize) -> Result<Vec<Value>> {
        if n == 0 {
            return Err(GeneratorError::invalid_argument(
                "take",
                "the number of items must be a positive number",
            ));
        }
        (0..n).map(|_| self.next()).collect()
    }

    /// Replaces the generator with its shrink around `value` and resets the
    /// context. Returns false, changing nothing, when the generator cannot
    /// shrink.
    pub fn shrink(&mut self, value: &Value) -> bool {
        let Some(shrunk) = self.generator.shrink(value) else {
            return false;
        };
        self.replace(shrunk, "shrink");
        true
    }

    /// Replaces the generator with its expansion around `value` and resets
    /// the context. The next value produced is `value` itself.
    pub fn expand(&mut self, value: &Value) -> bool {
        let Some(expanded) = self.generator.expand(value) else {
            return false;
        };
        self.replace(expanded, "expand");
        true
    }

    fn replace(&mut self, generator: Generator, operation: &'static str) {
        debug!(
            operation,
            from = self.generator.name(),
            to = generator.name(),
            shrinkable = generator.is_shrinkable(),
            expandable = generator.is_expandable(),
            "generator replaced"
        );
        self.shrinkable = generator.is_shrinkable();
        self.expandable = generator.is_expandable();
        self.generator = generator;
        self.ctx = Context::new();
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_shrinkable(&self) -> bool {
        self.shrinkable
    }

    pub fn is_expandable(&self) -> bool {
        self.expandable
    }
}
