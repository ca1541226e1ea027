//! Deduplicated repeated sampling.

use super::splicer::ArraySplicer;
use super::{Generator, Length, Strategy};
use crate::context::Context;
use crate::errors::{GeneratorError, Result};
use crate::random::RandomSource;
use crate::value::Value;
use std::rc::Rc;
use tracing::warn;

/// Draws allowed per requested item before giving up.
pub const ATTEMPTS_PER_ITEM: usize = 50;

/// Lower bound on the draw budget, so small counts still get a fair chance.
pub const MIN_ATTEMPTS: usize = 100;

/// Returns true when two values count as the same item.
pub type Comparator = Rc<dyn Fn(&Value, &Value) -> bool>;

#[derive(Clone, Default)]
pub struct UniqueOptions {
    /// Structural equality when `None`.
    pub comparator: Option<Comparator>,
}

impl UniqueOptions {
    pub fn with_comparator(comparator: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        Self {
            comparator: Some(Rc::new(comparator)),
        }
    }
}

impl std::fmt::Debug for UniqueOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniqueOptions")
            .field("comparator", &self.comparator.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Lists of `count` pairwise-distinct draws from a base generator.
///
/// A draw is kept only when the comparator rejects it against every kept
/// item. The number of draws per call is capped at
/// `max(count * ATTEMPTS_PER_ITEM, MIN_ATTEMPTS)`; hitting the cap fails with
/// [`GeneratorError::ExhaustedDomain`].
#[derive(Clone, Debug)]
pub struct UniqueGenerator {
    base: Box<Generator>,
    count: Length,
    options: UniqueOptions,
}

impl UniqueGenerator {
    pub fn new(base: Generator, count: Length, options: UniqueOptions) -> Self {
        Self {
            base: Box::new(base),
            count,
            options,
        }
    }

    fn same(&self, a: &Value, b: &Value) -> bool {
        match &self.options.comparator {
            Some(comparator) => comparator(a, b),
            None => a == b,
        }
    }
}

impl Strategy for UniqueGenerator {
    fn name(&self) -> &'static str {
        "unique"
    }

    fn options(&self) -> Value {
        Value::map([
            ("generator", self.base.describe()),
            ("count", self.count.describe()),
        ])
    }

    fn generate(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        let count = self.count.sample(rng, ctx)?;
        let budget = count.saturating_mul(ATTEMPTS_PER_ITEM).max(MIN_ATTEMPTS);
        let mut items: Vec<Value> = Vec::with_capacity(count);
        let mut attempts = 0;
        while items.len() < count {
            if attempts == budget {
                warn!(
                    generator = self.base.name(),
                    requested = count,
                    found = items.len(),
                    attempts,
                    "unique generator ran out of attempts"
                );
                return Err(GeneratorError::ExhaustedDomain {
                    requested: count,
                    found: items.len(),
                    attempts,
                });
            }
            attempts += 1;
            let candidate = self.base.generate(rng, ctx)?;
            if !items.iter().any(|kept| self.same(kept, &candidate)) {
                items.push(candidate);
            }
        }
        Ok(Value::List(items))
    }

    fn is_shrinkable(&self) -> bool {
        true
    }

    /// Subsets of `value`: removing items never introduces duplicates.
    fn shrink(&self, value: &Value) -> Generator {
        match ArraySplicer::from_value(value, 0) {
            Ok(splicer) => Generator::ArraySplicer(splicer),
            Err(_) => Generator::constant(value.clone()),
        }
    }
}
