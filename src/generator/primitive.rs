//! Leaf generators: integers, corpus samplers, strings, constants and producers.

use super::shape::Template;
use super::splicer::StringSplicer;
use super::weighted::WeightedGenerator;
use super::{Generator, Length, Strategy};
use crate::context::Context;
use crate::errors::{GeneratorError, Result};
use crate::item::Item;
use crate::random::RandomSource;
use crate::value::Value;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Largest integer the default integer generator produces (2^53 - 1).
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

// ============================================================================
// INTEGER
// ============================================================================

/// Uniform integers in `[min, max]`.
///
/// Shrinking bisects toward the bound nearest zero: for a value `v` above the
/// target the next generator covers `[target, v]`, and when that would not
/// tighten the range it halves it instead. Every step strictly narrows the
/// range, so the chain ends at `[target, target]`.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegerGenerator {
    min: i64,
    max: i64,
}

impl IntegerGenerator {
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min > max {
            return Err(GeneratorError::invalid_argument(
                "integer",
                format!("min ({min}) must not exceed max ({max})"),
            ));
        }
        Ok(Self { min, max })
    }

    pub(crate) fn new_unchecked(min: i64, max: i64) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// The value shrinking converges on: zero when in range, otherwise the
    /// bound closest to zero.
    pub fn target(&self) -> i64 {
        0.clamp(self.min, self.max)
    }
}

impl Default for IntegerGenerator {
    fn default() -> Self {
        Self {
            min: -MAX_SAFE_INTEGER,
            max: MAX_SAFE_INTEGER,
        }
    }
}

impl Strategy for IntegerGenerator {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn options(&self) -> Value {
        Value::map([("min", Value::Int(self.min)), ("max", Value::Int(self.max))])
    }

    fn generate(&mut self, rng: &mut RandomSource, _ctx: &mut Context) -> Result<Value> {
        Ok(Value::Int(rng.integer(self.min, self.max)))
    }

    fn is_shrinkable(&self) -> bool {
        self.min < self.max
    }

    fn shrink(&self, value: &Value) -> Generator {
        let Some(v) = value.as_int() else {
            return Generator::constant(value.clone());
        };
        let v = v.clamp(self.min, self.max);
        let target = self.target();
        let (min, max) = if v > target {
            if (target, v) == (self.min, self.max) {
                (target, target + (v - target) / 2)
            } else {
                (target, v)
            }
        } else if v < target {
            if (v, target) == (self.min, self.max) {
                (target - (target - v) / 2, target)
            } else {
                (v, target)
            }
        } else {
            (target, target)
        };
        Generator::Integer(Self::new_unchecked(min, max))
    }

    fn is_expandable(&self) -> bool {
        true
    }

    /// Keeps `value` likely while sampling a neighbourhood a quarter of the
    /// range wide on each side, plus the original range.
    fn expand(&self, value: &Value) -> Generator {
        let Some(v) = value.as_int() else {
            return Generator::constant(value.clone());
        };
        let v = v.clamp(self.min, self.max);
        let radius = (self.max.saturating_sub(self.min) / 4).max(1);
        let near = Self::new_unchecked(
            v.saturating_sub(radius).max(self.min),
            v.saturating_add(radius).min(self.max),
        );
        Generator::Weighted(WeightedGenerator::trusted(vec![
            (Item::Literal(Value::Int(v)), 1.5),
            (Item::Generator(Generator::Integer(near)), 1.0),
            (Item::Generator(Generator::Integer(self.clone())), 0.5),
        ]))
    }

    fn lower_bound(&self) -> Option<i64> {
        Some(self.min)
    }

    fn upper_bound(&self) -> Option<i64> {
        Some(self.max)
    }
}

// ============================================================================
// CORPUS SAMPLERS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorpusKind {
    Bool,
    Character,
    Text,
    MagicString,
}

/// Samplers that hand straight through to the random source. None of them
/// shrink or expand.
#[derive(Clone, Debug, PartialEq)]
pub struct CorpusGenerator {
    kind: CorpusKind,
}

impl CorpusGenerator {
    pub fn new(kind: CorpusKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> CorpusKind {
        self.kind
    }
}

impl Strategy for CorpusGenerator {
    fn name(&self) -> &'static str {
        match self.kind {
            CorpusKind::Bool => "bool",
            CorpusKind::Character => "character",
            CorpusKind::Text => "text",
            CorpusKind::MagicString => "magicString",
        }
    }

    fn options(&self) -> Value {
        Value::map::<&str, _>([])
    }

    fn generate(&mut self, rng: &mut RandomSource, _ctx: &mut Context) -> Result<Value> {
        Ok(match self.kind {
            CorpusKind::Bool => Value::Bool(rng.bool()),
            CorpusKind::Character => Value::String(rng.character().to_string()),
            CorpusKind::Text => Value::String(rng.text()),
            CorpusKind::MagicString => Value::String(rng.magic_string()),
        })
    }
}

// ============================================================================
// STRING
// ============================================================================

/// Random strings. Shrinks into a [`StringSplicer`] over the produced value
/// that never goes below the shortest length this generator could produce.
#[derive(Clone, Debug)]
pub struct StringGenerator {
    length: Length,
}

/// Longest random affix the string expansion wraps around a value.
const AFFIX_MAX: i64 = 3;

impl StringGenerator {
    pub fn new(length: Length) -> Self {
        Self { length }
    }
}

impl Strategy for StringGenerator {
    fn name(&self) -> &'static str {
        "string"
    }

    fn options(&self) -> Value {
        Value::map([("length", self.length.describe())])
    }

    fn generate(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        let length = self.length.sample(rng, ctx)?;
        Ok(Value::String(rng.string(length)))
    }

    fn is_shrinkable(&self) -> bool {
        true
    }

    fn shrink(&self, value: &Value) -> Generator {
        match StringSplicer::from_value(value, self.length.lower_bound()) {
            Ok(splicer) => Generator::StringSplicer(splicer),
            Err(_) => Generator::constant(value.clone()),
        }
    }

    fn is_expandable(&self) -> bool {
        true
    }

    /// Mostly `value` itself, sometimes `value` wrapped in short random
    /// affixes, occasionally a fresh string.
    fn expand(&self, value: &Value) -> Generator {
        let Some(text) = value.as_str().map(str::to_string) else {
            return Generator::constant(value.clone());
        };
        let affix = || {
            Template::Generator(Generator::string(Generator::Integer(
                IntegerGenerator::new_unchecked(0, AFFIX_MAX),
            )))
        };
        let wrapped = Generator::shape(Template::List(vec![affix(), affix()])).map(move |parts| {
            let parts = parts.as_list().unwrap_or_default();
            let prefix = parts.first().and_then(Value::as_str).unwrap_or_default();
            let suffix = parts.get(1).and_then(Value::as_str).unwrap_or_default();
            Value::String(format!("{prefix}{text}{suffix}"))
        });
        Generator::Weighted(WeightedGenerator::trusted(vec![
            (Item::Literal(value.clone()), 2.0),
            (Item::Generator(wrapped), 1.0),
            (Item::Generator(Generator::String(self.clone())), 0.5),
        ]))
    }
}

// ============================================================================
// CONSTANT
// ============================================================================

/// Always the same value. Never shrinks or expands; this is the terminal of
/// every best-effort fallback.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantGenerator {
    value: Value,
}

impl ConstantGenerator {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Strategy for ConstantGenerator {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn options(&self) -> Value {
        Value::map([("value", self.value.clone())])
    }

    fn generate(&mut self, _rng: &mut RandomSource, _ctx: &mut Context) -> Result<Value> {
        Ok(self.value.clone())
    }

    fn lower_bound(&self) -> Option<i64> {
        self.value.as_int()
    }

    fn upper_bound(&self) -> Option<i64> {
        self.value.as_int()
    }
}

// ============================================================================
// PRODUCER
// ============================================================================

pub type ProducerFn = Rc<dyn Fn(&Value) -> Value>;

static NEXT_PRODUCER_ID: AtomicU64 = AtomicU64::new(0);

/// Deterministic successor chain: `initial`, `step(initial)`, ...
///
/// The running value is stored in the context under a per-producer key.
/// Copies of a producer share that key, which is harmless because shrink and
/// expand always start from a fresh context.
#[derive(Clone)]
pub struct ProducerGenerator {
    id: u64,
    initial: Value,
    step: ProducerFn,
}

impl ProducerGenerator {
    pub fn new(initial: Value, step: ProducerFn) -> Self {
        Self {
            id: NEXT_PRODUCER_ID.fetch_add(1, Ordering::Relaxed),
            initial,
            step,
        }
    }

    fn context_key(&self) -> String {
        format!("producer#{}", self.id)
    }
}

impl std::fmt::Debug for ProducerGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProducerGenerator")
            .field("id", &self.id)
            .field("initial", &self.initial)
            .finish()
    }
}

impl Strategy for ProducerGenerator {
    fn name(&self) -> &'static str {
        "producer"
    }

    fn options(&self) -> Value {
        Value::map([("initial", self.initial.clone())])
    }

    fn generate(&mut self, _rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        let key = self.context_key();
        let next = match ctx.get(&key) {
            Some(last) => (self.step)(last),
            None => self.initial.clone(),
        };
        ctx.set(key, next.clone());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(generator: &mut Generator, rng: &mut RandomSource, n: usize) -> Vec<Value> {
        let mut ctx = Context::new();
        (0..n)
            .map(|_| generator.generate(rng, &mut ctx).expect("generation succeeds"))
            .collect()
    }

    #[test]
    fn test_integer_rejects_inverted_bounds() {
        assert!(IntegerGenerator::new(5, 1).is_err());
    }

    #[test]
    fn test_integer_target() {
        assert_eq!(IntegerGenerator::new_unchecked(-10, 10).target(), 0);
        assert_eq!(IntegerGenerator::new_unchecked(500, 1000).target(), 500);
        assert_eq!(IntegerGenerator::new_unchecked(-30, -4).target(), -4);
    }

    #[test]
    fn test_integer_shrink_narrows_to_value() {
        let generator = Generator::integer(0, 100).expect("valid bounds");
        let shrunk = generator.shrink(&Value::Int(37)).expect("shrinkable");
        assert_eq!(
            shrunk.options(),
            Value::map([("min", Value::Int(0)), ("max", Value::Int(37))])
        );
    }

    #[test]
    fn test_integer_shrink_halves_when_value_is_far_bound() {
        let generator = Generator::integer(0, 10).expect("valid bounds");
        let shrunk = generator.shrink(&Value::Int(10)).expect("shrinkable");
        assert_eq!(shrunk.upper_bound(), Some(5));
        let negative = Generator::integer(-9, 0).expect("valid bounds");
        let shrunk = negative.shrink(&Value::Int(-9)).expect("shrinkable");
        assert_eq!(shrunk.lower_bound(), Some(-4));
    }

    #[test]
    fn test_producer_counts_through_context() {
        let mut rng = RandomSource::new(1);
        let mut producer = Generator::producer(0, |last| Value::Int(last.as_int().unwrap_or(0) + 1));
        assert_eq!(
            run(&mut producer, &mut rng, 4),
            vec![Value::Int(0), Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn test_fixed_length_string() {
        let mut rng = RandomSource::new(9);
        let mut generator = Generator::string(4_usize);
        for value in run(&mut generator, &mut rng, 10) {
            assert_eq!(value.as_str().map(str::len), Some(4));
        }
    }

    #[test]
    fn test_string_shrinks_into_splicer_with_length_minimum() {
        let generator = Generator::string(Generator::natural(10).expect("valid bounds"));
        let shrunk = generator.shrink(&Value::from("foobarbaz")).expect("shrinkable");
        assert_eq!(shrunk.name(), "stringSplicer");
        assert_eq!(shrunk.options().get("min"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_corpus_bool() {
        let mut rng = RandomSource::new(5);
        let mut generator = Generator::bool();
        assert!(run(&mut generator, &mut rng, 10)
            .iter()
            .all(|v| v.as_bool().is_some()));
        assert!(!generator.is_shrinkable());
        assert!(!generator.is_expandable());
    }
}
