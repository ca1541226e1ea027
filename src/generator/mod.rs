//! # Generators
//!
//! [`Generator`] is a closed sum type over every generator variant. Each
//! variant is a struct implementing the crate-private [`Strategy`] trait, and
//! the enum dispatches to it. Capabilities are explicit:
//!
//! - `generate` always exists.
//! - `shrink` returns `None` when [`Generator::is_shrinkable`] is false, which
//!   is how a shrink chain signals it reached its minimum.
//! - `expand` returns `None` when [`Generator::is_expandable`] is false.
//! - `map` exists on every generator and forwards shrink/expand to the
//!   pre-map value.
//!
//! Shrink and expand never mutate `self`. They build a fresh generator tree,
//! so per-instance bookkeeping (the last weighted selection, the last sequence
//! run) is never shared between a generator and its descendants.
//!
//! ## Module Structure
//!
//! - **`primitive`**: integers, booleans, characters, text, strings, constants, producers
//! - **`splicer`**: region-deletion shrinkers over strings and arrays
//! - **`array`**: arrays of generated items, shuffles and picks
//! - **`weighted`**: weighted and uniform choice with delegated shrink/expand
//! - **`shape`**: structural templates
//! - **`sequence`**: stateful step chains
//! - **`unique`**: deduplicated repeated sampling
//! - **`mapped`**: `map` and expand priming

pub mod array;
pub mod mapped;
pub mod primitive;
pub mod sequence;
pub mod shape;
pub mod splicer;
pub mod unique;
pub mod weighted;

use crate::context::Context;
use crate::errors::Result;
use crate::item::Item;
use crate::random::RandomSource;
use crate::value::Value;
use std::rc::Rc;

use array::{ArrayGenerator, PicksetGenerator, ShuffleGenerator};
use mapped::{MapFn, MappedGenerator, PrimedGenerator};
use primitive::{
    ConstantGenerator, CorpusGenerator, CorpusKind, IntegerGenerator, ProducerGenerator,
    StringGenerator,
};
use sequence::{SequenceGenerator, SequenceOptions};
use shape::{ShapeGenerator, Template};
use splicer::{ArraySplicer, StringSplicer};
use unique::{UniqueGenerator, UniqueOptions};
use weighted::{PickoneGenerator, WeightedGenerator};

// ============================================================================
// STRATEGY TRAIT
// ============================================================================

/// The behaviour every generator variant provides.
///
/// The default shrink and expand fall back to a constant generator; they are
/// only reachable through [`Generator`] when the matching capability flag is
/// set.
pub(crate) trait Strategy {
    fn name(&self) -> &'static str;

    fn options(&self) -> Value;

    fn generate(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value>;

    fn is_shrinkable(&self) -> bool {
        false
    }

    fn shrink(&self, value: &Value) -> Generator {
        Generator::constant(value.clone())
    }

    fn is_expandable(&self) -> bool {
        false
    }

    /// The expanded neighbourhood of `value`, without the first-call replay
    /// that [`Generator::expand`] adds.
    fn expand(&self, value: &Value) -> Generator {
        Generator::constant(value.clone())
    }

    fn lower_bound(&self) -> Option<i64> {
        None
    }

    fn upper_bound(&self) -> Option<i64> {
        None
    }
}

// ============================================================================
// LENGTH OPTION
// ============================================================================

/// A fixed length or a generator producing lengths.
///
/// Used for string and array lengths, unique counts and sequence lengths.
#[derive(Clone, Debug)]
pub enum Length {
    Fixed(usize),
    Generated(Box<Generator>),
}

impl Length {
    pub fn sample(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<usize> {
        match self {
            Length::Fixed(n) => Ok(*n),
            Length::Generated(generator) => {
                let value = generator.generate(rng, ctx)?;
                Ok(value
                    .as_int()
                    .map(|n| usize::try_from(n).unwrap_or(0))
                    .unwrap_or(0))
            }
        }
    }

    /// The smallest length this option can produce, as far as it can tell.
    pub fn lower_bound(&self) -> usize {
        match self {
            Length::Fixed(n) => *n,
            Length::Generated(generator) => generator
                .lower_bound()
                .map(|n| usize::try_from(n).unwrap_or(0))
                .unwrap_or(0),
        }
    }

    pub fn upper_bound(&self) -> Option<usize> {
        match self {
            Length::Fixed(n) => Some(*n),
            Length::Generated(generator) => generator
                .upper_bound()
                .map(|n| usize::try_from(n).unwrap_or(0)),
        }
    }

    pub fn describe(&self) -> Value {
        match self {
            Length::Fixed(n) => Value::from(*n),
            Length::Generated(generator) => generator.describe(),
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Length::Generated(Box::new(Generator::Integer(IntegerGenerator::new_unchecked(
            0, 20,
        ))))
    }
}

impl From<usize> for Length {
    fn from(n: usize) -> Self {
        Length::Fixed(n)
    }
}

impl From<Generator> for Length {
    fn from(generator: Generator) -> Self {
        Length::Generated(Box::new(generator))
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

#[derive(Clone, Debug)]
pub enum Generator {
    Integer(IntegerGenerator),
    Corpus(CorpusGenerator),
    String(StringGenerator),
    StringSplicer(StringSplicer),
    Array(ArrayGenerator),
    ArraySplicer(ArraySplicer),
    Shuffle(ShuffleGenerator),
    Pickset(PicksetGenerator),
    Weighted(WeightedGenerator),
    Pickone(PickoneGenerator),
    Shape(ShapeGenerator),
    Sequence(SequenceGenerator),
    Unique(UniqueGenerator),
    Constant(ConstantGenerator),
    Producer(ProducerGenerator),
    Mapped(MappedGenerator),
    Primed(PrimedGenerator),
}

macro_rules! dispatch {
    ($self:expr, $g:ident => $body:expr) => {
        match $self {
            Generator::Integer($g) => $body,
            Generator::Corpus($g) => $body,
            Generator::String($g) => $body,
            Generator::StringSplicer($g) => $body,
            Generator::Array($g) => $body,
            Generator::ArraySplicer($g) => $body,
            Generator::Shuffle($g) => $body,
            Generator::Pickset($g) => $body,
            Generator::Weighted($g) => $body,
            Generator::Pickone($g) => $body,
            Generator::Shape($g) => $body,
            Generator::Sequence($g) => $body,
            Generator::Unique($g) => $body,
            Generator::Constant($g) => $body,
            Generator::Producer($g) => $body,
            Generator::Mapped($g) => $body,
            Generator::Primed($g) => $body,
        }
    };
}

impl Generator {
    // ------------------------------------------------------------------------
    // Core contract
    // ------------------------------------------------------------------------

    pub fn name(&self) -> &'static str {
        dispatch!(self, g => g.name())
    }

    /// The structural options the generator was built with.
    pub fn options(&self) -> Value {
        dispatch!(self, g => g.options())
    }

    /// `{generator: <name>, options: <options>}`, for asserting on the shape
    /// of a generator tree without generating anything.
    pub fn describe(&self) -> Value {
        Value::map([
            ("generator", Value::from(self.name())),
            ("options", self.options()),
        ])
    }

    pub fn generate(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        dispatch!(self, g => g.generate(rng, ctx))
    }

    pub fn is_shrinkable(&self) -> bool {
        dispatch!(self, g => g.is_shrinkable())
    }

    pub fn is_expandable(&self) -> bool {
        dispatch!(self, g => g.is_expandable())
    }

    /// A generator biased toward simpler values than `value`, or `None` when
    /// this generator is already minimal.
    ///
    /// `value` should come from this generator (or its shrink lineage); any
    /// other value degrades to a constant generator reproducing it.
    pub fn shrink(&self, value: &Value) -> Option<Generator> {
        self.is_shrinkable().then(|| self.shrink_unchecked(value))
    }

    /// A generator whose first output is `value` and whose later outputs
    /// explore its neighbourhood, or `None` when this generator cannot expand.
    pub fn expand(&self, value: &Value) -> Option<Generator> {
        self.is_expandable()
            .then(|| Generator::primed(value.clone(), self.expand_unprimed(value), self.clone()))
    }

    /// Wraps the output in `f`. Shrinking and expanding the mapped generator
    /// operate on the pre-map value and reapply `f`.
    pub fn map(self, f: impl Fn(Value) -> Value + 'static) -> Generator {
        self.map_with(Rc::new(f))
    }

    pub(crate) fn map_with(self, f: MapFn) -> Generator {
        Generator::Mapped(MappedGenerator::new(self, f))
    }

    pub(crate) fn shrink_unchecked(&self, value: &Value) -> Generator {
        dispatch!(self, g => g.shrink(value))
    }

    pub(crate) fn expand_unprimed(&self, value: &Value) -> Generator {
        dispatch!(self, g => g.expand(value))
    }

    /// Shrinks if possible, otherwise returns a copy of `self`.
    pub(crate) fn shrink_or_keep(&self, value: &Value) -> Generator {
        if self.is_shrinkable() {
            self.shrink_unchecked(value)
        } else {
            self.clone()
        }
    }

    /// Expands (unprimed) if possible, otherwise returns a copy of `self`.
    pub(crate) fn expand_or_keep(&self, value: &Value) -> Generator {
        if self.is_expandable() {
            self.expand_unprimed(value)
        } else {
            self.clone()
        }
    }

    pub fn lower_bound(&self) -> Option<i64> {
        dispatch!(self, g => g.lower_bound())
    }

    pub fn upper_bound(&self) -> Option<i64> {
        dispatch!(self, g => g.upper_bound())
    }

    // ------------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------------

    /// Uniform integers in `[min, max]`.
    pub fn integer(min: i64, max: i64) -> Result<Generator> {
        IntegerGenerator::new(min, max).map(Generator::Integer)
    }

    /// Uniform integers in `[0, max]`.
    pub fn natural(max: i64) -> Result<Generator> {
        Generator::integer(0, max)
    }

    /// Integers over the full safe range.
    pub fn any_integer() -> Generator {
        Generator::Integer(IntegerGenerator::default())
    }

    pub fn bool() -> Generator {
        Generator::Corpus(CorpusGenerator::new(CorpusKind::Bool))
    }

    pub fn character() -> Generator {
        Generator::Corpus(CorpusGenerator::new(CorpusKind::Character))
    }

    /// Corpus text, mixing in magic values when the source has any.
    pub fn text() -> Generator {
        Generator::Corpus(CorpusGenerator::new(CorpusKind::Text))
    }

    pub fn magic_string() -> Generator {
        Generator::Corpus(CorpusGenerator::new(CorpusKind::MagicString))
    }

    /// Random strings whose length comes from `length`.
    pub fn string(length: impl Into<Length>) -> Generator {
        Generator::String(StringGenerator::new(length.into()))
    }

    /// Candidates made by deleting one region from `base`, keeping at least
    /// `min` characters. Fails unless `base` is a string.
    pub fn string_splicer(base: impl Into<Value>, min: usize) -> Result<Generator> {
        StringSplicer::from_value(&base.into(), min).map(Generator::StringSplicer)
    }

    /// Candidates made by deleting one region from the list `base`, keeping at
    /// least `min` items. Fails unless `base` is a list.
    pub fn array_splicer(base: impl Into<Value>, min: usize) -> Result<Generator> {
        ArraySplicer::from_value(&base.into(), min).map(Generator::ArraySplicer)
    }

    /// Like [`Generator::array_splicer`] over items that may be generators.
    pub fn array_splicer_of(items: Vec<Item>, min: usize) -> Generator {
        Generator::ArraySplicer(ArraySplicer::new(items, min))
    }

    pub fn array(item: Generator, length: impl Into<Length>) -> Generator {
        Generator::Array(ArrayGenerator::new(item, length.into()))
    }

    pub fn shuffle(items: Vec<Item>) -> Generator {
        Generator::Shuffle(ShuffleGenerator::new(items))
    }

    /// `count` items from distinct positions of `items`, generator items
    /// resolved. Not expandable.
    pub fn pick(items: Vec<Item>, count: impl Into<Length>) -> Result<Generator> {
        PicksetGenerator::new(items, count.into(), false).map(Generator::Pickset)
    }

    /// Like [`Generator::pick`], and expands into arrays that favour the
    /// elements of the expanded value.
    pub fn pickset(items: Vec<Item>, count: impl Into<Length>) -> Result<Generator> {
        PicksetGenerator::new(items, count.into(), true).map(Generator::Pickset)
    }

    /// Chooses among `options` with probability proportional to the weights.
    pub fn weighted(options: Vec<(Item, f64)>) -> Result<Generator> {
        WeightedGenerator::new(options).map(Generator::Weighted)
    }

    pub fn pickone(items: Vec<Item>) -> Result<Generator> {
        PickoneGenerator::new(items).map(Generator::Pickone)
    }

    /// Numbers, text, nil and booleans in one generator.
    pub fn primitive() -> Generator {
        weighted::primitive()
    }

    pub fn shape(template: impl Into<Template>) -> Generator {
        Generator::Shape(ShapeGenerator::new(template.into()))
    }

    pub fn sequence(
        step: impl Fn(&mut Context, Option<&Value>) -> Item + 'static,
        options: SequenceOptions,
    ) -> Generator {
        Generator::Sequence(SequenceGenerator::new(Rc::new(step), options))
    }

    pub fn unique(base: Generator, count: impl Into<Length>, options: UniqueOptions) -> Generator {
        Generator::Unique(UniqueGenerator::new(base, count.into(), options))
    }

    pub fn constant(value: impl Into<Value>) -> Generator {
        Generator::Constant(ConstantGenerator::new(value.into()))
    }

    /// Always returns `value`. The same generator as [`Generator::constant`];
    /// a [`Value`] never holds a generator, so there is nothing to unwrap.
    pub fn identity(value: impl Into<Value>) -> Generator {
        Generator::constant(value)
    }

    /// Produces `initial`, then `step(last)` on every later call. The running
    /// value lives in the context, so a fresh context restarts the producer.
    pub fn producer(initial: impl Into<Value>, step: impl Fn(&Value) -> Value + 'static) -> Generator {
        Generator::Producer(ProducerGenerator::new(initial.into(), Rc::new(step)))
    }

    pub(crate) fn primed(value: Value, inner: Generator, origin: Generator) -> Generator {
        Generator::Primed(PrimedGenerator::new(value, inner, origin))
    }
}

impl std::fmt::Display for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_reports_name_and_options() {
        let generator = Generator::integer(0, 10).expect("valid bounds");
        let described = generator.describe();
        assert_eq!(described.get("generator"), Some(&Value::from("integer")));
        assert_eq!(
            described.get("options"),
            Some(&Value::map([("min", Value::Int(0)), ("max", Value::Int(10))]))
        );
        assert_eq!(generator.to_string(), "integer");
    }

    #[test]
    fn test_constant_has_no_capabilities() {
        let generator = Generator::constant(42);
        assert!(generator.shrink(&Value::Int(42)).is_none());
        assert!(generator.expand(&Value::Int(42)).is_none());
    }

    #[test]
    fn test_length_bounds() {
        let length = Length::from(Generator::integer(2, 9).expect("valid bounds"));
        assert_eq!(length.lower_bound(), 2);
        assert_eq!(length.upper_bound(), Some(9));
        assert_eq!(Length::from(4).lower_bound(), 4);
    }

    #[test]
    fn test_identity_always_returns_its_value() {
        let mut rng = RandomSource::new(42);
        let mut ctx = Context::new();
        let value = Value::map([("foo", Value::from("bar"))]);
        let mut generator = Generator::identity(value.clone());
        for _ in 0..5 {
            assert_eq!(generator.generate(&mut rng, &mut ctx), Ok(value.clone()));
        }
        assert!(!generator.is_shrinkable());
    }
}
