//! Literal-or-generator values.
//!
//! Weighted options, pickone/shuffle entries, array-splicer slots and sequence
//! steps all accept either a plain value or a generator. [`Item`] makes that
//! choice explicit and [`unwrap`] resolves it.

use crate::context::Context;
use crate::errors::Result;
use crate::generator::Generator;
use crate::random::RandomSource;
use crate::value::Value;

#[derive(Clone, Debug)]
pub enum Item {
    Literal(Value),
    Generator(Generator),
}

impl Item {
    pub fn literal(value: impl Into<Value>) -> Self {
        Item::Literal(value.into())
    }

    /// Produces the concrete value: a literal is cloned, a generator is run
    /// against the given source and context.
    pub fn resolve(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        match self {
            Item::Literal(value) => Ok(value.clone()),
            Item::Generator(generator) => generator.generate(rng, ctx),
        }
    }

    pub fn as_generator(&self) -> Option<&Generator> {
        match self {
            Item::Generator(generator) => Some(generator),
            Item::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Item::Literal(value) => Some(value),
            Item::Generator(_) => None,
        }
    }

    /// True for a generator entry that can still shrink.
    pub fn is_shrinkable(&self) -> bool {
        self.as_generator().is_some_and(Generator::is_shrinkable)
    }

    /// Literals render as themselves, generators as their description.
    pub fn describe(&self) -> Value {
        match self {
            Item::Literal(value) => value.clone(),
            Item::Generator(generator) => generator.describe(),
        }
    }
}

/// Resolves a literal-or-generator into a concrete value.
pub fn unwrap(item: &mut Item, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
    item.resolve(rng, ctx)
}

impl From<Value> for Item {
    fn from(value: Value) -> Self {
        Item::Literal(value)
    }
}

impl From<Generator> for Item {
    fn from(generator: Generator) -> Self {
        Item::Generator(generator)
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::Literal(Value::from(s))
    }
}

impl From<i64> for Item {
    fn from(n: i64) -> Self {
        Item::Literal(Value::Int(n))
    }
}

impl From<i32> for Item {
    fn from(n: i32) -> Self {
        Item::Literal(Value::Int(i64::from(n)))
    }
}

impl From<bool> for Item {
    fn from(b: bool) -> Self {
        Item::Literal(Value::Bool(b))
    }
}
