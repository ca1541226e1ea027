//! Arrays of generated items, and shuffles.

use super::primitive::IntegerGenerator;
use super::splicer::ArraySplicer;
use super::weighted::{PickoneGenerator, WeightedGenerator};
use super::{Generator, Length, Strategy};
use crate::context::Context;
use crate::errors::{GeneratorError, Result};
use crate::item::Item;
use crate::random::RandomSource;
use crate::value::Value;

// ============================================================================
// ARRAY
// ============================================================================

/// Lists of `length` values drawn from one item generator.
#[derive(Clone, Debug)]
pub struct ArrayGenerator {
    item: Box<Generator>,
    length: Length,
}

impl ArrayGenerator {
    pub fn new(item: Generator, length: Length) -> Self {
        Self {
            item: Box::new(item),
            length,
        }
    }
}

impl Strategy for ArrayGenerator {
    fn name(&self) -> &'static str {
        "array"
    }

    fn options(&self) -> Value {
        Value::map([
            ("item", self.item.describe()),
            ("length", self.length.describe()),
        ])
    }

    fn generate(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        let length = self.length.sample(rng, ctx)?;
        let mut items = Vec::with_capacity(length);
        for _ in 0..length {
            items.push(self.item.generate(rng, ctx)?);
        }
        Ok(Value::List(items))
    }

    fn is_shrinkable(&self) -> bool {
        true
    }

    /// An [`ArraySplicer`] whose slots are the item generator shrunk against
    /// each element, never shorter than the length option allows.
    fn shrink(&self, value: &Value) -> Generator {
        let Some(elements) = value.as_list() else {
            return Generator::constant(value.clone());
        };
        let items = elements
            .iter()
            .map(|element| {
                if self.item.is_shrinkable() {
                    Item::Generator(self.item.shrink_unchecked(element))
                } else {
                    Item::Literal(element.clone())
                }
            })
            .collect();
        Generator::ArraySplicer(ArraySplicer::new(items, self.length.lower_bound()))
    }

    fn is_expandable(&self) -> bool {
        true
    }

    /// Arrays around the given length whose items favour the given elements.
    fn expand(&self, value: &Value) -> Generator {
        let Some(elements) = value.as_list().filter(|e| !e.is_empty()) else {
            return Generator::Array(self.clone());
        };
        let len = elements.len();
        let known = PickoneGenerator::trusted(elements.iter().cloned().map(Item::Literal).collect());
        let item = WeightedGenerator::trusted(vec![
            (Item::Generator(Generator::Pickone(known)), 2.0),
            (Item::Generator((*self.item).clone()), 1.0),
        ]);
        let min = self.length.lower_bound().min(len);
        let max = self.length.upper_bound().unwrap_or(len).max(len + 1);
        let length = IntegerGenerator::new_unchecked(
            i64::try_from(min).unwrap_or(0),
            i64::try_from(max).unwrap_or(i64::MAX),
        );
        Generator::Array(ArrayGenerator::new(
            Generator::Weighted(item),
            Length::from(Generator::Integer(length)),
        ))
    }
}

// ============================================================================
// SHUFFLE
// ============================================================================

/// Permutations of a fixed list of items; generator items are resolved first.
#[derive(Clone, Debug)]
pub struct ShuffleGenerator {
    items: Vec<Item>,
}

impl ShuffleGenerator {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

impl Strategy for ShuffleGenerator {
    fn name(&self) -> &'static str {
        "shuffle"
    }

    fn options(&self) -> Value {
        Value::map([(
            "items",
            Value::List(self.items.iter().map(Item::describe).collect()),
        )])
    }

    fn generate(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        let mut values = Vec::with_capacity(self.items.len());
        for item in &mut self.items {
            values.push(item.resolve(rng, ctx)?);
        }
        rng.shuffle(&mut values);
        Ok(Value::List(values))
    }
}

// ============================================================================
// PICK AND PICKSET
// ============================================================================

/// Lists of `count` items taken from distinct positions of a fixed list.
///
/// `pick` and `pickset` draw the same way. Only `pickset` expands, into an
/// array favouring the elements of the expanded value.
#[derive(Clone, Debug)]
pub struct PicksetGenerator {
    items: Vec<Item>,
    count: Length,
    expandable: bool,
}

impl PicksetGenerator {
    pub fn new(items: Vec<Item>, count: Length, expandable: bool) -> Result<Self> {
        if items.is_empty() {
            return Err(GeneratorError::invalid_argument(
                if expandable { "pickset" } else { "pick" },
                "requires a non-empty list of items",
            ));
        }
        Ok(Self {
            items,
            count,
            expandable,
        })
    }
}

impl Strategy for PicksetGenerator {
    fn name(&self) -> &'static str {
        if self.expandable {
            "pickset"
        } else {
            "pick"
        }
    }

    fn options(&self) -> Value {
        Value::map([
            (
                "items",
                Value::List(self.items.iter().map(Item::describe).collect()),
            ),
            ("count", self.count.describe()),
        ])
    }

    fn generate(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        let count = self.count.sample(rng, ctx)?;
        if count > self.items.len() {
            return Err(GeneratorError::invalid_argument(
                self.name(),
                format!("cannot pick {count} of {} items", self.items.len()),
            ));
        }
        let mut positions: Vec<usize> = (0..self.items.len()).collect();
        rng.shuffle(&mut positions);
        let mut values = Vec::with_capacity(count);
        for &i in &positions[..count] {
            values.push(self.items[i].resolve(rng, ctx)?);
        }
        Ok(Value::List(values))
    }

    fn is_shrinkable(&self) -> bool {
        true
    }

    /// Deletes regions of the picked list, down to the smallest count.
    fn shrink(&self, value: &Value) -> Generator {
        let Some(elements) = value.as_list() else {
            return Generator::constant(value.clone());
        };
        let min = self.count.lower_bound().min(elements.len());
        Generator::ArraySplicer(ArraySplicer::new(
            elements.iter().cloned().map(Item::Literal).collect(),
            min,
        ))
    }

    fn is_expandable(&self) -> bool {
        self.expandable
    }

    fn expand(&self, value: &Value) -> Generator {
        let pool = Generator::Pickone(PickoneGenerator::trusted(self.items.clone()));
        ArrayGenerator::new(pool, self.count.clone()).expand(value)
    }
}
