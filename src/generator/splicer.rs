//! Region-deletion shrinkers.
//!
//! A splicer holds a base sequence and a minimum length. Each `generate` call
//! deletes one contiguous region `[start, start + count)` from the base,
//! keeping at least `min` items; a zero-length region returns the base
//! unchanged. Shrinking a splicer with one of its candidates seeds a new
//! splicer with that candidate, so generate-then-shrink narrows the base until
//! it reaches `min` items.
//!
//! Strings are spliced by grapheme cluster, never inside one.

use super::{Generator, Strategy};
use crate::context::Context;
use crate::errors::{GeneratorError, Result};
use crate::item::Item;
use crate::random::RandomSource;
use crate::value::Value;
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

/// Picks the half-open region to delete from `len` items so that at least
/// `min` remain.
pub(crate) fn splice_region(rng: &mut RandomSource, len: usize, min: usize) -> Range<usize> {
    if len <= min {
        return 0..0;
    }
    let start = rng.index(len);
    let removable = (len - start).min(len - min);
    let count = usize::try_from(rng.natural(i64::try_from(removable).unwrap_or(i64::MAX)))
        .unwrap_or(0);
    start..start + count
}

// ============================================================================
// STRING SPLICER
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct StringSplicer {
    text: String,
    min: usize,
}

impl StringSplicer {
    pub fn new(text: impl Into<String>, min: usize) -> Self {
        let text = text.into();
        let len = text.graphemes(true).count();
        Self {
            text,
            min: min.min(len),
        }
    }

    pub fn from_value(base: &Value, min: usize) -> Result<Self> {
        match base {
            Value::String(text) => Ok(Self::new(text.clone(), min)),
            other => Err(GeneratorError::invalid_argument(
                "stringSplicer",
                format!("requires a string as the base, got {}", other.type_name()),
            )),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn len(&self) -> usize {
        self.text.graphemes(true).count()
    }
}

impl Strategy for StringSplicer {
    fn name(&self) -> &'static str {
        "stringSplicer"
    }

    fn options(&self) -> Value {
        Value::map([
            ("text", Value::from(self.text.as_str())),
            ("min", Value::from(self.min)),
        ])
    }

    fn generate(&mut self, rng: &mut RandomSource, _ctx: &mut Context) -> Result<Value> {
        let graphemes: Vec<&str> = self.text.graphemes(true).collect();
        let region = splice_region(rng, graphemes.len(), self.min);
        let spliced: String = graphemes
            .iter()
            .enumerate()
            .filter(|(i, _)| !region.contains(i))
            .map(|(_, g)| *g)
            .collect();
        Ok(Value::String(spliced))
    }

    fn is_shrinkable(&self) -> bool {
        self.len() > self.min
    }

    fn shrink(&self, value: &Value) -> Generator {
        match value {
            Value::String(candidate) => {
                Generator::StringSplicer(StringSplicer::new(candidate.clone(), self.min))
            }
            other => Generator::constant(other.clone()),
        }
    }

    fn lower_bound(&self) -> Option<i64> {
        i64::try_from(self.min).ok()
    }
}

// ============================================================================
// ARRAY SPLICER
// ============================================================================

/// The slots kept by the last `generate` call and what they resolved to.
#[derive(Clone, Debug)]
struct Splice {
    kept: Vec<usize>,
    output: Vec<Value>,
}

/// Splicer over a list whose slots may be generators.
///
/// Generator slots are resolved when a candidate is produced. Shrinking with
/// the last candidate also shrinks each surviving generator slot against the
/// value it produced, so the outer list and the inner generators narrow
/// together.
#[derive(Clone, Debug)]
pub struct ArraySplicer {
    items: Vec<Item>,
    min: usize,
    last: Option<Splice>,
}

impl ArraySplicer {
    pub fn new(items: Vec<Item>, min: usize) -> Self {
        let min = min.min(items.len());
        Self {
            items,
            min,
            last: None,
        }
    }

    pub fn from_value(base: &Value, min: usize) -> Result<Self> {
        match base {
            Value::List(items) => Ok(Self::new(
                items.iter().cloned().map(Item::Literal).collect(),
                min,
            )),
            other => Err(GeneratorError::invalid_argument(
                "arraySplicer",
                format!("requires a list as the base, got {}", other.type_name()),
            )),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

impl Strategy for ArraySplicer {
    fn name(&self) -> &'static str {
        "arraySplicer"
    }

    fn options(&self) -> Value {
        Value::map([
            (
                "items",
                Value::List(self.items.iter().map(Item::describe).collect()),
            ),
            ("min", Value::from(self.min)),
        ])
    }

    fn generate(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        let region = splice_region(rng, self.items.len(), self.min);
        let kept: Vec<usize> = (0..self.items.len())
            .filter(|i| !region.contains(i))
            .collect();
        let mut output = Vec::with_capacity(kept.len());
        for &index in &kept {
            output.push(self.items[index].resolve(rng, ctx)?);
        }
        self.last = Some(Splice {
            kept,
            output: output.clone(),
        });
        Ok(Value::List(output))
    }

    fn is_shrinkable(&self) -> bool {
        self.items.len() > self.min || self.items.iter().any(Item::is_shrinkable)
    }

    fn shrink(&self, value: &Value) -> Generator {
        let Some(candidate) = value.as_list() else {
            return Generator::constant(value.clone());
        };
        let items = match &self.last {
            Some(splice) if splice.output.as_slice() == candidate => splice
                .kept
                .iter()
                .zip(&splice.output)
                .map(|(&index, produced)| match &self.items[index] {
                    Item::Generator(generator) => {
                        Item::Generator(generator.shrink_or_keep(produced))
                    }
                    literal => literal.clone(),
                })
                .collect(),
            _ => candidate.iter().cloned().map(Item::Literal).collect(),
        };
        Generator::ArraySplicer(ArraySplicer::new(items, self.min))
    }

    fn lower_bound(&self) -> Option<i64> {
        i64::try_from(self.min).ok()
    }
}
