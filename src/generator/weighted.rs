//! Weighted and uniform choice.
//!
//! Both generators remember the entry they selected last and the value it
//! resolved to. Shrinking that value delegates to the selected entry when it
//! is a shrinkable generator; anything else (a literal entry, or a value this
//! generator did not just produce) shrinks to a constant reproducing it.

use super::primitive::{CorpusGenerator, CorpusKind, IntegerGenerator};
use super::{Generator, Strategy};
use crate::context::Context;
use crate::errors::{GeneratorError, Result};
use crate::item::Item;
use crate::random::RandomSource;
use crate::value::Value;

/// Entries kept from the previous option list when expanding.
pub const EXPANSION_KEEP: usize = 20;

/// Weight multiplier given to the expanded entry, relative to the heaviest
/// existing entry.
pub const EXPANSION_BIAS: f64 = 1.5;

#[derive(Clone, Debug, PartialEq)]
struct Selection {
    index: usize,
    value: Value,
}

/// The selected entry, when `value` is what it just produced.
fn selected_entry<'a>(
    entries: impl Fn(usize) -> Option<&'a Item>,
    last: Option<&Selection>,
    value: &Value,
) -> Option<&'a Item> {
    let selection = last.filter(|s| s.value == *value)?;
    entries(selection.index)
}

// ============================================================================
// WEIGHTED
// ============================================================================

#[derive(Clone, Debug)]
pub struct WeightedGenerator {
    options: Vec<(Item, f64)>,
    last: Option<Selection>,
}

impl WeightedGenerator {
    pub fn new(options: Vec<(Item, f64)>) -> Result<Self> {
        if options.is_empty() {
            return Err(GeneratorError::invalid_argument(
                "weighted",
                "requires a non-empty list of items with weights",
            ));
        }
        if let Some((_, weight)) = options.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            return Err(GeneratorError::invalid_argument(
                "weighted",
                format!("weights must be finite and non-negative, got {weight}"),
            ));
        }
        if options.iter().map(|(_, w)| w).sum::<f64>() <= 0.0 {
            return Err(GeneratorError::invalid_argument(
                "weighted",
                "weights must sum to a positive number",
            ));
        }
        Ok(Self::trusted(options))
    }

    /// Builds from options already known to be non-empty with positive weights.
    pub(crate) fn trusted(options: Vec<(Item, f64)>) -> Self {
        Self {
            options,
            last: None,
        }
    }

    pub fn options_list(&self) -> &[(Item, f64)] {
        &self.options
    }

    fn max_weight(&self) -> f64 {
        self.options
            .iter()
            .map(|(_, w)| *w)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

impl Strategy for WeightedGenerator {
    fn name(&self) -> &'static str {
        "weighted"
    }

    fn options(&self) -> Value {
        Value::List(
            self.options
                .iter()
                .map(|(item, weight)| Value::List(vec![item.describe(), Value::Float(*weight)]))
                .collect(),
        )
    }

    fn generate(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        let weights: Vec<f64> = self.options.iter().map(|(_, w)| *w).collect();
        let index = rng.weighted(&weights)?;
        let value = self.options[index].0.resolve(rng, ctx)?;
        self.last = Some(Selection {
            index,
            value: value.clone(),
        });
        Ok(value)
    }

    fn is_shrinkable(&self) -> bool {
        true
    }

    fn shrink(&self, value: &Value) -> Generator {
        let entry = selected_entry(|i| self.options.get(i).map(|(item, _)| item), self.last.as_ref(), value);
        match entry.and_then(Item::as_generator) {
            Some(generator) if generator.is_shrinkable() => generator.shrink_unchecked(value),
            _ => Generator::constant(value.clone()),
        }
    }

    fn is_expandable(&self) -> bool {
        true
    }

    /// Re-weights the option list around `value`.
    ///
    /// When the selected entry is an expandable generator that produced
    /// `value`, its expansion is appended and every option is kept. Otherwise
    /// `value` itself is appended and both the literal entries equal to it and
    /// the selected entry are dropped. Either way only the first
    /// [`EXPANSION_KEEP`] options survive and the new entry weighs
    /// [`EXPANSION_BIAS`] times the heaviest one.
    fn expand(&self, value: &Value) -> Generator {
        let entry = selected_entry(|i| self.options.get(i).map(|(item, _)| item), self.last.as_ref(), value);
        let delegated = entry
            .and_then(Item::as_generator)
            .filter(|generator| generator.is_expandable())
            .map(|generator| generator.expand_unprimed(value));

        let selected_index = self.last.as_ref().map(|s| s.index);
        let kept: Vec<(Item, f64)> = self
            .options
            .iter()
            .enumerate()
            .filter(|(index, (item, _))| {
                delegated.is_some()
                    || (item.as_literal() != Some(value) && Some(*index) != selected_index)
            })
            .map(|(_, option)| option.clone())
            .take(EXPANSION_KEEP)
            .collect();

        let expanded_item = match delegated {
            Some(generator) => Item::Generator(generator),
            None => Item::Literal(value.clone()),
        };
        let mut options = kept;
        options.push((expanded_item, self.max_weight() * EXPANSION_BIAS));
        Generator::Weighted(WeightedGenerator::trusted(options))
    }
}

// ============================================================================
// PICKONE
// ============================================================================

/// Uniform choice among items; generator items are resolved.
#[derive(Clone, Debug)]
pub struct PickoneGenerator {
    items: Vec<Item>,
    last: Option<Selection>,
}

impl PickoneGenerator {
    pub fn new(items: Vec<Item>) -> Result<Self> {
        if items.is_empty() {
            return Err(GeneratorError::invalid_argument(
                "pickone",
                "requires a non-empty list of items",
            ));
        }
        Ok(Self::trusted(items))
    }

    pub(crate) fn trusted(items: Vec<Item>) -> Self {
        Self { items, last: None }
    }

    /// The equal-weight weighted generator carrying this one's last selection.
    fn as_weighted(&self) -> WeightedGenerator {
        WeightedGenerator {
            options: self.items.iter().cloned().map(|item| (item, 1.0)).collect(),
            last: self.last.clone(),
        }
    }
}

impl Strategy for PickoneGenerator {
    fn name(&self) -> &'static str {
        "pickone"
    }

    fn options(&self) -> Value {
        Value::List(self.items.iter().map(Item::describe).collect())
    }

    fn generate(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        let index = rng.index(self.items.len());
        let value = self.items[index].resolve(rng, ctx)?;
        self.last = Some(Selection {
            index,
            value: value.clone(),
        });
        Ok(value)
    }

    fn is_shrinkable(&self) -> bool {
        true
    }

    fn shrink(&self, value: &Value) -> Generator {
        let entry = selected_entry(|i| self.items.get(i), self.last.as_ref(), value);
        match entry.and_then(Item::as_generator) {
            Some(generator) if generator.is_shrinkable() => generator.shrink_unchecked(value),
            _ => Generator::constant(value.clone()),
        }
    }

    fn is_expandable(&self) -> bool {
        true
    }

    fn expand(&self, value: &Value) -> Generator {
        self.as_weighted().expand(value)
    }
}

// ============================================================================
// PRIMITIVE
// ============================================================================

/// Integers and text at weight 10 each, nil and booleans at weight 1 each.
pub fn primitive() -> Generator {
    Generator::Weighted(WeightedGenerator::trusted(vec![
        (Item::Generator(Generator::Integer(IntegerGenerator::default())), 10.0),
        (Item::Generator(Generator::Corpus(CorpusGenerator::new(CorpusKind::Text))), 10.0),
        (Item::Generator(Generator::Pickone(PickoneGenerator::trusted(vec![Item::Literal(Value::Nil)]))), 1.0),
        (Item::Generator(Generator::Corpus(CorpusGenerator::new(CorpusKind::Bool))), 1.0),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn natural_or_text() -> Generator {
        Generator::weighted(vec![
            (Item::from(Generator::text()), 10.0),
            (Item::from(Generator::integer(10, 20).expect("valid bounds")), 20.0),
        ])
        .expect("valid weights")
    }

    #[test]
    fn test_rejects_empty_and_non_positive_weights() {
        assert!(Generator::weighted(vec![]).is_err());
        assert!(Generator::weighted(vec![(Item::from(1), 0.0)]).is_err());
        assert!(Generator::weighted(vec![(Item::from(1), -1.0), (Item::from(2), 3.0)]).is_err());
        assert!(Generator::weighted(vec![(Item::from(1), f64::NAN)]).is_err());
        assert!(Generator::pickone(vec![]).is_err());
    }

    #[test]
    fn test_shrink_delegates_to_selected_generator() {
        let mut rng = RandomSource::new(42);
        let mut ctx = Context::new();
        let mut generator = Generator::weighted(vec![
            (Item::from(Generator::integer(10, 20).expect("valid bounds")), 1.0),
        ])
        .expect("valid weights");
        let value = generator.generate(&mut rng, &mut ctx).expect("generation succeeds");
        let shrunk = generator.shrink(&value).expect("shrinkable");
        assert_eq!(shrunk.name(), "integer");
        assert_eq!(shrunk.lower_bound(), Some(10));
    }

    #[test]
    fn test_shrink_of_literal_selection_is_constant() {
        let mut rng = RandomSource::new(42);
        let mut ctx = Context::new();
        let mut generator =
            Generator::weighted(vec![(Item::from(0), 10.0), (Item::from(1), 20.0)]).expect("valid weights");
        let value = generator.generate(&mut rng, &mut ctx).expect("generation succeeds");
        let mut shrunk = generator.shrink(&value).expect("shrinkable");
        assert_eq!(shrunk.name(), "constant");
        for _ in 0..3 {
            assert_eq!(shrunk.generate(&mut rng, &mut ctx).as_ref(), Ok(&value));
        }
        assert!(!shrunk.is_shrinkable());
    }

    #[test]
    fn test_shrink_of_foreign_value_is_constant() {
        let generator = natural_or_text();
        let shrunk = generator.shrink(&Value::Int(15)).expect("shrinkable");
        assert_eq!(shrunk.name(), "constant");
    }

    #[test]
    fn test_expand_literal_drops_selected_and_biases_value() {
        let mut rng = RandomSource::new(42);
        let mut ctx = Context::new();
        let mut generator =
            Generator::weighted(vec![(Item::from(0), 10.0), (Item::from(1), 20.0)]).expect("valid weights");
        let value = generator.generate(&mut rng, &mut ctx).expect("generation succeeds");
        let Generator::Weighted(expanded) = generator.expand_unprimed(&value) else {
            panic!("expected a weighted generator");
        };
        let options = expanded.options_list();
        assert_eq!(options.len(), 2);
        let (last_item, last_weight) = &options[1];
        assert_eq!(last_item.as_literal(), Some(&value));
        assert_eq!(*last_weight, 30.0);
        assert_ne!(options[0].0.as_literal(), Some(&value));
    }

    #[test]
    fn test_expand_delegated_keeps_every_option() {
        let mut rng = RandomSource::new(42);
        let mut ctx = Context::new();
        let mut generator = Generator::weighted(vec![
            (Item::from("literal"), 10.0),
            (Item::from(Generator::integer(10, 20).expect("valid bounds")), 20.0),
        ])
        .expect("valid weights");
        let mut value = generator.generate(&mut rng, &mut ctx).expect("generation succeeds");
        while value.as_int().is_none() {
            value = generator.generate(&mut rng, &mut ctx).expect("generation succeeds");
        }
        let Generator::Weighted(expanded) = generator.expand_unprimed(&value) else {
            panic!("expected a weighted generator");
        };
        assert_eq!(expanded.options_list().len(), 3);
        assert_eq!(expanded.options_list()[2].1, 30.0);
    }

    #[test]
    fn test_expansion_is_capped() {
        let options = (0..30).map(|i| (Item::from(i), 1.0)).collect();
        let generator = Generator::weighted(options).expect("valid weights");
        let Generator::Weighted(expanded) = generator.expand_unprimed(&Value::Int(99)) else {
            panic!("expected a weighted generator");
        };
        assert_eq!(expanded.options_list().len(), EXPANSION_KEEP + 1);
    }

    #[test]
    fn test_primitive_produces_primitive_values() {
        let mut rng = RandomSource::new(7);
        let mut ctx = Context::new();
        let mut generator = Generator::primitive();
        for _ in 0..50 {
            let value = generator.generate(&mut rng, &mut ctx).expect("generation succeeds");
            assert!(matches!(
                value,
                Value::Int(_) | Value::String(_) | Value::Nil | Value::Bool(_)
            ));
        }
    }
}
