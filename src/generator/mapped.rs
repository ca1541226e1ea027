//! Output mapping and expand priming.

use super::{Generator, Strategy};
use crate::context::Context;
use crate::errors::Result;
use crate::random::RandomSource;
use crate::value::Value;
use std::rc::Rc;

pub type MapFn = Rc<dyn Fn(Value) -> Value>;

// ============================================================================
// MAPPED
// ============================================================================

/// Applies a function to every value of an inner generator.
///
/// The function is not invertible, so the generator remembers the last
/// pre-map value it saw. Shrinking or expanding the mapped value it last
/// produced rewrites the inner generator against that pre-map value and maps
/// the result again.
#[derive(Clone)]
pub struct MappedGenerator {
    inner: Box<Generator>,
    f: MapFn,
    last: Option<(Value, Value)>,
}

impl MappedGenerator {
    pub fn new(inner: Generator, f: MapFn) -> Self {
        Self {
            inner: Box::new(inner),
            f,
            last: None,
        }
    }

    /// The pre-map value behind `value`, if this generator just produced it.
    fn input_for(&self, value: &Value) -> Option<&Value> {
        self.last
            .as_ref()
            .filter(|(_, output)| output == value)
            .map(|(input, _)| input)
    }

    fn remap(&self, inner: Generator) -> Generator {
        inner.map_with(Rc::clone(&self.f))
    }
}

impl std::fmt::Debug for MappedGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedGenerator")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl Strategy for MappedGenerator {
    /// Mapping is transparent: the generator keeps its inner name.
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn options(&self) -> Value {
        self.inner.options()
    }

    fn generate(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        let input = self.inner.generate(rng, ctx)?;
        let output = (self.f)(input.clone());
        self.last = Some((input, output.clone()));
        Ok(output)
    }

    fn is_shrinkable(&self) -> bool {
        self.inner.is_shrinkable()
    }

    fn shrink(&self, value: &Value) -> Generator {
        match self.input_for(value) {
            Some(input) => self.remap(self.inner.shrink_unchecked(input)),
            None => Generator::constant(value.clone()),
        }
    }

    fn is_expandable(&self) -> bool {
        self.inner.is_expandable()
    }

    fn expand(&self, value: &Value) -> Generator {
        match self.input_for(value) {
            Some(input) => self.remap(self.inner.expand_unprimed(input)),
            None => Generator::constant(value.clone()),
        }
    }
}

// ============================================================================
// PRIMED
// ============================================================================

/// Returns `value` on its first call and defers to `inner` afterwards.
///
/// This is what makes [`Generator::expand`] reproduce the expanded value as
/// its immediate next output. `inner` never saw that first output, so the
/// generator that did produce it is kept as `origin` and shrinking or
/// expanding the replayed value goes through it.
#[derive(Clone, Debug)]
pub struct PrimedGenerator {
    value: Value,
    pending: bool,
    replayed_last: bool,
    inner: Box<Generator>,
    origin: Box<Generator>,
}

impl PrimedGenerator {
    pub fn new(value: Value, inner: Generator, origin: Generator) -> Self {
        Self {
            value,
            pending: true,
            replayed_last: false,
            inner: Box::new(inner),
            origin: Box::new(origin),
        }
    }

    /// The generator accountable for `value`: `origin` while the replayed
    /// value is the latest output, `inner` otherwise.
    fn source_of(&self, value: &Value) -> &Generator {
        if self.replayed_last && value == &self.value {
            &self.origin
        } else {
            &self.inner
        }
    }
}

impl Strategy for PrimedGenerator {
    fn name(&self) -> &'static str {
        "primed"
    }

    fn options(&self) -> Value {
        Value::map([
            ("value", self.value.clone()),
            ("generator", self.inner.describe()),
        ])
    }

    fn generate(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        if self.pending {
            self.pending = false;
            self.replayed_last = true;
            return Ok(self.value.clone());
        }
        self.replayed_last = false;
        self.inner.generate(rng, ctx)
    }

    fn is_shrinkable(&self) -> bool {
        self.inner.is_shrinkable() || self.origin.is_shrinkable()
    }

    fn shrink(&self, value: &Value) -> Generator {
        let source = self.source_of(value);
        if source.is_shrinkable() {
            source.shrink_unchecked(value)
        } else {
            Generator::constant(value.clone())
        }
    }

    fn is_expandable(&self) -> bool {
        self.inner.is_expandable() || self.origin.is_expandable()
    }

    fn expand(&self, value: &Value) -> Generator {
        let source = self.source_of(value);
        if source.is_expandable() {
            source.expand_unprimed(value)
        } else {
            Generator::constant(value.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;

    fn plus_ten() -> Generator {
        Generator::integer(0, 100)
            .expect("valid bounds")
            .map(|v| Value::Int(v.as_int().unwrap_or(0) + 10))
    }

    #[test]
    fn test_map_applies_function() {
        let mut rng = RandomSource::new(42);
        let mut ctx = Context::new();
        let mut generator = plus_ten();
        for _ in 0..20 {
            let value = generator.generate(&mut rng, &mut ctx).expect("generation succeeds");
            assert!((10..=110).contains(&value.as_int().expect("int output")));
        }
        assert_eq!(generator.name(), "integer");
    }

    #[test]
    fn test_mapped_shrink_works_on_pre_map_value() {
        let mut rng = RandomSource::new(42);
        let mut ctx = Context::new();
        let mut generator = plus_ten();
        let mut steps = 0;
        let mut value = generator.generate(&mut rng, &mut ctx).expect("generation succeeds");
        while let Some(next) = generator.shrink(&value) {
            generator = next;
            value = generator.generate(&mut rng, &mut ctx).expect("generation succeeds");
            steps += 1;
            assert!(steps < 200, "shrinking did not terminate");
        }
        assert_eq!(value, Value::Int(10));
    }

    #[test]
    fn test_mapped_shrink_of_foreign_value_is_constant() {
        let generator = plus_ten();
        let shrunk = generator.shrink(&Value::Int(5)).expect("shrinkable");
        assert_eq!(shrunk.name(), "constant");
    }

    #[test]
    fn test_primed_returns_value_first() {
        let mut rng = RandomSource::new(42);
        let mut ctx = Context::new();
        let inner = Generator::integer(0, 3).expect("valid bounds");
        let mut generator = Generator::primed(Value::Int(-7), inner.clone(), inner);
        assert_eq!(generator.generate(&mut rng, &mut ctx), Ok(Value::Int(-7)));
        for _ in 0..10 {
            let value = generator.generate(&mut rng, &mut ctx).expect("generation succeeds");
            assert!((0..=3).contains(&value.as_int().expect("int output")));
        }
    }

    #[test]
    fn test_primed_value_shrinks_through_its_origin() {
        let mut rng = RandomSource::new(42);
        let mut ctx = Context::new();
        let mut origin = Generator::weighted(vec![
            (Item::from("literal"), 1.0),
            (Item::from(Generator::integer(0, 1000).expect("valid bounds")), 1000.0),
        ])
        .expect("valid weights");
        let mut value = origin.generate(&mut rng, &mut ctx).expect("generation succeeds");
        while value.as_int().is_none() {
            value = origin.generate(&mut rng, &mut ctx).expect("generation succeeds");
        }
        let mut expanded = origin.expand(&value).expect("expandable");
        assert_eq!(expanded.generate(&mut rng, &mut ctx), Ok(value.clone()));
        let shrunk = expanded.shrink(&value).expect("shrinkable");
        assert_eq!(shrunk.name(), "integer");
    }
}
