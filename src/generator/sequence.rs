//! Stateful step chains.
//!
//! A sequence calls its step function once per element, passing a context
//! private to the sequence and the previously generated element. The step
//! returns an [`Item`]; generator items are resolved with the outer random
//! source and context before the element is appended and fed forward.

use super::primitive::IntegerGenerator;
use super::{Generator, Length, Strategy};
use crate::context::Context;
use crate::errors::Result;
use crate::item::Item;
use crate::random::RandomSource;
use crate::value::Value;
use std::rc::Rc;

pub type StepFn = Rc<dyn Fn(&mut Context, Option<&Value>) -> Item>;

#[derive(Clone, Debug)]
pub struct SequenceOptions {
    /// How many steps one `generate` call runs. Defaults to `0..=10`.
    pub length: Length,
    /// Whether `expand` continues a produced sequence.
    pub resumable: bool,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            length: Length::from(Generator::Integer(IntegerGenerator::new_unchecked(0, 10))),
            resumable: false,
        }
    }
}

impl SequenceOptions {
    pub fn resumable(mut self) -> Self {
        self.resumable = true;
        self
    }

    pub fn with_length(mut self, length: impl Into<Length>) -> Self {
        self.length = length.into();
        self
    }
}

/// A produced sequence together with the step context that produced it.
#[derive(Clone, Debug)]
struct Run {
    values: Vec<Value>,
    ctx: Context,
}

#[derive(Clone)]
pub struct SequenceGenerator {
    step: StepFn,
    length: Length,
    resumable: bool,
    continuation: Option<Run>,
    last: Option<Run>,
}

impl SequenceGenerator {
    pub fn new(step: StepFn, options: SequenceOptions) -> Self {
        Self {
            step,
            length: options.length,
            resumable: options.resumable,
            continuation: None,
            last: None,
        }
    }

    fn derived(&self, length: Length, continuation: Option<Run>) -> Self {
        Self {
            step: Rc::clone(&self.step),
            length,
            resumable: self.resumable,
            continuation,
            last: None,
        }
    }

    fn prefix_len(&self) -> usize {
        self.continuation.as_ref().map_or(0, |run| run.values.len())
    }
}

impl std::fmt::Debug for SequenceGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceGenerator")
            .field("length", &self.length)
            .field("resumable", &self.resumable)
            .field("prefix_len", &self.prefix_len())
            .finish()
    }
}

impl Strategy for SequenceGenerator {
    fn name(&self) -> &'static str {
        "sequence"
    }

    fn options(&self) -> Value {
        Value::map([
            ("length", self.length.describe()),
            ("resumable", Value::Bool(self.resumable)),
        ])
    }

    fn generate(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        let (mut values, mut step_ctx) = match &self.continuation {
            Some(run) => (run.values.clone(), run.ctx.clone()),
            None => (Vec::new(), Context::new()),
        };
        let steps = self.length.sample(rng, ctx)?;
        for _ in 0..steps {
            let mut item = (self.step)(&mut step_ctx, values.last());
            values.push(item.resolve(rng, ctx)?);
        }
        self.last = Some(Run {
            values: values.clone(),
            ctx: step_ctx,
        });
        Ok(Value::List(values))
    }

    fn is_shrinkable(&self) -> bool {
        !matches!(self.length, Length::Fixed(0)) || self.prefix_len() > 0
    }

    /// A sequence one step shorter than `value`, restarted from scratch.
    fn shrink(&self, value: &Value) -> Generator {
        match value.as_list() {
            Some([]) | None => Generator::constant(Value::List(Vec::new())),
            Some(values) => Generator::Sequence(self.derived(Length::Fixed(values.len() - 1), None)),
        }
    }

    fn is_expandable(&self) -> bool {
        self.resumable
    }

    /// Continues `value` with further steps. The step context is the one that
    /// produced `value` when it was this generator's last output, otherwise a
    /// fresh one.
    fn expand(&self, value: &Value) -> Generator {
        let Some(values) = value.as_list() else {
            return Generator::constant(value.clone());
        };
        let ctx = self
            .last
            .as_ref()
            .filter(|run| run.values.as_slice() == values)
            .map(|run| run.ctx.clone())
            .unwrap_or_default();
        let continuation = Run {
            values: values.to_vec(),
            ctx,
        };
        Generator::Sequence(self.derived(self.length.clone(), Some(continuation)))
    }
}
