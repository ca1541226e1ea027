//! Structural templates.
//!
//! A [`Template`] is a tree of lists and string-keyed maps whose leaves are
//! literals or generators. Generating replaces every generator leaf with one
//! of its values and leaves everything else alone, so the output always has
//! the template's shape. Shrink and expand walk the template and a produced
//! value in lock-step and rewrite each generator leaf independently.

use super::{Generator, Strategy};
use crate::context::Context;
use crate::errors::Result;
use crate::random::RandomSource;
use crate::value::Value;
use im::OrdMap;

#[derive(Clone, Debug)]
pub enum Template {
    Literal(Value),
    Generator(Generator),
    List(Vec<Template>),
    Map(OrdMap<String, Template>),
}

impl Template {
    pub fn list(items: impl IntoIterator<Item = Template>) -> Self {
        Template::List(items.into_iter().collect())
    }

    /// Builds a map template from key/template pairs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shrinkgen::generator::{Generator, shape::Template};
    /// let template = Template::map([
    ///     ("id", Template::from(7)),
    ///     ("age", Template::from(Generator::natural(100).expect("valid bounds"))),
    /// ]);
    /// assert!(template.has_generators());
    /// ```
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Template)>) -> Self {
        Template::Map(entries.into_iter().map(|(k, t)| (k.into(), t)).collect())
    }

    pub fn has_generators(&self) -> bool {
        self.any_leaf(&|_: &Generator| true)
    }

    fn any_leaf(&self, predicate: &dyn Fn(&Generator) -> bool) -> bool {
        match self {
            Template::Literal(_) => false,
            Template::Generator(generator) => predicate(generator),
            Template::List(items) => items.iter().any(|t| t.any_leaf(predicate)),
            Template::Map(entries) => entries.values().any(|t| t.any_leaf(predicate)),
        }
    }

    fn generate(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        Ok(match self {
            Template::Literal(value) => value.clone(),
            Template::Generator(generator) => generator.generate(rng, ctx)?,
            Template::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items.iter_mut() {
                    values.push(item.generate(rng, ctx)?);
                }
                Value::List(values)
            }
            Template::Map(entries) => {
                let keys: Vec<String> = entries.keys().cloned().collect();
                let mut values = OrdMap::new();
                for key in keys {
                    if let Some(template) = entries.get_mut(&key) {
                        let value = template.generate(rng, ctx)?;
                        values.insert(key, value);
                    }
                }
                Value::Map(values)
            }
        })
    }

    /// Rewrites every generator leaf with `rewrite(leaf, value)`, where
    /// `value` is the part of `value` at the same position. Leaves with no
    /// counterpart in `value` are kept as they are.
    fn rewrite(&self, value: &Value, rewrite: &dyn Fn(&Generator, &Value) -> Generator) -> Template {
        match (self, value) {
            (Template::Generator(generator), value) => Template::Generator(rewrite(generator, value)),
            (Template::List(items), Value::List(values)) => Template::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| match values.get(i) {
                        Some(value) => item.rewrite(value, rewrite),
                        None => item.clone(),
                    })
                    .collect(),
            ),
            (Template::Map(entries), Value::Map(values)) => Template::Map(
                entries
                    .iter()
                    .map(|(key, template)| {
                        let rewritten = match values.get(key) {
                            Some(value) => template.rewrite(value, rewrite),
                            None => template.clone(),
                        };
                        (key.clone(), rewritten)
                    })
                    .collect(),
            ),
            (template, _) => template.clone(),
        }
    }

    /// The template with generator leaves rendered as their descriptions.
    pub fn describe(&self) -> Value {
        match self {
            Template::Literal(value) => value.clone(),
            Template::Generator(generator) => generator.describe(),
            Template::List(items) => Value::List(items.iter().map(Template::describe).collect()),
            Template::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(key, template)| (key.clone(), template.describe()))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for Template {
    /// Lists and maps become containers so a plain value nests like a template.
    fn from(value: Value) -> Self {
        match value {
            Value::List(items) => Template::List(items.into_iter().map(Template::from).collect()),
            Value::Map(entries) => Template::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Template::from(value)))
                    .collect(),
            ),
            other => Template::Literal(other),
        }
    }
}

impl From<Generator> for Template {
    fn from(generator: Generator) -> Self {
        Template::Generator(generator)
    }
}

impl From<Vec<Template>> for Template {
    fn from(items: Vec<Template>) -> Self {
        Template::List(items)
    }
}

impl From<&str> for Template {
    fn from(s: &str) -> Self {
        Template::Literal(Value::from(s))
    }
}

impl From<i64> for Template {
    fn from(n: i64) -> Self {
        Template::Literal(Value::Int(n))
    }
}

impl From<i32> for Template {
    fn from(n: i32) -> Self {
        Template::Literal(Value::Int(i64::from(n)))
    }
}

impl From<bool> for Template {
    fn from(b: bool) -> Self {
        Template::Literal(Value::Bool(b))
    }
}

// ============================================================================
// SHAPE GENERATOR
// ============================================================================

/// `Template` holds generators inline, so the shape boxes it to keep
/// `Generator` finitely sized.
#[derive(Clone, Debug)]
pub struct ShapeGenerator {
    template: Box<Template>,
}

impl ShapeGenerator {
    pub fn new(template: Template) -> Self {
        Self {
            template: Box::new(template),
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }
}

impl Strategy for ShapeGenerator {
    fn name(&self) -> &'static str {
        "shape"
    }

    fn options(&self) -> Value {
        self.template.describe()
    }

    fn generate(&mut self, rng: &mut RandomSource, ctx: &mut Context) -> Result<Value> {
        self.template.generate(rng, ctx)
    }

    fn is_shrinkable(&self) -> bool {
        self.template.any_leaf(&Generator::is_shrinkable)
    }

    fn shrink(&self, value: &Value) -> Generator {
        Generator::Shape(ShapeGenerator::new(
            self.template.rewrite(value, &Generator::shrink_or_keep),
        ))
    }

    fn is_expandable(&self) -> bool {
        self.template.any_leaf(&Generator::is_expandable)
    }

    fn expand(&self, value: &Value) -> Generator {
        Generator::Shape(ShapeGenerator::new(
            self.template.rewrite(value, &Generator::expand_or_keep),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn person() -> Generator {
        Generator::shape(Template::map([
            ("kind", Template::from("person")),
            (
                "numbers",
                Template::list([
                    Template::from(Generator::integer(0, 100).expect("valid bounds")),
                    Template::from(Generator::integer(500, 1000).expect("valid bounds")),
                ]),
            ),
            ("name", Template::from(Generator::string(Generator::natural(10).expect("valid bounds")))),
        ]))
    }

    fn assert_person_shape(value: &Value) {
        let map = value.as_map().expect("map output");
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["kind", "name", "numbers"]);
        assert_eq!(value.get("kind"), Some(&Value::from("person")));
        assert_eq!(value.get("numbers").and_then(Value::as_list).map(<[Value]>::len), Some(2));
        assert!(value.get("name").and_then(Value::as_str).is_some());
    }

    #[test]
    fn test_generate_mirrors_template() {
        let mut rng = RandomSource::new(42);
        let mut ctx = Context::new();
        let mut generator = person();
        for _ in 0..10 {
            let value = generator.generate(&mut rng, &mut ctx).expect("generation succeeds");
            assert_person_shape(&value);
        }
    }

    #[test]
    fn test_shrink_rewrites_each_leaf() {
        let generator = person();
        let value = Value::map([
            ("kind", Value::from("person")),
            ("numbers", Value::List(vec![Value::Int(37), Value::Int(899)])),
            ("name", Value::from("aFb")),
        ]);
        let shrunk = generator.shrink(&value).expect("shrinkable");
        let options = shrunk.options();
        let numbers = options.get("numbers").and_then(Value::as_list).expect("numbers");
        assert_eq!(
            numbers[0].get("options"),
            Some(&Value::map([("min", Value::Int(0)), ("max", Value::Int(37))]))
        );
        assert_eq!(
            numbers[1].get("options"),
            Some(&Value::map([("min", Value::Int(500)), ("max", Value::Int(899))]))
        );
        assert_eq!(
            options.get("name").and_then(|n| n.get("generator")),
            Some(&Value::from("stringSplicer"))
        );
        assert_eq!(options.get("kind"), Some(&Value::from("person")));
    }

    #[test]
    fn test_shrink_preserves_shape() {
        let mut rng = RandomSource::new(11);
        let mut ctx = Context::new();
        let mut generator = person();
        for _ in 0..10 {
            let value = generator.generate(&mut rng, &mut ctx).expect("generation succeeds");
            assert_person_shape(&value);
            match generator.shrink(&value) {
                Some(next) => generator = next,
                None => break,
            }
        }
    }

    #[test]
    fn test_mismatched_value_keeps_leaves() {
        let generator = person();
        let shrunk = generator.shrink(&Value::Int(3)).expect("shrinkable");
        assert_eq!(shrunk.options(), generator.options());
    }

    #[test]
    fn test_literal_only_template_has_no_capabilities() {
        let generator = Generator::shape(Value::map([("a", Value::Int(1))]));
        assert!(!generator.is_shrinkable());
        assert!(!generator.is_expandable());
    }

    #[test]
    fn test_nested_shapes_generate_and_shrink() {
        let inner = Generator::shape(Template::map([
            ("n", Template::from(Generator::integer(10, 20).expect("valid bounds"))),
        ]));
        let mut generator = Generator::shape(Template::list([
            Template::from(inner),
            Template::from(Generator::integer(0, 5).expect("valid bounds")),
        ]));
        let mut rng = RandomSource::new(42);
        let mut ctx = Context::new();
        let mut value = generator.generate(&mut rng, &mut ctx).expect("generation succeeds");
        let mut steps = 0;
        while let Some(next) = generator.shrink(&value) {
            generator = next;
            value = generator.generate(&mut rng, &mut ctx).expect("generation succeeds");
            steps += 1;
            assert!(steps < 200, "shrinking did not terminate");
        }
        assert_eq!(
            value,
            Value::List(vec![Value::map([("n", Value::Int(10))]), Value::Int(0)])
        );
    }
}
