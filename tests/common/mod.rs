//! # Shrinkgen Test Helpers
//!
//! Shared setup for the integration suites: isolated iterators and a shrink
//! driver that follows a chain to its end.

#![allow(dead_code)]

use shrinkgen::prelude::*;

/// Shrink chains longer than this are treated as non-terminating.
pub const MAX_SHRINK_STEPS: usize = 500;

/// An iterator over a private random source for `seed`.
pub fn isolated(generator: Generator, seed: u64) -> GeneratorIterator {
    GeneratorIterator::new(generator, IteratorOptions::isolated(seed))
}

/// Repeatedly generates and shrinks until the generator reports it is
/// minimal. Returns the final value and the number of shrink steps taken.
pub fn shrink_to_end(it: &mut GeneratorIterator) -> (Value, usize) {
    let mut value = it.next().expect("generation succeeds");
    let mut steps = 0;
    while it.is_shrinkable() {
        assert!(steps < MAX_SHRINK_STEPS, "shrinking {} did not terminate", it.generator());
        it.shrink(&value);
        value = it.next().expect("generation succeeds");
        steps += 1;
    }
    (value, steps)
}

/// Counter id, a fixed pair of numbers, two strings and a short array.
pub fn person_template() -> Template {
    Template::map([
        ("id", Template::from(Generator::producer(0, |last| Value::Int(last.as_int().unwrap_or(0) + 1)))),
        (
            "numbers",
            Template::list([
                Template::from(Generator::integer(0, 100).expect("valid bounds")),
                Template::from(Generator::integer(500, 1000).expect("valid bounds")),
            ]),
        ),
        (
            "strings",
            Template::list([
                Template::from(Generator::string(Length::default())),
                Template::from(Generator::string(Generator::natural(5).expect("valid bounds"))),
            ]),
        ),
        (
            "arrays",
            Template::from(Generator::array(
                Generator::integer(0, 100).expect("valid bounds"),
                Generator::natural(5).expect("valid bounds"),
            )),
        ),
    ])
}

pub fn ints(values: &[i64]) -> Value {
    Value::List(values.iter().copied().map(Value::Int).collect())
}

pub fn strings(values: &[&str]) -> Value {
    Value::List(values.iter().copied().map(Value::from).collect())
}
