//! Seeded primitive sampling.
//!
//! [`RandomSource`] is the only place the crate touches a PRNG. Generators ask
//! it for integers, characters, picks, shuffles, weighted indices and corpus
//! words; they never hold a PRNG of their own. Two sources built from the same
//! seed answer the same call sequence with the same values.

use crate::errors::{GeneratorError, Result};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use std::cell::RefCell;
use std::rc::Rc;

type SmallRng = Xoshiro256StarStar;

/// Environment variable holding a JSON array of magic strings.
pub const MAGIC_VALUES_ENV: &str = "SHRINKGEN_MAGIC_VALUES";

/// Characters drawn by [`RandomSource::character`].
pub const CHARACTER_POOL: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()[]";

const CONSONANTS: &[u8] = b"bcdfghjklmnprstvwz";
const VOWELS: &[u8] = b"aeiou";

/// A random source shared between every iterator that asked the seed cache
/// for the same seed.
pub type SharedRandomSource = Rc<RefCell<RandomSource>>;

// ============================================================================
// MAGIC VALUES
// ============================================================================

/// A fixed set of strings that text sampling prefers over synthetic output.
///
/// Typically filled by a test runner with literals recorded from the code
/// under test.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MagicValues(Vec<String>);

impl MagicValues {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        Self(unique)
    }

    /// Parses a JSON array of strings.
    pub fn parse(json: &str) -> Result<Self> {
        let values: Vec<String> = serde_json::from_str(json).map_err(|e| {
            GeneratorError::config(format!("magic values must be a JSON array of strings: {e}"))
        })?;
        Ok(Self::new(values))
    }

    /// Reads [`MAGIC_VALUES_ENV`]. A missing variable yields an empty set; a
    /// malformed one is logged and ignored.
    pub fn from_env() -> Self {
        let Ok(raw) = std::env::var(MAGIC_VALUES_ENV) else {
            return Self::default();
        };
        match Self::parse(&raw) {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring {}", MAGIC_VALUES_ENV);
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

// ============================================================================
// RANDOM SOURCE
// ============================================================================

#[derive(Clone, Debug)]
pub struct RandomSource {
    seed: u64,
    prng: SmallRng,
    magic: MagicValues,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            prng: SmallRng::seed_from_u64(seed),
            magic: MagicValues::from_env(),
        }
    }

    pub fn with_magic_values(self, magic: MagicValues) -> Self {
        Self { magic, ..self }
    }

    pub fn shared(self) -> SharedRandomSource {
        Rc::new(RefCell::new(self))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn magic_values(&self) -> &MagicValues {
        &self.magic
    }

    /// Uniform integer in `[min, max]`. A degenerate range yields `min`.
    pub fn integer(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.prng.gen_range(min..=max)
    }

    pub fn natural(&mut self, max: i64) -> i64 {
        self.integer(0, max.max(0))
    }

    pub fn bool(&mut self) -> bool {
        self.prng.gen_bool(0.5)
    }

    /// True with the given probability, clamped to `[0, 1]`.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.prng.gen_bool(probability.clamp(0.0, 1.0))
    }

    pub fn character(&mut self) -> char {
        char::from(CHARACTER_POOL[self.index(CHARACTER_POOL.len())])
    }

    pub fn string(&mut self, length: usize) -> String {
        (0..length).map(|_| self.character()).collect()
    }

    /// Uniform index into a collection of `len` items. `len` of zero yields 0.
    pub fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.prng.gen_range(0..len)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.prng);
    }

    /// Index of an entry chosen with probability proportional to its weight.
    pub fn weighted(&mut self, weights: &[f64]) -> Result<usize> {
        let dist = WeightedIndex::new(weights)
            .map_err(|e| GeneratorError::invalid_argument("weighted", e.to_string()))?;
        Ok(dist.sample(&mut self.prng))
    }

    // ------------------------------------------------------------------------
    // Corpus sampling
    // ------------------------------------------------------------------------

    fn syllable(&mut self) -> String {
        let mut syllable = String::with_capacity(3);
        if self.chance(0.8) {
            syllable.push(char::from(CONSONANTS[self.index(CONSONANTS.len())]));
        }
        syllable.push(char::from(VOWELS[self.index(VOWELS.len())]));
        if self.chance(0.4) {
            syllable.push(char::from(CONSONANTS[self.index(CONSONANTS.len())]));
        }
        syllable
    }

    /// A pronounceable lowercase word of one to three syllables.
    pub fn word(&mut self) -> String {
        let syllables = self.integer(1, 3);
        (0..syllables).map(|_| self.syllable()).collect()
    }

    pub fn sentence(&mut self) -> String {
        let words = self.integer(6, 14);
        let mut sentence = (0..words).map(|_| self.word()).collect::<Vec<_>>().join(" ");
        if let Some(first) = sentence.get(..1) {
            let upper = first.to_uppercase();
            sentence.replace_range(..1, &upper);
        }
        sentence.push('.');
        sentence
    }

    pub fn paragraph(&mut self) -> String {
        let sentences = self.integer(2, 5);
        (0..sentences)
            .map(|_| self.sentence())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// A magic value when any are configured, otherwise a corpus word.
    pub fn magic_string(&mut self) -> String {
        if self.magic.is_empty() {
            return self.word();
        }
        let pick = self.index(self.magic.0.len());
        self.magic.0[pick].clone()
    }

    /// Free-form text: a word, a sentence, a paragraph or raw characters, with
    /// magic values mixed in when configured.
    pub fn text(&mut self) -> String {
        let magic_weight = if self.magic.is_empty() { 0.0 } else { 2.0 };
        let choice = self
            .weighted(&[1.0, 2.0, 1.0, 1.0, magic_weight])
            .unwrap_or(0);
        match choice {
            0 => self.word(),
            1 => self.sentence(),
            2 => self.paragraph(),
            3 => {
                let length = self.index(20);
                self.string(length)
            }
            _ => self.magic_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = RandomSource::new(13);
        let mut b = RandomSource::new(13);
        let left: Vec<i64> = (0..20).map(|_| a.integer(-100, 100)).collect();
        let right: Vec<i64> = (0..20).map(|_| b.integer(-100, 100)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_integer_respects_bounds() {
        let mut rng = RandomSource::new(1);
        for _ in 0..500 {
            let n = rng.integer(-3, 7);
            assert!((-3..=7).contains(&n));
        }
        assert_eq!(rng.integer(5, 5), 5);
    }

    #[test]
    fn test_weighted_rejects_zero_total() {
        let mut rng = RandomSource::new(1);
        assert!(rng.weighted(&[0.0, 0.0]).is_err());
        assert!(rng.weighted(&[]).is_err());
        assert_eq!(rng.weighted(&[0.0, 3.0]).ok(), Some(1));
    }

    #[test]
    fn test_magic_string_prefers_magic_values() {
        let mut rng = RandomSource::new(7).with_magic_values(MagicValues::new(["foo", "bar"]));
        for _ in 0..20 {
            let s = rng.magic_string();
            assert!(s == "foo" || s == "bar");
        }
    }

    #[test]
    fn test_magic_values_parse() {
        let magic = MagicValues::parse(r#"["a", "b", "a"]"#).expect("valid json");
        assert_eq!(magic.as_slice(), &["a".to_string(), "b".to_string()]);
        assert!(MagicValues::parse("{").is_err());
    }

    #[test]
    fn test_sentence_is_capitalized() {
        let mut rng = RandomSource::new(3);
        let sentence = rng.sentence();
        assert!(sentence.ends_with('.'));
        assert!(sentence.chars().next().is_some_and(|c| c.is_ascii_uppercase()));
    }
}
