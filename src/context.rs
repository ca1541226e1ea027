use crate::value::Value;
use im::HashMap;

/// Mutable scratch state threaded through one generation chain.
///
/// An iterator owns exactly one context and passes it by reference into every
/// `generate` call; shrink and expand replace it with a fresh one. The map is
/// persistent, so snapshotting a context (as resumable sequences do) is cheap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Context {
    slots: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.slots.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.slots.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.slots.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut ctx = Context::new();
        ctx.set("gender", "female");
        assert_eq!(ctx.get("gender"), Some(&Value::from("female")));
        assert!(ctx.contains("gender"));
        assert_eq!(ctx.remove("gender"), Some(Value::from("female")));
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut ctx = Context::new();
        ctx.set("n", 1);
        let snapshot = ctx.clone();
        ctx.set("n", 2);
        assert_eq!(snapshot.get("n"), Some(&Value::Int(1)));
        assert_eq!(ctx.get("n"), Some(&Value::Int(2)));
    }
}
