//! Cache key derivation strategies

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::Serialize;

/// Trait for deriving cache keys from request data
///
/// Derivation must be pure: identical normalized parameters always yield the
/// identical key. Collisions are a best-effort risk accepted for a
/// performance cache, not a correctness boundary.
pub trait KeyGenerator: Send + Sync + Debug {
    /// Derives a cache key from the given components
    fn derive(&self, params: &KeyParams) -> String;

    /// Derives a key with a namespace prefix
    fn derive_with_namespace(&self, namespace: &str, params: &KeyParams) -> String {
        format!("{}:{}", namespace, self.derive(params))
    }
}

/// Parameters for cache key derivation
///
/// Components are kept in a sorted map so that the literal order in which a
/// caller supplies them never perturbs the derived key.
#[derive(Debug, Clone, Default)]
pub struct KeyParams {
    /// Primary identifier (e.g., the prompt text)
    pub primary: String,
    /// Secondary components, sorted by name
    pub components: BTreeMap<String, String>,
}

impl KeyParams {
    /// Creates new key parameters with a primary identifier
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            components: BTreeMap::new(),
        }
    }

    /// Adds a component to the key parameters
    pub fn with_component(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.components.insert(key.into(), value.into());
        self
    }

    /// Adds a serializable component, canonicalized as JSON
    ///
    /// Routing through `serde_json::Value` sorts object keys, so two
    /// structurally identical option objects written in different literal
    /// field order produce the same component string.
    pub fn with_serialized_component<T: Serialize>(
        self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        let canonical = serde_json::to_value(value)?;
        Ok(self.with_component(key, canonical.to_string()))
    }

    fn joined(&self) -> String {
        let mut parts = vec![self.primary.clone()];

        for (k, v) in &self.components {
            parts.push(format!("{}={}", k, v));
        }

        parts.join(":")
    }
}

/// Key generator producing a cheap 32-bit FNV-1a hash of the joined
/// parameters, rendered as 8 hex characters
///
/// Not collision-resistant: a collision silently returns the wrong cached
/// artifact.
#[derive(Debug, Clone, Default)]
pub struct Fnv32KeyGenerator;

impl Fnv32KeyGenerator {
    pub fn new() -> Self {
        Self
    }

    fn hash_string(input: &str) -> u32 {
        const FNV_OFFSET: u32 = 0x811c_9dc5;
        const FNV_PRIME: u32 = 0x0100_0193;

        let mut hash = FNV_OFFSET;

        for byte in input.as_bytes() {
            hash ^= u32::from(*byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }

        hash
    }
}

impl KeyGenerator for Fnv32KeyGenerator {
    fn derive(&self, params: &KeyParams) -> String {
        format!("{:08x}", Self::hash_string(&params.joined()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_params_new() {
        let params = KeyParams::new("explain gravity");
        assert_eq!(params.primary, "explain gravity");
        assert!(params.components.is_empty());
    }

    #[test]
    fn test_key_params_with_components() {
        let params = KeyParams::new("explain gravity")
            .with_component("voice", "narrator-1")
            .with_component("level", "beginner");

        assert_eq!(params.components.len(), 2);
        assert_eq!(params.components.get("voice"), Some(&"narrator-1".to_string()));
    }

    #[test]
    fn test_derive_is_stable() {
        let generator = Fnv32KeyGenerator::new();
        let params = KeyParams::new("explain gravity").with_component("level", "beginner");

        assert_eq!(generator.derive(&params), generator.derive(&params));
    }

    #[test]
    fn test_derive_is_eight_hex_chars() {
        let generator = Fnv32KeyGenerator::new();
        let key = generator.derive(&KeyParams::new("anything"));

        assert_eq!(key.len(), 8);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_components_are_sorted() {
        let generator = Fnv32KeyGenerator::new();

        let a = KeyParams::new("p")
            .with_component("zebra", "z")
            .with_component("apple", "a");
        let b = KeyParams::new("p")
            .with_component("apple", "a")
            .with_component("zebra", "z");

        assert_eq!(generator.derive(&a), generator.derive(&b));
    }

    #[test]
    fn test_serialized_component_field_order_is_canonical() {
        let generator = Fnv32KeyGenerator::new();

        // Same object written in different literal field order.
        let first = serde_json::json!({"voice": "narrator-1", "speed": 1.25});
        let second = serde_json::json!({"speed": 1.25, "voice": "narrator-1"});

        let a = KeyParams::new("narrate")
            .with_serialized_component("options", &first)
            .unwrap();
        let b = KeyParams::new("narrate")
            .with_serialized_component("options", &second)
            .unwrap();

        assert_eq!(generator.derive(&a), generator.derive(&b));
    }

    #[test]
    fn test_different_prompts_differ() {
        let generator = Fnv32KeyGenerator::new();

        let a = generator.derive(&KeyParams::new("explain gravity"));
        let b = generator.derive(&KeyParams::new("explain magnetism"));

        assert_ne!(a, b);
    }

    #[test]
    fn test_derive_with_namespace() {
        let generator = Fnv32KeyGenerator::new();
        let params = KeyParams::new("explain gravity");

        let key = generator.derive_with_namespace("lesson-text", &params);
        assert!(key.starts_with("lesson-text:"));
    }
}
