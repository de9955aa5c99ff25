//! Aggregate-name → verifier factory table consumed by the fuzz harness.

use approxverify_core::{
    config::VerifierConfig,
    engine::Engine,
    verifier::{ApproxDistinctVerifier, ResultVerifier},
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;
use tracing::debug;

///
/// VerifierFactory
///
/// Builds one fresh verifier. The harness creates a new instance per fuzz
/// iteration, so no state leaks between iterations.
///

pub type VerifierFactory<G> = fn(G, VerifierConfig) -> Box<dyn ResultVerifier>;

///
/// RegistryError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum RegistryError {
    #[error("no result verifier registered for aggregate '{name}'")]
    Unknown { name: String },

    #[error("a result verifier is already registered for aggregate '{name}'")]
    Duplicate { name: String },
}

///
/// VerifierRegistry
///

pub struct VerifierRegistry<G> {
    engine: G,
    config: VerifierConfig,
    factories: BTreeMap<String, VerifierFactory<G>>,
}

impl<G> VerifierRegistry<G>
where
    G: Engine + Clone + 'static,
{
    /// Registry with no verifiers.
    #[must_use]
    pub const fn new(engine: G, config: VerifierConfig) -> Self {
        Self {
            engine,
            config,
            factories: BTreeMap::new(),
        }
    }

    /// Registry with every built-in verifier.
    #[must_use]
    pub fn with_defaults(engine: G, config: VerifierConfig) -> Self {
        let mut registry = Self::new(engine, config);
        registry
            .factories
            .insert("approx_distinct".to_string(), approx_distinct::<G>);

        registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: VerifierFactory<G>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }
        self.factories.insert(name, factory);

        Ok(())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered aggregate names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build a fresh, uninitialized verifier for `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn ResultVerifier>, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::Unknown {
                name: name.to_string(),
            })?;
        debug!(aggregate = name, "creating result verifier");

        Ok(factory(self.engine.clone(), self.config.clone()))
    }
}

fn approx_distinct<G: Engine + 'static>(
    engine: G,
    config: VerifierConfig,
) -> Box<dyn ResultVerifier> {
    Box::new(ApproxDistinctVerifier::with_config(engine, config))
}

///
/// TESTS
///
