use std::sync::Arc;

use crate::error::ConfigError;
use crate::port::{MilpSolver, NlpSolver};

use super::highs::HighsMilpSolver;

/// Registry of solver adapters, looked up by the selector names used in
/// configuration.
///
/// Only the MILP side ships a built-in backend. NLP adapters are registered
/// by the embedding application.
#[derive(Default, Clone)]
pub struct SolverRegistry {
    milp: Vec<Arc<dyn MilpSolver>>,
    nlp: Vec<Arc<dyn NlpSolver>>,
}

impl SolverRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in adapters (HiGHS).
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_milp(Arc::new(HighsMilpSolver::new()));
        registry
    }

    /// Register a MILP adapter under its [`MilpSolver::name`].
    ///
    /// A later registration with the same name replaces the earlier one.
    pub fn register_milp(&mut self, solver: Arc<dyn MilpSolver>) {
        self.milp.retain(|s| s.name() != solver.name());
        self.milp.push(solver);
    }

    /// Register an NLP adapter under its [`NlpSolver::name`].
    ///
    /// A later registration with the same name replaces the earlier one.
    pub fn register_nlp(&mut self, solver: Arc<dyn NlpSolver>) {
        self.nlp.retain(|s| s.name() != solver.name());
        self.nlp.push(solver);
    }

    /// Resolve a MILP selector.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSolver`] if nothing is registered under `name`.
    pub fn milp(&self, name: &str) -> Result<Arc<dyn MilpSolver>, ConfigError> {
        self.milp
            .iter()
            .find(|s| s.name() == name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownSolver {
                kind: "mip",
                name: name.to_string(),
            })
    }

    /// Resolve an NLP selector.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSolver`] if nothing is registered under `name`.
    pub fn nlp(&self, name: &str) -> Result<Arc<dyn NlpSolver>, ConfigError> {
        self.nlp
            .iter()
            .find(|s| s.name() == name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownSolver {
                kind: "nlp",
                name: name.to_string(),
            })
    }

    /// Names of registered MILP adapters, in registration order.
    #[must_use]
    pub fn milp_names(&self) -> Vec<&'static str> {
        self.milp.iter().map(|s| s.name()).collect()
    }

    /// Names of registered NLP adapters, in registration order.
    #[must_use]
    pub fn nlp_names(&self) -> Vec<&'static str> {
        self.nlp.iter().map(|s| s.name()).collect()
    }
}
