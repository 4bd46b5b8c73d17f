//! Informational commands.

use serde_json::json;

use crate::adapter::SolverRegistry;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

use super::output;

/// Print the default configuration.
///
/// # Errors
///
/// Returns an error if the configuration cannot be rendered.
pub fn execute_defaults() -> Result<()> {
    let config = Config::default();
    let text = config.to_toml()?;
    output::document("defaults", &text, serde_json::to_value(&config)?);
    Ok(())
}

/// List the built-in solver adapters.
pub fn execute_solvers() {
    let registry = SolverRegistry::with_defaults();
    let milp = registry.milp_names();
    let nlp = registry.nlp_names();

    if output::is_json() {
        output::document("solvers", "", json!({ "mip": milp, "nlp": nlp }));
        return;
    }

    output::section("MILP adapters");
    for name in &milp {
        output::field(name, "built in");
    }
    output::section("NLP adapters");
    if nlp.is_empty() {
        output::warning("none built in; register one with SolverRegistry::register_nlp");
    }
    for name in &nlp {
        output::field(name, "built in");
    }
}
