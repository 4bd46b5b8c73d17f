//! Configuration validation command.

use std::path::Path;

use crate::adapter::SolverRegistry;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

use super::output;

/// Load and validate a configuration file, then resolve its solver
/// selectors against the built-in adapters.
///
/// The MILP selector must resolve. NLP adapters are registered by embedding
/// applications, so an unknown NLP selector is only a warning.
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails validation, or names
/// an unknown MILP adapter.
pub fn execute<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("config", path.display());

    let config = Config::load(path)?;
    config.init_logging();
    output::success("configuration is valid");

    let loa = &config.loa;
    output::section("Decomposition");
    output::field("iteration_limit", loa.iteration_limit);
    output::field("oa_penalty_factor", loa.oa_penalty_factor);
    output::field("absolute_gap_tolerance", loa.absolute_gap_tolerance);
    output::field("relative_gap_tolerance", loa.relative_gap_tolerance);
    output::field("oa_slacks", loa.oa_slacks);
    output::field(
        "time_limit",
        loa.time_limit
            .map_or_else(|| "none".to_string(), |t| format!("{t}s")),
    );

    output::section("Solvers");
    let registry = SolverRegistry::with_defaults();
    let milp = registry.milp(&loa.mip_solver)?;
    output::success(&format!("mip_solver '{}' resolves to a built-in adapter", milp.name()));
    match registry.nlp(&loa.nlp_solver) {
        Ok(nlp) => output::success(&format!("nlp_solver '{}' resolves", nlp.name())),
        Err(_) => output::warning(&format!(
            "nlp_solver '{}' is not built in; it must be registered by the embedding application",
            loa.nlp_solver
        )),
    }

    Ok(())
}
