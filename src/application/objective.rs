//! Penalized master objective.
//!
//! Each iteration the master optimizes
//!
//! ```text
//! original(x) + sign * penalty_factor * sum(oa_slacks)
//! ```
//!
//! with `sign = +1` when minimizing and `-1` when maximizing, so nonzero
//! slacks always make the objective worse. Any point that satisfies every cut
//! without slack keeps its original value, which is why the penalized optimum
//! is still a valid bound.

use serde::Serialize;

use crate::domain::{LinearExpr, MasterModel, Objective, ObjectiveId, ProblemSnapshot, Sense, VarId};
use crate::error::ModelError;

/// The objective installed on the master for one iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AugmentedObjective {
    pub id: ObjectiveId,
    /// Objective the master optimizes.
    pub penalized: LinearExpr,
    /// Objective of the original problem, for reporting progress.
    pub original: LinearExpr,
    pub sense: Sense,
}

impl AugmentedObjective {
    /// `(penalized, original)` values at a master point.
    #[must_use]
    pub fn evaluate(&self, values: &[f64]) -> (f64, f64) {
        (self.penalized.evaluate(values), self.original.evaluate(values))
    }
}

/// `sign * factor * sum(slacks)`.
#[must_use]
pub fn penalty_expression(slacks: &[VarId], penalty_factor: f64, sense: Sense) -> LinearExpr {
    let weight = sense.penalty_sign() * penalty_factor;
    LinearExpr::from_terms(slacks.iter().map(|s| (*s, weight)))
}

/// Deactivate the master's current objective and activate a freshly built
/// penalized one.
///
/// The penalty is rebuilt from `slacks` on every call, so slacks introduced by
/// cuts since the previous call are included. Deactivated objectives remain in
/// the model.
///
/// # Errors
///
/// Returns [`ModelError::NoActiveObjective`] if the master has no active
/// objective to replace.
pub fn install_augmented_objective(
    model: &mut MasterModel,
    snapshot: &ProblemSnapshot,
    slacks: &[VarId],
    penalty_factor: f64,
    iteration: usize,
) -> Result<AugmentedObjective, ModelError> {
    if model.active_objective().is_none() {
        return Err(ModelError::NoActiveObjective);
    }

    let sense = snapshot.sense();
    let original = snapshot.objective().clone();
    let penalized = original.plus(&penalty_expression(slacks, penalty_factor, sense));

    let id = model.add_objective(Objective::new(
        format!("{}_oa_{iteration}", snapshot.objective_name()),
        penalized.clone(),
        sense,
    ))?;
    model.activate_objective(id)?;

    Ok(AugmentedObjective {
        id,
        penalized,
        original,
        sense,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Variable, VariableBounds};

    fn master(sense: Sense) -> (MasterModel, VarId, VarId) {
        let mut model = MasterModel::new();
        let x = model.add_variable(Variable::continuous("x", VariableBounds::bounded(0.0, 10.0)));
        let s = model.add_variable(Variable::continuous("s", VariableBounds::non_negative()));
        model
            .set_objective(Objective::new("obj", LinearExpr::var(x), sense))
            .unwrap();
        (model, x, s)
    }

    #[test]
    fn penalty_worsens_minimization() {
        let (mut model, _, s) = master(Sense::Minimize);
        let snapshot = ProblemSnapshot::capture(&model).unwrap();
        let objective = install_augmented_objective(&mut model, &snapshot, &[s], 1000.0, 1).unwrap();

        let (penalized, original) = objective.evaluate(&[3.0, 0.5]);
        assert_eq!(original, 3.0);
        assert_eq!(penalized, 503.0);
        assert!(penalized >= original);
    }

    #[test]
    fn penalty_worsens_maximization() {
        let (mut model, _, s) = master(Sense::Maximize);
        let snapshot = ProblemSnapshot::capture(&model).unwrap();
        let objective = install_augmented_objective(&mut model, &snapshot, &[s], 10.0, 1).unwrap();

        let (penalized, original) = objective.evaluate(&[3.0, 0.5]);
        assert_eq!(penalized, -2.0);
        assert!(penalized <= original);
    }

    #[test]
    fn zero_slack_leaves_objective_unchanged() {
        let (mut model, _, s) = master(Sense::Minimize);
        let snapshot = ProblemSnapshot::capture(&model).unwrap();
        let objective = install_augmented_objective(&mut model, &snapshot, &[s], 1000.0, 1).unwrap();
        let (penalized, original) = objective.evaluate(&[7.0, 0.0]);
        assert_eq!(penalized, original);
    }

    #[test]
    fn reinstalling_swaps_active_objective_and_keeps_history() {
        let (mut model, _, s) = master(Sense::Minimize);
        let snapshot = ProblemSnapshot::capture(&model).unwrap();

        let first = install_augmented_objective(&mut model, &snapshot, &[], 1000.0, 1).unwrap();
        assert_eq!(first.penalized, snapshot.objective().clone());

        let second = install_augmented_objective(&mut model, &snapshot, &[s], 1000.0, 2).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(model.active_objective().unwrap().0, second.id);
        assert_eq!(model.objectives().len(), 3);
        assert_eq!(second.penalized.terms().len(), 2);
    }

    #[test]
    fn fails_without_active_objective() {
        let (mut model, _, _) = master(Sense::Minimize);
        let snapshot = ProblemSnapshot::capture(&model).unwrap();
        model.deactivate_objective();
        assert_eq!(
            install_augmented_objective(&mut model, &snapshot, &[], 1.0, 1),
            Err(ModelError::NoActiveObjective)
        );
    }
}
