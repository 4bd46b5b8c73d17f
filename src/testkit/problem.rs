//! Small disjunctive instances as (master, subproblem) pairs.
//!
//! Every builder lays out the original variables first in both models, in
//! the same order, so the pairs pass the driver's alignment check.

use crate::domain::{
    Disjunct, LinearConstraint, LinearExpr, MasterModel, NlConstraintId, NonlinearConstraint,
    Objective, Sense, SubproblemModel, VarId, Variable, VariableBounds,
};
use crate::error::Result;
use crate::port::{ConstraintLinearization, NlpSolution, NlpSolver, NlpStatus, SolveOptions};

use super::solver::fixed_assignment;

/// `min x` with a single disjunct `[y] x >= cost` that must be selected.
///
/// Variables: `x = x0`, `y = x1`.
pub fn single_choice(cost: f64) -> (MasterModel, SubproblemModel) {
    let mut master = MasterModel::new();
    let x = master.add_variable(Variable::continuous("x", VariableBounds::bounded(0.0, 10.0)));
    let y = master.add_variable(Variable::binary("y"));
    master
        .add_constraint(LinearConstraint::eq("select", LinearExpr::var(y), 1.0))
        .expect("fixture");
    master
        .set_objective(Objective::minimize("cost", LinearExpr::var(x)))
        .expect("fixture");

    let mut sub = SubproblemModel::new(Sense::Minimize);
    sub.add_variable(Variable::continuous("x", VariableBounds::bounded(0.0, 10.0)));
    let y = sub.add_variable(Variable::binary("y"));
    let d = sub.add_disjunct(Disjunct::new("d", y)).expect("fixture");
    sub.add_constraint(NonlinearConstraint::geq("cost", cost).in_disjunct(d))
        .expect("fixture");

    (master, sub)
}

/// `min z` over `n` disjuncts of which exactly one is selected.
///
/// Variables: `z = x0`, then indicators `y0..y{n-1} = x1..xn`. Each disjunct
/// carries one opaque constraint; its feasibility is up to the NLP double.
pub fn exactly_one(n: usize) -> (MasterModel, SubproblemModel) {
    let mut master = MasterModel::new();
    let z = master.add_variable(Variable::continuous("z", VariableBounds::bounded(0.0, 100.0)));
    let indicators: Vec<VarId> = (0..n)
        .map(|i| master.add_variable(Variable::binary(format!("y{i}"))))
        .collect();
    master
        .add_constraint(LinearConstraint::eq(
            "exactly_one",
            LinearExpr::from_terms(indicators.iter().map(|y| (*y, 1.0))),
            1.0,
        ))
        .expect("fixture");
    master
        .set_objective(Objective::minimize("cost", LinearExpr::var(z)))
        .expect("fixture");

    let mut sub = SubproblemModel::new(Sense::Minimize);
    sub.add_variable(Variable::continuous("z", VariableBounds::bounded(0.0, 100.0)));
    for i in 0..n {
        let y = sub.add_variable(Variable::binary(format!("y{i}")));
        let d = sub
            .add_disjunct(Disjunct::new(format!("d{i}"), y))
            .expect("fixture");
        sub.add_constraint(NonlinearConstraint::leq(format!("g{i}"), 0.0).in_disjunct(d))
            .expect("fixture");
    }

    (master, sub)
}

/// Indices of [`quadratic_disjuncts`] variables.
pub mod quadratic {
    use crate::domain::{NlConstraintId, VarId};

    pub const X: VarId = VarId::new(0);
    pub const Z: VarId = VarId::new(1);
    pub const Y0: VarId = VarId::new(2);
    pub const Y1: VarId = VarId::new(3);

    pub const D0_X_MIN: NlConstraintId = NlConstraintId::new(0);
    pub const D0_EPIGRAPH: NlConstraintId = NlConstraintId::new(1);
    pub const D1_X_MAX: NlConstraintId = NlConstraintId::new(2);
    pub const D1_EPIGRAPH: NlConstraintId = NlConstraintId::new(3);
}

/// Two-disjunct program with convex quadratic epigraphs:
///
/// ```text
/// min z
///   [y0]  x >= 2,  x^2 - z <= -1
///   [y1]  x <= 1,  (x - 3)^2 - z <= -2
///   y0 + y1 = 1,  x in [0, 4],  z in [0, 100]
/// ```
///
/// Optimum `z = 5` at `x = 2` in the first disjunct; the second disjunct
/// costs `6`. The master starts from the big-M reformulation of the linear
/// disjunct constraints only. Solve the subproblem with
/// [`QuadraticDisjunctsNlp`].
pub fn quadratic_disjuncts(maximize: bool) -> (MasterModel, SubproblemModel) {
    use quadratic::{X, Y0, Y1, Z};

    let sense = if maximize { Sense::Maximize } else { Sense::Minimize };
    let objective = if maximize {
        LinearExpr::var(Z).scaled(-1.0)
    } else {
        LinearExpr::var(Z)
    };

    let mut master = MasterModel::new();
    master.add_variable(Variable::continuous("x", VariableBounds::bounded(0.0, 4.0)));
    master.add_variable(Variable::continuous("z", VariableBounds::bounded(0.0, 100.0)));
    master.add_variable(Variable::binary("y0"));
    master.add_variable(Variable::binary("y1"));
    for row in [
        LinearConstraint::eq("one_disjunct", LinearExpr::from_terms([(Y0, 1.0), (Y1, 1.0)]), 1.0),
        // x >= 2 y0
        LinearConstraint::geq("d0_x_min", LinearExpr::from_terms([(X, 1.0), (Y0, -2.0)]), 0.0),
        // x <= 1 + 3 (1 - y1)
        LinearConstraint::leq("d1_x_max", LinearExpr::from_terms([(X, 1.0), (Y1, 3.0)]), 4.0),
    ] {
        master.add_constraint(row).expect("fixture");
    }
    master
        .set_objective(Objective::new("cost", objective, sense))
        .expect("fixture");

    let mut sub = SubproblemModel::new(sense);
    sub.add_variable(Variable::continuous("x", VariableBounds::bounded(0.0, 4.0)).with_value(0.5));
    sub.add_variable(Variable::continuous("z", VariableBounds::bounded(0.0, 100.0)));
    sub.add_variable(Variable::binary("y0"));
    sub.add_variable(Variable::binary("y1"));
    let d0 = sub.add_disjunct(Disjunct::new("d0", Y0)).expect("fixture");
    let d1 = sub.add_disjunct(Disjunct::new("d1", Y1)).expect("fixture");
    for constraint in [
        NonlinearConstraint::geq("d0_x_min", 2.0).in_disjunct(d0),
        NonlinearConstraint::leq("d0_epigraph", -1.0).in_disjunct(d0),
        NonlinearConstraint::leq("d1_x_max", 1.0).in_disjunct(d1),
        NonlinearConstraint::leq("d1_epigraph", -2.0).in_disjunct(d1),
    ] {
        sub.add_constraint(constraint).expect("fixture");
    }

    (master, sub)
}

/// Closed-form subproblem solver for [`quadratic_disjuncts`].
///
/// Reports the objective in the model's sense (`z`, or `-z` when maximizing
/// `-z`) with gradients of every active constraint.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuadraticDisjunctsNlp;

impl QuadraticDisjunctsNlp {
    fn linearization(constraint: NlConstraintId, value: f64, gradient: Vec<(VarId, f64)>) -> ConstraintLinearization {
        ConstraintLinearization {
            constraint,
            value,
            gradient,
            dual: None,
        }
    }
}

impl NlpSolver for QuadraticDisjunctsNlp {
    fn name(&self) -> &'static str {
        "quadratic-disjuncts"
    }

    fn solve_nlp(&self, model: &SubproblemModel, _options: &SolveOptions) -> Result<NlpSolution> {
        use quadratic::{D0_EPIGRAPH, D0_X_MIN, D1_EPIGRAPH, D1_X_MAX, X, Y0, Y1, Z};

        let assignment = fixed_assignment(model);
        let (x, z, linearizations) = match (assignment.get(Y0), assignment.get(Y1)) {
            (Some(true), Some(false)) => {
                let (x, z) = (2.0, 5.0);
                (
                    x,
                    z,
                    vec![
                        Self::linearization(D0_X_MIN, x, vec![(X, 1.0)]),
                        Self::linearization(D0_EPIGRAPH, x * x - z, vec![(X, 2.0 * x), (Z, -1.0)]),
                    ],
                )
            }
            (Some(false), Some(true)) => {
                let (x, z) = (1.0, 6.0);
                (
                    x,
                    z,
                    vec![
                        Self::linearization(D1_X_MAX, x, vec![(X, 1.0)]),
                        Self::linearization(
                            D1_EPIGRAPH,
                            (x - 3.0) * (x - 3.0) - z,
                            vec![(X, 2.0 * (x - 3.0)), (Z, -1.0)],
                        ),
                    ],
                )
            }
            _ => return Ok(NlpSolution::with_status(NlpStatus::Infeasible)),
        };

        let objective = match model.sense() {
            Sense::Minimize => z,
            Sense::Maximize => -z,
        };
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        Ok(NlpSolution {
            status: NlpStatus::Optimal,
            objective,
            values: vec![
                x,
                z,
                flag(assignment.get(Y0) == Some(true)),
                flag(assignment.get(Y1) == Some(true)),
            ],
            linearizations,
        })
    }
}

/// Whether `values` satisfies every constraint of [`quadratic_disjuncts`]
/// under the disjunct its indicators select.
pub fn quadratic_point_is_feasible(values: &[f64], tol: f64) -> bool {
    let [x, z, y0, y1] = values else {
        return false;
    };
    let (x, z) = (*x, *z);
    if (y0 + y1 - 1.0).abs() > tol || !(0.0..=4.0).contains(&x) {
        return false;
    }
    if *y0 >= 0.5 {
        x >= 2.0 - tol && x * x - z <= -1.0 + tol
    } else {
        x <= 1.0 + tol && (x - 3.0) * (x - 3.0) - z <= -2.0 + tol
    }
}
