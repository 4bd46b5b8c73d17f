//! Scripted solver doubles.
//!
//! - [`ScriptedMilpSolver`]: Pops one pre-loaded response per call.
//!   Best for: driving the loop through an exact sequence of master outcomes.
//!
//! - [`ScriptedNlpSolver`]: Answers by the discrete assignment fixed on the
//!   subproblem. Best for: enumerations where the master decides the order.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::{Assignment, MasterModel, SubproblemModel};
use crate::error::{Result, SolverError};
use crate::port::{
    ConstraintLinearization, MilpSolution, MilpSolver, MilpStatus, NlpSolution, NlpSolver,
    NlpStatus, SolveOptions,
};

// ---------------------------------------------------------------------------
// ScriptedMilpSolver
// ---------------------------------------------------------------------------

enum MilpResponse {
    /// Values are padded with zeros to the model's size at call time.
    Padded(f64, Vec<f64>),
    Exact(f64, Vec<f64>),
    /// Stopped on a limit with a feasible point, padded like `Padded`.
    Limited(f64, Vec<f64>),
    Status(MilpStatus),
    Delayed(Duration, MilpStatus),
    Fail(String),
}

/// A MILP double returning pre-loaded responses in order.
///
/// Reports [`MilpStatus::Infeasible`] once the script is exhausted.
pub struct ScriptedMilpSolver {
    responses: Mutex<VecDeque<MilpResponse>>,
    call_count: Arc<AtomicU32>,
}

impl ScriptedMilpSolver {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            call_count: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Optimal solution with the given leading values; slacks read as zero.
    pub fn optimal(self, objective: f64, values: Vec<f64>) -> Self {
        self.push(MilpResponse::Padded(objective, values))
    }

    /// Optimal solution with exactly these values, however many there are.
    pub fn exact(self, objective: f64, values: Vec<f64>) -> Self {
        self.push(MilpResponse::Exact(objective, values))
    }

    /// Stopped on its time limit with an unproven feasible point.
    pub fn limited(self, objective: f64, values: Vec<f64>) -> Self {
        self.push(MilpResponse::Limited(objective, values))
    }

    pub fn status(self, status: MilpStatus) -> Self {
        self.push(MilpResponse::Status(status))
    }

    /// Blocks for `delay` before reporting `status`.
    pub fn status_after(self, delay: Duration, status: MilpStatus) -> Self {
        self.push(MilpResponse::Delayed(delay, status))
    }

    /// Adapter failure (`Err`) on this call.
    pub fn failing(self, message: impl Into<String>) -> Self {
        self.push(MilpResponse::Fail(message.into()))
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    fn push(mut self, response: MilpResponse) -> Self {
        self.responses
            .get_mut()
            .expect("script lock poisoned")
            .push_back(response);
        self
    }
}

impl Default for ScriptedMilpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MilpSolver for ScriptedMilpSolver {
    fn name(&self) -> &'static str {
        "scripted-milp"
    }

    fn solve_milp(&self, model: &MasterModel, _options: &SolveOptions) -> Result<MilpSolution> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let next = self
            .responses
            .lock()
            .expect("script lock poisoned")
            .pop_front();
        match next {
            None => Ok(MilpSolution::with_status(MilpStatus::Infeasible)),
            Some(MilpResponse::Padded(objective, mut values)) => {
                values.resize(model.num_variables().max(values.len()), 0.0);
                Ok(MilpSolution {
                    status: MilpStatus::Optimal,
                    objective,
                    values,
                })
            }
            Some(MilpResponse::Exact(objective, values)) => Ok(MilpSolution {
                status: MilpStatus::Optimal,
                objective,
                values,
            }),
            Some(MilpResponse::Limited(objective, mut values)) => {
                values.resize(model.num_variables().max(values.len()), 0.0);
                Ok(MilpSolution {
                    status: MilpStatus::TimeLimit,
                    objective,
                    values,
                })
            }
            Some(MilpResponse::Status(status)) => Ok(MilpSolution::with_status(status)),
            Some(MilpResponse::Delayed(delay, status)) => {
                std::thread::sleep(delay);
                Ok(MilpSolution::with_status(status))
            }
            Some(MilpResponse::Fail(message)) => Err(SolverError::new(self.name(), message).into()),
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedNlpSolver
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum NlpResponse {
    Feasible {
        objective: f64,
        values: Vec<f64>,
        linearizations: Vec<ConstraintLinearization>,
    },
    Status(NlpStatus),
    Fail(String),
}

/// An NLP double keyed by the assignment of the fixed binary variables.
///
/// Unscripted assignments report [`NlpStatus::Infeasible`]. Every call is
/// recorded with the assignment it saw.
pub struct ScriptedNlpSolver {
    responses: HashMap<Assignment, NlpResponse>,
    calls: Arc<Mutex<Vec<Assignment>>>,
}

impl ScriptedNlpSolver {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Feasible with no linearizations.
    pub fn feasible(self, assignment: &Assignment, objective: f64, values: Vec<f64>) -> Self {
        self.feasible_with(assignment, objective, values, Vec::new())
    }

    pub fn feasible_with(
        mut self,
        assignment: &Assignment,
        objective: f64,
        values: Vec<f64>,
        linearizations: Vec<ConstraintLinearization>,
    ) -> Self {
        self.responses.insert(
            assignment.clone(),
            NlpResponse::Feasible {
                objective,
                values,
                linearizations,
            },
        );
        self
    }

    pub fn status(mut self, assignment: &Assignment, status: NlpStatus) -> Self {
        self.responses
            .insert(assignment.clone(), NlpResponse::Status(status));
        self
    }

    /// Adapter failure (`Err`) for this assignment.
    pub fn failing(mut self, assignment: &Assignment, message: impl Into<String>) -> Self {
        self.responses
            .insert(assignment.clone(), NlpResponse::Fail(message.into()));
        self
    }

    /// Assignments seen so far, in call order.
    pub fn calls(&self) -> Vec<Assignment> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    /// Shared handle on the call log.
    pub fn call_log(&self) -> Arc<Mutex<Vec<Assignment>>> {
        Arc::clone(&self.calls)
    }
}

impl Default for ScriptedNlpSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Assignment of the binary variables currently fixed on `model`.
pub fn fixed_assignment(model: &SubproblemModel) -> Assignment {
    model
        .binary_variables()
        .filter_map(|var| {
            let variable = model.variable(var).ok()?;
            variable
                .fixed
                .then(|| (var, variable.value.unwrap_or(0.0) >= 0.5))
        })
        .collect()
}

impl NlpSolver for ScriptedNlpSolver {
    fn name(&self) -> &'static str {
        "scripted-nlp"
    }

    fn solve_nlp(&self, model: &SubproblemModel, _options: &SolveOptions) -> Result<NlpSolution> {
        let assignment = fixed_assignment(model);
        self.calls
            .lock()
            .expect("call log poisoned")
            .push(assignment.clone());

        match self.responses.get(&assignment).cloned() {
            None => Ok(NlpSolution::with_status(NlpStatus::Infeasible)),
            Some(NlpResponse::Feasible {
                objective,
                values,
                linearizations,
            }) => Ok(NlpSolution {
                status: NlpStatus::Optimal,
                objective,
                values,
                linearizations,
            }),
            Some(NlpResponse::Status(status)) => Ok(NlpSolution::with_status(status)),
            Some(NlpResponse::Fail(message)) => Err(SolverError::new(self.name(), message).into()),
        }
    }
}
