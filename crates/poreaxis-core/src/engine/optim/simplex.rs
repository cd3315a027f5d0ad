use crate::engine::config::{ConfigError, SimplexConfig};
use argmin::core::{CostFunction, Error, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;

/// Standard deviation of the vertex costs below which the simplex counts as collapsed.
const COST_SPREAD_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct SimplexOutcome {
    pub best_state: Vec<f64>,
    pub best_cost: f64,
    pub iterations: u64,
    /// Whether the vertex costs collapsed before the iteration budget ran out.
    pub converged: bool,
}

/// Local refinement with argmin's Nelder–Mead solver.
#[derive(Debug, Clone)]
pub struct SimplexRefiner {
    config: SimplexConfig,
}

impl SimplexRefiner {
    pub fn new(config: SimplexConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Minimises `problem` in the neighbourhood of `initial_state`.
    ///
    /// The initial simplex is the starting state plus one vertex shifted by the
    /// configured edge length along each coordinate axis. The result is never
    /// worse than the best vertex of that simplex.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by the cost function, unchanged, or a
    /// solver error if argmin rejects the setup.
    pub fn minimize<O>(&self, problem: O, initial_state: &[f64]) -> Result<SimplexOutcome, Error>
    where
        O: CostFunction<Param = Vec<f64>, Output = f64>,
    {
        if initial_state.is_empty() {
            let best_cost = problem.cost(&Vec::new())?;
            return Ok(SimplexOutcome {
                best_state: Vec::new(),
                best_cost,
                iterations: 0,
                converged: true,
            });
        }

        let solver = NelderMead::new(self.initial_simplex(initial_state))
            .with_sd_tolerance(COST_SPREAD_TOLERANCE)?;
        let result = Executor::new(problem, solver)
            .configure(|state| state.max_iters(self.config.max_iterations as u64))
            .run()?;

        let state = result.state();
        let best_state = state
            .get_best_param()
            .cloned()
            .ok_or_else(|| Error::msg("Nelder-Mead finished without a best vertex"))?;

        Ok(SimplexOutcome {
            best_state,
            best_cost: state.get_best_cost(),
            iterations: state.get_iter(),
            converged: matches!(
                state.get_termination_reason(),
                Some(TerminationReason::SolverConverged)
            ),
        })
    }

    fn initial_simplex(&self, initial_state: &[f64]) -> Vec<Vec<f64>> {
        let mut vertices = vec![initial_state.to_vec()];
        for d in 0..initial_state.len() {
            let mut vertex = initial_state.to_vec();
            vertex[d] += self.config.initial_shift;
            vertices.push(vertex);
        }
        vertices
    }
}
