use crate::engine::config::{AnnealingConfig, ConfigError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Number of trailing temperature stages compared by the convergence test.
const CONVERGENCE_WINDOW: usize = 10;
/// Strength of the step size adaptation to the acceptance ratio.
const ADAPTATION_STRENGTH: f64 = 2.0;
const TARGET_ACCEPTANCE_HIGH: f64 = 0.6;
const TARGET_ACCEPTANCE_LOW: f64 = 0.4;
const MIN_STEP_SCALE: f64 = 1e-3;
const MAX_STEP_SCALE: f64 = 1e4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnealingStatus {
    /// The best cost stopped changing before the stage budget ran out.
    Converged,
    /// Every temperature stage was used. The result is still the best state seen.
    MaxIterationsReached,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnealingOutcome {
    pub best_state: Vec<f64>,
    pub best_cost: f64,
    pub status: AnnealingStatus,
    /// Number of completed temperature stages.
    pub cooling_iterations: usize,
    /// Number of cost function calls, including the initial state.
    pub cost_evaluations: usize,
}

/// Simulated-annealing minimiser.
///
/// Each call to [`anneal`](Self::anneal) starts a fresh random stream from the
/// configured seed, so runs are reproducible and independent of each other and
/// of any other thread.
#[derive(Debug, Clone)]
pub struct SimulatedAnnealing {
    config: AnnealingConfig,
}

impl SimulatedAnnealing {
    pub fn new(config: AnnealingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Minimises `cost` starting from `initial_state`.
    ///
    /// Every temperature stage draws a fixed number of candidates around the
    /// current state and accepts them with the Metropolis criterion. The best
    /// state is tracked over every evaluated candidate, accepted or not.
    ///
    /// # Arguments
    ///
    /// * `initial_state` - Starting point; its length fixes the dimension.
    /// * `cost` - Function to minimise.
    ///
    /// # Return
    ///
    /// The lowest-cost state observed together with the termination status.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `cost`; the run is not resumed.
    pub fn anneal<F, E>(&self, initial_state: &[f64], mut cost: F) -> Result<AnnealingOutcome, E>
    where
        F: FnMut(&[f64]) -> Result<f64, E>,
    {
        let config = &self.config;
        let dimension = initial_state.len();
        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut current = initial_state.to_vec();
        let mut current_cost = cost(&current)?;
        let mut best = current.clone();
        let mut best_cost = current_cost;
        let mut cost_evaluations = 1;

        if dimension == 0 {
            return Ok(AnnealingOutcome {
                best_state: best,
                best_cost,
                status: AnnealingStatus::Converged,
                cooling_iterations: 0,
                cost_evaluations,
            });
        }

        let mut step_scales = vec![1.0; dimension];
        let mut candidate = vec![0.0; dimension];
        let mut best_history = Vec::with_capacity(config.max_cooling_iterations);
        let mut temperature = config.initial_temperature;
        let mut status = AnnealingStatus::MaxIterationsReached;
        let mut cooling_iterations = 0;

        for stage in 0..config.max_cooling_iterations {
            let mut trials = vec![0usize; dimension];
            let mut acceptances = vec![0usize; dimension];

            for sample in 0..config.cost_samples_per_temperature {
                candidate.copy_from_slice(&current);
                let perturbed = if config.adaptive_candidate_generation {
                    let d = (stage * config.cost_samples_per_temperature + sample) % dimension;
                    candidate[d] +=
                        config.step_length_factor * step_scales[d] * rng.gen_range(-1.0..1.0);
                    Some(d)
                } else {
                    for x in candidate.iter_mut() {
                        *x += config.step_length_factor * rng.gen_range(-1.0..1.0);
                    }
                    None
                };

                let candidate_cost = cost(&candidate)?;
                cost_evaluations += 1;

                if candidate_cost < best_cost {
                    best.copy_from_slice(&candidate);
                    best_cost = candidate_cost;
                }

                let delta = candidate_cost - current_cost;
                let accepted = delta < 0.0
                    || rng.r#gen::<f64>() < (-delta / (config.xi * temperature)).exp();

                if let Some(d) = perturbed {
                    trials[d] += 1;
                    if accepted {
                        acceptances[d] += 1;
                    }
                }
                if accepted {
                    current.copy_from_slice(&candidate);
                    current_cost = candidate_cost;
                }
            }

            if config.adaptive_candidate_generation {
                for d in 0..dimension {
                    if trials[d] > 0 {
                        let ratio = acceptances[d] as f64 / trials[d] as f64;
                        step_scales[d] = adapt_step_scale(step_scales[d], ratio);
                    }
                }
            }

            temperature *= config.cooling_factor;
            cooling_iterations = stage + 1;
            best_history.push(best_cost);

            trace!(
                stage,
                temperature,
                current_cost,
                best_cost,
                "Annealing stage completed."
            );

            if has_converged(&best_history, config.convergence_rel_tol) {
                status = AnnealingStatus::Converged;
                break;
            }
        }

        Ok(AnnealingOutcome {
            best_state: best,
            best_cost,
            status,
            cooling_iterations,
            cost_evaluations,
        })
    }
}

fn adapt_step_scale(scale: f64, acceptance_ratio: f64) -> f64 {
    let adapted = if acceptance_ratio > TARGET_ACCEPTANCE_HIGH {
        scale
            * (1.0
                + ADAPTATION_STRENGTH * (acceptance_ratio - TARGET_ACCEPTANCE_HIGH)
                    / TARGET_ACCEPTANCE_LOW)
    } else if acceptance_ratio < TARGET_ACCEPTANCE_LOW {
        scale
            / (1.0
                + ADAPTATION_STRENGTH * (TARGET_ACCEPTANCE_LOW - acceptance_ratio)
                    / TARGET_ACCEPTANCE_LOW)
    } else {
        scale
    };
    adapted.clamp(MIN_STEP_SCALE, MAX_STEP_SCALE)
}

fn has_converged(best_history: &[f64], tolerance: f64) -> bool {
    if best_history.len() <= CONVERGENCE_WINDOW {
        return false;
    }
    let latest = best_history[best_history.len() - 1];
    let reference = best_history[best_history.len() - 1 - CONVERGENCE_WINDOW];
    let scale = latest.abs().max(reference.abs());
    if scale == 0.0 {
        return true;
    }
    (latest - reference).abs() / scale < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::AnnealingConfigBuilder;
    use std::convert::Infallible;

    fn quadratic(state: &[f64]) -> Result<f64, Infallible> {
        Ok((state[0] - 1.0).powi(2) + (state[1] + 2.0).powi(2))
    }

    fn exploring_config() -> AnnealingConfig {
        AnnealingConfigBuilder::new()
            .seed(42)
            .max_cooling_iterations(400)
            .cost_samples_per_temperature(20)
            .initial_temperature(1.0)
            .xi(1.0)
            .cooling_factor(0.97)
            .step_length_factor(0.1)
            .convergence_rel_tol(0.0)
            .build()
            .unwrap()
    }

    #[test]
    fn identical_configuration_reproduces_bit_identical_results() {
        let annealer = SimulatedAnnealing::new(exploring_config()).unwrap();
        let first = annealer.anneal(&[0.0, 0.0], quadratic).unwrap();
        let second = annealer.anneal(&[0.0, 0.0], quadratic).unwrap();

        assert_eq!(first.best_cost.to_bits(), second.best_cost.to_bits());
        for (a, b) in first.best_state.iter().zip(&second.best_state) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        assert_eq!(first, second);
    }

    #[test]
    fn finds_minimum_of_quadratic_bowl() {
        let annealer = SimulatedAnnealing::new(exploring_config()).unwrap();
        let outcome = annealer.anneal(&[0.0, 0.0], quadratic).unwrap();

        assert!(outcome.best_cost < 1e-2, "best cost {}", outcome.best_cost);
        assert!((outcome.best_state[0] - 1.0).abs() < 0.1);
        assert!((outcome.best_state[1] + 2.0).abs() < 0.1);
    }

    #[test]
    fn fixed_step_candidates_also_descend() {
        let config = AnnealingConfig {
            adaptive_candidate_generation: false,
            ..exploring_config()
        };
        let annealer = SimulatedAnnealing::new(config).unwrap();
        let outcome = annealer.anneal(&[0.0, 0.0], quadratic).unwrap();

        assert!(outcome.best_cost < 5.0);
        assert!(outcome.best_cost < 0.1, "best cost {}", outcome.best_cost);
    }

    #[test]
    fn best_cost_never_exceeds_initial_cost() {
        let annealer = SimulatedAnnealing::new(exploring_config()).unwrap();
        let outcome = annealer.anneal(&[1.0, -2.0], quadratic).unwrap();
        assert_eq!(outcome.best_cost, 0.0);
        assert_eq!(outcome.best_state, vec![1.0, -2.0]);
    }

    #[test]
    fn exhausting_the_stage_budget_is_reported_as_status() {
        let config = AnnealingConfig {
            max_cooling_iterations: 3,
            cost_samples_per_temperature: 4,
            ..exploring_config()
        };
        let annealer = SimulatedAnnealing::new(config).unwrap();
        let outcome = annealer.anneal(&[5.0, 5.0], quadratic).unwrap();

        assert_eq!(outcome.status, AnnealingStatus::MaxIterationsReached);
        assert_eq!(outcome.cooling_iterations, 3);
        assert_eq!(outcome.cost_evaluations, 1 + 3 * 4);
    }

    #[test]
    fn constant_cost_converges_after_one_window() {
        let config = AnnealingConfig {
            convergence_rel_tol: 1e-3,
            ..exploring_config()
        };
        let annealer = SimulatedAnnealing::new(config).unwrap();
        let outcome = annealer
            .anneal(&[0.3, -0.7], |_| Ok::<_, Infallible>(-4.5))
            .unwrap();

        assert_eq!(outcome.status, AnnealingStatus::Converged);
        assert_eq!(outcome.best_cost, -4.5);
        assert_eq!(outcome.best_state, vec![0.3, -0.7]);
        assert_eq!(outcome.cooling_iterations, CONVERGENCE_WINDOW + 1);
    }

    #[test]
    fn cost_function_errors_abort_the_run() {
        let annealer = SimulatedAnnealing::new(exploring_config()).unwrap();
        let mut calls = 0;
        let result = annealer.anneal(&[0.0, 0.0], |state| {
            calls += 1;
            if calls == 5 {
                Err("lookup failed")
            } else {
                Ok(state[0] * state[0])
            }
        });

        assert_eq!(result, Err("lookup failed"));
        assert_eq!(calls, 5);
    }

    #[test]
    fn zero_dimensional_state_evaluates_once() {
        let annealer = SimulatedAnnealing::new(exploring_config()).unwrap();
        let outcome = annealer.anneal(&[], |_| Ok::<_, Infallible>(2.0)).unwrap();
        assert_eq!(outcome.cost_evaluations, 1);
        assert_eq!(outcome.best_cost, 2.0);
    }

    #[test]
    fn step_scale_adapts_to_acceptance_ratio() {
        assert!(adapt_step_scale(1.0, 1.0) > 1.0);
        assert!(adapt_step_scale(1.0, 0.0) < 1.0);
        assert_eq!(adapt_step_scale(1.0, 0.5), 1.0);
        assert_eq!(adapt_step_scale(MAX_STEP_SCALE, 1.0), MAX_STEP_SCALE);
    }

    #[test]
    fn convergence_needs_a_full_window() {
        let flat = vec![-1.0; CONVERGENCE_WINDOW];
        assert!(!has_converged(&flat, 1e-3));
        let flat = vec![-1.0; CONVERGENCE_WINDOW + 1];
        assert!(has_converged(&flat, 1e-3));
        assert!(!has_converged(&flat, 0.0));

        let mut improving = vec![-1.0; CONVERGENCE_WINDOW];
        improving.push(-2.0);
        assert!(!has_converged(&improving, 1e-3));
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let config = AnnealingConfig {
            cooling_factor: 1.0,
            ..AnnealingConfig::default()
        };
        assert!(SimulatedAnnealing::new(config).is_err());
    }
}
