//! Soft queries: a simulator failure means "value unavailable here", never an error.

use tanf_simulator::Simulation;

pub(crate) async fn soft(simulation: &dyn Simulation, variable: &str, year: i32) -> Option<f64> {
    match simulation.calculate(variable, year).await {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("{variable} unavailable for {year}: {err}");
            None
        }
    }
}

/// First variable of a fallback chain that the simulator can compute.
pub(crate) async fn soft_first(
    simulation: &dyn Simulation,
    variables: &[&str],
    year: i32,
) -> Option<f64> {
    for variable in variables {
        if let Some(value) = soft(simulation, variable, year).await {
            return Some(value);
        }
    }
    None
}
