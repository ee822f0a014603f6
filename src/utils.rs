//! Utility functions and structures for drivers of the genetic algorithm.

use std::time::Duration;

use crate::solution::Solution;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Relative gap of `found` above `reference`, in percent.
pub fn gap_percent(found: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return 0.0;
    }
    (found - reference) / reference * 100.0
}

/// Summary of a finished run.
pub struct RunStatistics {
    pub generations: usize,
    pub runtime: Duration,
    pub best_fitness: f64,
    pub best_distance: f64,
    pub best_is_feasible: bool,
    pub best_routes: usize,
    pub reference_distance: Option<f64>,
}

impl RunStatistics {
    pub fn new(
        generations: usize,
        runtime: Duration,
        best: &Solution,
        reference_distance: Option<f64>,
    ) -> Self {
        RunStatistics {
            generations,
            runtime,
            best_fitness: best.fitness,
            best_distance: best.distance,
            best_is_feasible: best.is_feasible,
            best_routes: best.get_route_count(),
            reference_distance,
        }
    }

    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        let mut text = format!(
            "Search Statistics:
- Generations: {}
- Runtime: {}
- Best Fitness: {:.2}
- Best Distance: {:.2}
- Best Feasible: {}
- Best Routes: {}",
            self.generations,
            format_duration(self.runtime),
            self.best_fitness,
            self.best_distance,
            self.best_is_feasible,
            self.best_routes,
        );

        if let Some(reference) = self.reference_distance {
            text.push_str(&format!(
                "\n- Reference Distance: {:.2}\n- Gap: {:.2}%",
                reference,
                gap_percent(self.best_distance, reference)
            ));
        }

        text
    }
}
