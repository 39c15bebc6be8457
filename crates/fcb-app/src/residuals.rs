//! Initial residuals scraped from a running solver's log.

use std::collections::BTreeMap;

use fcb_core::Real;
use serde::Serialize;

/// Initial residuals of one time step (or iteration, for steady solvers).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualSample {
    pub time: Real,
    pub residuals: BTreeMap<String, Real>,
}

/// Line-by-line parser for solver output.
///
/// A `Time = t` line opens a step; within a step only the first
/// `Solving for X, Initial residual = r` line per variable counts, later
/// corrector loops are ignored.
#[derive(Debug, Default)]
pub struct ResidualTracker {
    current: Option<ResidualSample>,
    history: Vec<ResidualSample>,
}

fn parse_time(line: &str) -> Option<Real> {
    line.trim().strip_prefix("Time = ")?.trim().parse().ok()
}

fn parse_residual(line: &str) -> Option<(&str, Real)> {
    let rest = line.split("Solving for ").nth(1)?;
    let variable = rest.split(',').next()?.trim();
    let value = rest
        .split("Initial residual = ")
        .nth(1)?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()?;
    Some((variable, value))
}

impl ResidualTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one log line. Returns the previous step once a new one starts.
    pub fn feed(&mut self, line: &str) -> Option<ResidualSample> {
        if let Some(time) = parse_time(line) {
            let finished = self.current.replace(ResidualSample {
                time,
                residuals: BTreeMap::new(),
            });
            return finished.inspect(|s| self.history.push(s.clone()));
        }
        if let (Some(step), Some((variable, value))) = (self.current.as_mut(), parse_residual(line)) {
            step.residuals.entry(variable.to_string()).or_insert(value);
        }
        None
    }

    /// Close the open step, if any, at end of output.
    pub fn finish(&mut self) -> Option<ResidualSample> {
        let last = self.current.take()?;
        self.history.push(last.clone());
        Some(last)
    }

    pub fn history(&self) -> &[ResidualSample] {
        &self.history
    }

    /// Residual series of one variable over the completed steps.
    pub fn series(&self, variable: &str) -> Vec<(Real, Real)> {
        self.history
            .iter()
            .filter_map(|s| s.residuals.get(variable).map(|r| (s.time, *r)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
Starting time loop

Time = 1

smoothSolver:  Solving for Ux, Initial residual = 1, Final residual = 0.0539, No Iterations 1
smoothSolver:  Solving for Uy, Initial residual = 0.5, Final residual = 0.0265, No Iterations 1
GAMG:  Solving for p, Initial residual = 1, Final residual = 0.0087, No Iterations 5
GAMG:  Solving for p, Initial residual = 0.2, Final residual = 0.001, No Iterations 3
time step continuity errors : sum local = 1.7e-05, global = 3.1e-19, cumulative = 3.1e-19
ExecutionTime = 0.04 s  ClockTime = 0 s

Time = 2

smoothSolver:  Solving for Ux, Initial residual = 0.25, Final residual = 0.012, No Iterations 1
GAMG:  Solving for p, Initial residual = 0.4, Final residual = 0.003, No Iterations 4
ExecutionTime = 0.05 s  ClockTime = 0 s
";

    #[test]
    fn first_residual_per_step() {
        let mut tracker = ResidualTracker::new();
        let completed: Vec<_> = LOG.lines().filter_map(|l| tracker.feed(l)).collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].time, 1.0);
        assert_eq!(completed[0].residuals["p"], 1.0);
        assert_eq!(completed[0].residuals["Uy"], 0.5);

        let last = tracker.finish().unwrap();
        assert_eq!(last.time, 2.0);
        assert!(!last.residuals.contains_key("Uy"));
        assert_eq!(tracker.series("Ux"), vec![(1.0, 1.0), (2.0, 0.25)]);
        assert_eq!(tracker.series("p"), vec![(1.0, 1.0), (2.0, 0.4)]);
        assert!(tracker.finish().is_none());
    }

    #[test]
    fn lines_before_first_step_are_ignored() {
        let mut tracker = ResidualTracker::new();
        assert!(tracker
            .feed("DILUPBiCG:  Solving for Ux, Initial residual = 1, Final residual = 0, No Iterations 0")
            .is_none());
        assert!(tracker.feed("ExecutionTime = 1 s").is_none());
        assert!(tracker.finish().is_none());
    }

    #[test]
    fn malformed_residual_line() {
        assert_eq!(parse_residual("Solving for Ux, Initial residual = nan?, Final"), None);
        assert_eq!(
            parse_residual("Solving for k, Initial residual = 0.003, Final residual = 1e-05"),
            Some(("k", 0.003))
        );
        assert_eq!(parse_time("Time = 0.005"), Some(0.005));
        assert_eq!(parse_time("ExecutionTime = 0.005 s"), None);
    }
}
