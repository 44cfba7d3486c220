use crate::core::quantity::{Quantity, Series, Verdict};
use crate::error::CastepError;
use crate::io::castep::CastepLog;
use std::fmt;

/// A toleranced quantity at the end of the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Criterion {
    pub quantity: Quantity,
    pub final_value: f64,
    pub tolerance: f64,
    pub verdict: Verdict,
}

/// Everything the convergence figure shows.
#[derive(Debug, Clone)]
pub struct ConvergenceReport {
    /// One series per panel, in [`Quantity::ALL`] order.
    pub series: Vec<Series>,
    pub criteria: Vec<Criterion>,
    /// Set by the optimiser's completion phrase, not by `criteria`.
    pub overall_converged: bool,
    pub iterations: usize,
}

impl ConvergenceReport {
    pub fn from_log(log: &CastepLog) -> Result<Self, CastepError> {
        let series = Quantity::ALL
            .iter()
            .map(|&q| log.series(q))
            .collect::<Result<Vec<_>, _>>()?;

        let mut criteria = Vec::with_capacity(Quantity::TOLERANCED.len());
        for quantity in Quantity::TOLERANCED {
            let tolerance = log
                .tolerance(quantity)?
                .ok_or(CastepError::MissingTolerance(quantity.name()))?;
            let final_value = series[quantity.index()].last()?;
            criteria.push(Criterion {
                quantity,
                final_value,
                tolerance,
                verdict: Verdict::from_final(final_value, tolerance),
            });
        }

        // The step axis is that of the energy change; volume keeps its own.
        let iterations = series[Quantity::EnergyChange.index()].len();
        for s in &series {
            if s.quantity != Quantity::CellVolume && s.len() != iterations {
                return Err(CastepError::SeriesLengthMismatch {
                    quantity: s.quantity.name(),
                    expected: iterations,
                    found: s.len(),
                });
            }
        }
        series[Quantity::CellVolume.index()].last()?;

        Ok(Self {
            series,
            criteria,
            overall_converged: log.completed(),
            iterations,
        })
    }

    pub fn series(&self, quantity: Quantity) -> &Series {
        &self.series[quantity.index()]
    }

    pub fn criterion(&self, quantity: Quantity) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.quantity == quantity)
    }
}

impl fmt::Display for ConvergenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Castep Cell Optimization ---")?;
        for quantity in Quantity::ALL {
            let series = self.series(quantity);
            let precision = quantity.precision();
            write!(f, "• {:<17}", format!("{}:", quantity))?;
            match series.values.last() {
                Some(v) => write!(f, "Final = {:>14.*}", precision, v)?,
                None => write!(f, "Final = {:>14}", "-")?,
            }
            if let Some(c) = self.criterion(quantity) {
                write!(f, "  Tol = {:.*}  {}", precision, c.tolerance, c.verdict)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Iterations: {}", self.iterations)?;
        write!(
            f,
            "Overall Convergence: {}",
            if self.overall_converged { "Yes" } else { "No" }
        )
    }
}
