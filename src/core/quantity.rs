use crate::error::CastepError;
use std::fmt;

// ============================================================================
// TRACKED QUANTITIES
// ============================================================================

/// A physical quantity reported once per BFGS iteration in a `.castep` log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Enthalpy at the end of each iteration (eV).
    Enthalpy,
    /// Unit cell volume (ang^3).
    CellVolume,
    /// Energy change per ion between iterations (eV).
    EnergyChange,
    /// Largest force on any ion (eV/ang).
    MaxForce,
    /// Largest ionic displacement (ang).
    MaxDisplacement,
    /// Largest stress component (GPa).
    MaxStress,
}

impl Quantity {
    /// Panel order of the convergence figure, row by row.
    pub const ALL: [Quantity; 6] = [
        Quantity::Enthalpy,
        Quantity::CellVolume,
        Quantity::EnergyChange,
        Quantity::MaxForce,
        Quantity::MaxDisplacement,
        Quantity::MaxStress,
    ];

    /// The four quantities the optimiser checks against a tolerance.
    pub const TOLERANCED: [Quantity; 4] = [
        Quantity::EnergyChange,
        Quantity::MaxForce,
        Quantity::MaxDisplacement,
        Quantity::MaxStress,
    ];

    /// Position in [`Quantity::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Quantity::Enthalpy => "Enthalpy",
            Quantity::CellVolume => "Cell Volume",
            Quantity::EnergyChange => "Energy Change",
            Quantity::MaxForce => "Max Force",
            Quantity::MaxDisplacement => "Max Displacement",
            Quantity::MaxStress => "Max Stress",
        }
    }

    /// Y-axis label including the unit.
    pub fn axis_label(self) -> &'static str {
        match self {
            Quantity::Enthalpy => "Enthalpy (eV)",
            Quantity::CellVolume => "Volume (ang^3)",
            Quantity::EnergyChange => "Delta E (eV)",
            Quantity::MaxForce => "F_max (eV/ang)",
            Quantity::MaxDisplacement => "R_max (ang)",
            Quantity::MaxStress => "S_max (GPa)",
        }
    }

    /// Decimal places used when printing the final value.
    pub fn precision(self) -> usize {
        match self {
            Quantity::Enthalpy | Quantity::CellVolume => 4,
            _ => 5,
        }
    }

    pub fn has_tolerance(self) -> bool {
        Self::TOLERANCED.contains(&self)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// SERIES
// ============================================================================

/// Values of one quantity, one per iteration, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub quantity: Quantity,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(quantity: Quantity, values: Vec<f64>) -> Self {
        Self { quantity, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Final value of the run. An empty series is an error, never a default.
    pub fn last(&self) -> Result<f64, CastepError> {
        self.values
            .last()
            .copied()
            .ok_or_else(|| CastepError::EmptySeries(self.quantity.name()))
    }

    /// `(step, value)` pairs with the step counted from zero. Steps whose
    /// value is NaN or infinite are left out.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, &v)| (i as f64, v))
            .collect()
    }

    /// Smallest and largest finite value, or `None` if there is none.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

// ============================================================================
// VERDICTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Converged,
    NotConverged,
}

impl Verdict {
    /// Strictly below the tolerance converges; equality does not.
    pub fn from_final(last: f64, tolerance: f64) -> Self {
        if last < tolerance {
            Verdict::Converged
        } else {
            Verdict::NotConverged
        }
    }

    pub fn is_converged(self) -> bool {
        self == Verdict::Converged
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Converged => f.write_str("Converged ✓"),
            Verdict::NotConverged => f.write_str("Not Converged ✗"),
        }
    }
}
