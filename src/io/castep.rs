//! Extraction of convergence data from CASTEP `.castep` logs.
//!
//! Everything this crate knows about the log layout lives in this file: the
//! marker each quantity is found by and the whitespace-delimited field its
//! value and tolerance sit in. A BFGS iteration of a cell optimisation
//! reports lines such as
//!
//! ```text
//!  BFGS: finished iteration     1 with enthalpy= -8.65432141E+002 eV
//! |  dE/ion   |   1.234567E-003 |   2.000000E-005 |         eV | No  | <-- BFGS
//!                        Current cell volume =            163.284210 A**3
//! ```

use crate::core::quantity::{Quantity, Series};
use crate::error::CastepError;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Phrase written by the optimiser when all of its criteria were met.
pub const COMPLETION_PHRASE: &str = "BFGS: Geometry optimization completed successfully.";

/// Where a quantity is found in the log. Field numbers are 1-based.
#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    marker: &'static str,
    value_field: usize,
    tolerance_field: Option<usize>,
    /// Keep every `stride`-th extracted value, starting with the first.
    stride: usize,
}

fn field_spec(quantity: Quantity) -> FieldSpec {
    match quantity {
        Quantity::Enthalpy => FieldSpec {
            marker: "BFGS: finished iteration",
            value_field: 7,
            tolerance_field: None,
            stride: 1,
        },
        // Volume is reported twice per iteration.
        Quantity::CellVolume => FieldSpec {
            marker: "Current cell volume",
            value_field: 5,
            tolerance_field: None,
            stride: 2,
        },
        Quantity::EnergyChange => FieldSpec {
            marker: "dE/ion",
            value_field: 4,
            tolerance_field: Some(6),
            stride: 1,
        },
        Quantity::MaxForce => FieldSpec {
            marker: "|F|max",
            value_field: 4,
            tolerance_field: Some(6),
            stride: 1,
        },
        Quantity::MaxDisplacement => FieldSpec {
            marker: "|dR|max",
            value_field: 4,
            tolerance_field: Some(6),
            stride: 1,
        },
        Quantity::MaxStress => FieldSpec {
            marker: "Smax",
            value_field: 4,
            tolerance_field: Some(6),
            stride: 1,
        },
    }
}

/// An in-memory `.castep` log.
#[derive(Debug, Clone)]
pub struct CastepLog {
    contents: String,
}

impl CastepLog {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Could not read CASTEP file: {:?}", path))?;
        Ok(Self { contents })
    }

    pub fn from_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    /// Lines containing `marker`, with their 1-based line numbers.
    fn matching_lines<'a>(&'a self, marker: &'a str) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        self.contents
            .lines()
            .enumerate()
            .filter(move |(_, line)| line.contains(marker))
            .map(|(i, line)| (i + 1, line))
    }

    /// Values of `quantity` in file order.
    ///
    /// A matching line that is too short to have the field contributes
    /// nothing; a field that is present but not a number is an error.
    /// Quantities reported more than once per iteration are thinned after
    /// the short lines are dropped.
    pub fn series(&self, quantity: Quantity) -> Result<Series, CastepError> {
        let spec = field_spec(quantity);
        let mut values = Vec::new();

        for (line_no, line) in self.matching_lines(spec.marker) {
            if let Some(value) = field(line, spec.value_field) {
                values.push(parse_value(quantity, line_no, value)?);
            }
        }

        // Stride over the extracted values, not the matching lines.
        let values = values.into_iter().step_by(spec.stride).collect();
        Ok(Series::new(quantity, values))
    }

    /// Tolerance of `quantity` as reported on its first matching line.
    ///
    /// Returns `Ok(None)` for quantities the optimiser has no criterion for.
    pub fn tolerance(&self, quantity: Quantity) -> Result<Option<f64>, CastepError> {
        let spec = field_spec(quantity);
        let Some(tolerance_field) = spec.tolerance_field else {
            return Ok(None);
        };

        let (line_no, value) = self
            .matching_lines(spec.marker)
            .find_map(|(line_no, line)| field(line, tolerance_field).map(|v| (line_no, v)))
            .ok_or(CastepError::MissingTolerance(quantity.name()))?;

        parse_value(quantity, line_no, value).map(Some)
    }

    /// Whether the optimiser declared the whole run converged.
    pub fn completed(&self) -> bool {
        self.contents.contains(COMPLETION_PHRASE)
    }
}

/// 1-based whitespace-delimited field of `line`.
fn field(line: &str, n: usize) -> Option<&str> {
    line.split_whitespace().nth(n.checked_sub(1)?)
}

fn parse_value(quantity: Quantity, line: usize, value: &str) -> Result<f64, CastepError> {
    value.parse::<f64>().map_err(|_| CastepError::MalformedField {
        quantity: quantity.name(),
        line,
        value: value.to_string(),
    })
}
