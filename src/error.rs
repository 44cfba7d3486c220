use std::path::PathBuf;
use thiserror::Error;

/// Failures of the `.castep` log contract and of the output stage.
///
/// The binary reports all of these through one handler except
/// [`CastepError::NoInputFile`], which terminates with a non-zero status.
#[derive(Debug, Error)]
pub enum CastepError {
    #[error("No .castep file found in {0:?}.")]
    NoInputFile(PathBuf),

    #[error("No values found for {0} in the log.")]
    EmptySeries(&'static str),

    #[error("{0} has no finite values to plot.")]
    NonFiniteSeries(&'static str),

    #[error("No tolerance reported for {0} in the log.")]
    MissingTolerance(&'static str),

    #[error("Could not parse '{value}' on line {line} as a number for {quantity}.")]
    MalformedField {
        quantity: &'static str,
        line: usize,
        value: String,
    },

    #[error("{quantity} has {found} values but {expected} optimisation steps were found.")]
    SeriesLengthMismatch {
        quantity: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("No image viewer available; set CASTEP_VIEWER or install xdg-open.")]
    NoViewer,
}
