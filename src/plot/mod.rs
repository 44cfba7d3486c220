pub mod figure;
pub mod viewer;

use crate::core::report::ConvergenceReport;
use anyhow::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub use figure::PlottersRenderer;
pub use viewer::SystemViewer;

// ============================================================================
// SEAMS
// ============================================================================

/// Draws a convergence figure into an image file.
pub trait Renderer {
    fn render(&self, report: &ConvergenceReport, path: &Path) -> Result<()>;
}

/// Puts a rendered image in front of the user.
pub trait Viewer {
    fn show(&self, path: &Path) -> Result<()>;
}

/// Where the figure ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write the PNG to this path and keep it.
    Save(PathBuf),
    /// Hand a temporary PNG to a [`Viewer`].
    Display,
}

impl OutputTarget {
    /// Saves next to `input` by default; `display` switches to the viewer.
    pub fn for_input(input: &Path, display: bool) -> Self {
        if display {
            OutputTarget::Display
        } else {
            OutputTarget::Save(plot_file_name(input))
        }
    }
}

/// `<input file name>_optimization_plot.png` in the directory of `input`.
pub fn plot_file_name(input: &Path) -> PathBuf {
    let mut name: OsString = input.file_name().map(OsString::from).unwrap_or_default();
    name.push("_optimization_plot.png");
    input.with_file_name(name)
}
