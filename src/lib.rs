// ============================================================================
// MODULE DECLARATIONS
// ============================================================================
pub mod core;
pub mod error;
pub mod io;
pub mod plot;

// ============================================================================
// RE-EXPORTS (Public API)
// ============================================================================
pub use crate::core::quantity::{Quantity, Series, Verdict};
pub use crate::core::report::{ConvergenceReport, Criterion};
pub use crate::error::CastepError;
pub use crate::io::castep::CastepLog;
pub use crate::io::discovery;
pub use crate::plot::{OutputTarget, PlottersRenderer, Renderer, SystemViewer, Viewer};

use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

// ============================================================================
// HIGH-LEVEL INTERFACE
// ============================================================================

/// Configuration for one convergence check.
#[derive(Debug, Clone)]
pub struct ConvergeConfig {
    /// The `.castep` log to analyse.
    pub input: PathBuf,
    pub target: OutputTarget,
    /// Where figures for [`OutputTarget::Display`] are written before viewing.
    /// The image is left there afterwards: openers such as `xdg-open` return
    /// before the viewer has read the file.
    pub scratch_dir: PathBuf,
}

impl ConvergeConfig {
    /// Saves next to `input` unless `display` is set.
    pub fn new(input: PathBuf, display: bool, scratch_dir: PathBuf) -> Self {
        let target = OutputTarget::for_input(&input, display);
        Self {
            input,
            target,
            scratch_dir,
        }
    }
}

/// What a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: ConvergenceReport,
    /// The saved figure, `None` when it was only displayed.
    pub saved: Option<PathBuf>,
}

/// Reads the log, renders the figure and saves or shows it.
///
/// In display mode the rendered image stays in `config.scratch_dir`.
pub fn check_convergence(
    config: &ConvergeConfig,
    renderer: &dyn Renderer,
    viewer: &dyn Viewer,
) -> Result<RunOutcome> {
    info!("Analyzing file: {:?}", config.input);
    let log = CastepLog::from_file(&config.input)?;
    let report = ConvergenceReport::from_log(&log)
        .with_context(|| format!("Could not extract convergence data from {:?}", config.input))?;

    let saved = match &config.target {
        OutputTarget::Save(path) => {
            info!("Saving plot...");
            renderer.render(&report, path)?;
            info!("Plot saved as {:?}", path);
            Some(path.clone())
        }
        OutputTarget::Display => {
            let name = plot::plot_file_name(&config.input);
            let path = config
                .scratch_dir
                .join(name.file_name().unwrap_or(name.as_os_str()));
            renderer.render(&report, &path)?;
            info!("Displaying plot...");
            viewer.show(&path)?;
            None
        }
    };

    Ok(RunOutcome { report, saved })
}
