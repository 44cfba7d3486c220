use crate::error::CastepError;
use crate::plot::Viewer;
use anyhow::{anyhow, Context, Result};
use log::debug;
use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Environment variable naming the program used to show the figure.
pub const VIEWER_ENV: &str = "CASTEP_VIEWER";

/// Openers tried in order when no viewer is configured.
const FALLBACK_VIEWERS: [&str; 2] = ["xdg-open", "open"];

/// Opens images with an external program and waits for it to return.
///
/// Without an explicit program the opener is looked up when an image is
/// shown, so saving a figure never depends on one being installed.
#[derive(Debug, Clone, Default)]
pub struct SystemViewer {
    program: Option<PathBuf>,
}

impl SystemViewer {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    /// `$CASTEP_VIEWER` if set, otherwise the first opener found on `PATH`.
    pub fn locate_program() -> Result<PathBuf> {
        if let Ok(program) = env::var(VIEWER_ENV) {
            return which::which(&program).with_context(|| {
                format!("{} is set to '{}' but it was not found", VIEWER_ENV, program)
            });
        }

        FALLBACK_VIEWERS
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| CastepError::NoViewer.into())
    }
}

impl Viewer for SystemViewer {
    fn show(&self, path: &Path) -> Result<()> {
        let program = match &self.program {
            Some(program) => program.clone(),
            None => Self::locate_program()?,
        };

        debug!("Opening {:?} with {:?}", path, program);
        let status = Command::new(&program)
            .arg(path)
            .stdin(Stdio::null())
            .status()
            .with_context(|| format!("Failed to spawn {:?}", program))?;

        if !status.success() {
            return Err(anyhow!("Viewer {:?} exited with {}", program, status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_viewer_is_reported() {
        let Ok(program) = which::which("false") else {
            return;
        };
        let viewer = SystemViewer::with_program(program);
        let err = viewer.show(Path::new("plot.png")).unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let viewer = SystemViewer::with_program("/nonexistent/viewer-binary");
        let err = viewer.show(Path::new("plot.png")).unwrap_err();
        assert!(err.to_string().contains("Failed to spawn"));
    }
}
