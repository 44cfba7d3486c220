use castep_tools::{
    check_convergence, discovery, CastepError, CastepLog, ConvergeConfig, ConvergenceReport,
    OutputTarget, Quantity, Renderer, Verdict, Viewer,
};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("sample_inputs")
        .join(name)
}

/// Writes a placeholder image and remembers where.
#[derive(Default)]
struct RecordingRenderer {
    rendered: RefCell<Vec<PathBuf>>,
}

impl Renderer for RecordingRenderer {
    fn render(&self, report: &ConvergenceReport, path: &Path) -> anyhow::Result<()> {
        fs::write(path, report.to_string())?;
        self.rendered.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingViewer {
    shown: RefCell<Vec<PathBuf>>,
}

impl Viewer for RecordingViewer {
    fn show(&self, path: &Path) -> anyhow::Result<()> {
        assert!(path.exists(), "viewer got a missing file: {:?}", path);
        self.shown.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

/// Copies a sample log into a fresh directory.
fn staged(name: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join(name);
    fs::copy(sample(name), &input).unwrap();
    (dir, input)
}

#[test]
fn converged_run_is_reported_as_converged() {
    let log = CastepLog::from_file(&sample("quartz_converged.castep")).unwrap();
    let report = ConvergenceReport::from_log(&log).unwrap();

    assert_eq!(report.iterations, 3);
    for quantity in Quantity::ALL {
        assert_eq!(report.series(quantity).len(), 3, "{quantity}");
    }
    assert_eq!(
        report.series(Quantity::CellVolume).values,
        vec![113.204112, 112.871539, 112.790021]
    );
    assert_eq!(report.series(Quantity::Enthalpy).last().unwrap(), -2626.43551);
    assert!(report.criteria.iter().all(|c| c.verdict == Verdict::Converged));
    assert!(report.overall_converged);
}

#[test]
fn unconverged_run_keeps_per_quantity_verdicts() {
    let log = CastepLog::from_file(&sample("si_unconverged.castep")).unwrap();
    let report = ConvergenceReport::from_log(&log).unwrap();

    assert_eq!(report.iterations, 2);
    assert!(!report.overall_converged);

    let verdict = |q| report.criterion(q).unwrap().verdict;
    assert_eq!(verdict(Quantity::EnergyChange), Verdict::NotConverged);
    assert_eq!(verdict(Quantity::MaxForce), Verdict::NotConverged);
    assert_eq!(verdict(Quantity::MaxDisplacement), Verdict::NotConverged);
    assert_eq!(verdict(Quantity::MaxStress), Verdict::NotConverged);

    let force = report.criterion(Quantity::MaxForce).unwrap();
    assert_eq!(force.final_value, 9.82e-2);
    assert_eq!(force.tolerance, 5.0e-2);
}

#[test]
fn default_run_saves_plot_next_to_input() {
    let (dir, input) = staged("quartz_converged.castep");
    let scratch = tempfile::tempdir().unwrap();
    let config = ConvergeConfig::new(input, false, scratch.path().to_path_buf());

    let renderer = RecordingRenderer::default();
    let viewer = RecordingViewer::default();
    let outcome = check_convergence(&config, &renderer, &viewer).unwrap();

    let expected = dir.path().join("quartz_converged.castep_optimization_plot.png");
    assert_eq!(outcome.saved.as_deref(), Some(expected.as_path()));
    assert!(expected.exists());
    assert!(viewer.shown.borrow().is_empty());
}

#[test]
fn display_run_writes_nothing_next_to_input() {
    let (dir, input) = staged("si_unconverged.castep");
    let scratch = tempfile::tempdir().unwrap();
    let config = ConvergeConfig::new(input, true, scratch.path().to_path_buf());
    assert_eq!(config.target, OutputTarget::Display);

    let renderer = RecordingRenderer::default();
    let viewer = RecordingViewer::default();
    let outcome = check_convergence(&config, &renderer, &viewer).unwrap();

    assert!(outcome.saved.is_none());
    assert!(!dir
        .path()
        .join("si_unconverged.castep_optimization_plot.png")
        .exists());

    let shown = viewer.shown.borrow();
    assert_eq!(shown.len(), 1);
    assert!(shown[0].starts_with(scratch.path()));
    // Left for the viewer, which may still be reading it.
    assert!(shown[0].exists());
    assert_eq!(*renderer.rendered.borrow(), *shown);
}

#[test]
fn discovery_feeds_the_pipeline() {
    let (dir, _) = staged("quartz_converged.castep");
    let input = discovery::resolve_input(None, dir.path()).unwrap();
    assert_eq!(input.file_name().unwrap(), "quartz_converged.castep");
}

#[test]
fn no_input_file_is_distinguished() {
    let dir = tempfile::tempdir().unwrap();
    let err = discovery::resolve_input(None, dir.path()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CastepError>(),
        Some(CastepError::NoInputFile(_))
    ));
}

#[test]
fn failures_leave_no_plot() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.castep");
    fs::write(&input, " BFGS: Geometry optimization completed successfully.\n").unwrap();
    let config = ConvergeConfig::new(input, false, dir.path().to_path_buf());

    let renderer = RecordingRenderer::default();
    let viewer = RecordingViewer::default();
    assert!(check_convergence(&config, &renderer, &viewer).is_err());
    assert!(renderer.rendered.borrow().is_empty());
    assert!(!dir.path().join("empty.castep_optimization_plot.png").exists());
}

#[test]
fn unreadable_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConvergeConfig::new(dir.path().join("missing.castep"), false, dir.path().to_path_buf());
    let err = check_convergence(&config, &RecordingRenderer::default(), &RecordingViewer::default())
        .unwrap_err();
    assert!(err.to_string().contains("Could not read CASTEP file"));
}

#[test]
fn plotters_renderer_writes_a_png() {
    let log = CastepLog::from_file(&sample("quartz_converged.castep")).unwrap();
    let report = ConvergenceReport::from_log(&log).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quartz.png");

    castep_tools::PlottersRenderer::default()
        .render(&report, &path)
        .unwrap();

    assert!(path.exists());
    assert!(fs::metadata(&path).unwrap().len() > 0);
}

fn check_converge() -> Command {
    Command::new(env!("CARGO_BIN_EXE_check_converge"))
}

#[test]
fn binary_exits_nonzero_without_input() {
    let dir = tempfile::tempdir().unwrap();
    let output = check_converge().current_dir(dir.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No .castep file found"), "{stdout}");
}

#[test]
fn binary_reports_bad_log_and_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.castep"), "garbage\n").unwrap();

    let output = check_converge()
        .current_dir(dir.path())
        .args(["-f", "bad.castep"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("An error occurred"), "{stdout}");
    assert!(!dir.path().join("bad.castep_optimization_plot.png").exists());
}
