use crate::core::quantity::Quantity;
use crate::core::report::ConvergenceReport;
use crate::error::CastepError;
use crate::plot::Renderer;
use anyhow::{anyhow, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fmt::Display;
use std::path::Path;

const FONT: &str = "sans-serif";
const TITLE: &str = "Castep Cell Optimization";
const DARK_GREEN: RGBColor = RGBColor(0, 128, 0);

/// Six-panel PNG figure drawn with `plotters`.
#[derive(Debug, Clone, Copy)]
pub struct PlottersRenderer {
    /// Image size in pixels.
    pub size: (u32, u32),
}

impl Default for PlottersRenderer {
    fn default() -> Self {
        Self { size: (1200, 1000) }
    }
}

impl Renderer for PlottersRenderer {
    fn render(&self, report: &ConvergenceReport, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;
        let root = root.titled(TITLE, (FONT, 30)).map_err(draw_error)?;

        let (header, body) = root.split_vertically(80);
        draw_summary(&header, report)?;

        let panels = body.split_evenly((3, 2));
        for (panel, quantity) in panels.iter().zip(Quantity::ALL) {
            draw_panel(panel, report, quantity)?;
        }

        root.present().map_err(draw_error)?;
        Ok(())
    }
}

fn draw_error(e: impl Display) -> anyhow::Error {
    anyhow!("Failed to draw figure: {}", e)
}

pub(crate) fn panel_color(quantity: Quantity) -> RGBColor {
    match quantity {
        Quantity::Enthalpy => RGBColor(128, 0, 128),
        Quantity::CellVolume => RGBColor(255, 165, 0),
        Quantity::EnergyChange => BLUE,
        Quantity::MaxForce => RED,
        Quantity::MaxDisplacement => DARK_GREEN,
        Quantity::MaxStress => MAGENTA,
    }
}

/// Text drawn in the top right corner of a panel.
pub(crate) fn annotation_lines(report: &ConvergenceReport, quantity: Quantity) -> Vec<String> {
    let precision = quantity.precision();
    let mut lines = Vec::with_capacity(3);
    if let Some(last) = report.series(quantity).values.last() {
        lines.push(format!("Final = {:.*}", precision, last));
    }
    if let Some(c) = report.criterion(quantity) {
        lines.push(format!("Tol = {:.*}", precision, c.tolerance));
        lines.push(c.verdict.to_string());
    }
    lines
}

/// Y range with some headroom; flat series get a band around their value.
pub(crate) fn padded_range(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    let pad = if span > 0.0 {
        span * 0.1
    } else if hi != 0.0 {
        hi.abs() * 0.05
    } else {
        1.0
    };
    (lo - pad, hi + pad)
}

fn tick_label(v: &f64) -> String {
    let a = v.abs();
    if a != 0.0 && !(1e-2..1e5).contains(&a) {
        format!("{:.1e}", v)
    } else {
        format!("{:.3}", v)
    }
}

fn step_label(v: &f64) -> String {
    format!("{:.0}", v)
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    report: &ConvergenceReport,
    quantity: Quantity,
) -> Result<()> {
    let series = report.series(quantity);
    if series.is_empty() {
        return Err(CastepError::EmptySeries(quantity.name()).into());
    }
    let (y_lo, y_hi) = series
        .bounds()
        .map(|(lo, hi)| padded_range(lo, hi))
        .filter(|(lo, hi)| lo.is_finite() && hi.is_finite())
        .ok_or(CastepError::NonFiniteSeries(quantity.name()))?;
    let x_hi = series.len().saturating_sub(1).max(1) as f64;
    let color = panel_color(quantity);

    let mut chart = ChartBuilder::on(area)
        .caption(quantity.name(), (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.25..x_hi + 0.25, y_lo..y_hi)
        .map_err(draw_error)?;

    chart
        .configure_mesh()
        .x_desc("Opt. Step.")
        .y_desc(quantity.axis_label())
        .x_labels(series.len().clamp(2, 10))
        .x_label_formatter(&step_label)
        .y_label_formatter(&tick_label)
        .draw()
        .map_err(draw_error)?;

    let points = series.points();
    chart
        .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
        .map_err(draw_error)?;
    chart
        .draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))
        .map_err(draw_error)?;

    let plot = chart.plotting_area().strip_coord_spec();
    let boxed = quantity.has_tolerance();
    draw_text_block(&plot, &annotation_lines(report, quantity), &BLACK, 15, boxed)
}

/// Right-aligned block of lines anchored at the top right of `area`.
fn draw_text_block<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    lines: &[String],
    color: &RGBColor,
    font_size: u32,
    boxed: bool,
) -> Result<()> {
    let (width, _) = area.dim_in_pixel();
    let style = (FONT, font_size as f64)
        .into_font()
        .color(color)
        .pos(Pos::new(HPos::Right, VPos::Top));
    let line_height = font_size as i32 + 4;
    let right = width as i32 - 12;
    let top = 10;

    if boxed && !lines.is_empty() {
        let mut text_width = 0;
        for line in lines {
            let (w, _) = area.estimate_text_size(line, &style).map_err(draw_error)?;
            text_width = text_width.max(w as i32);
        }
        let corners = [
            (right - text_width - 6, top - 4),
            (right + 6, top + line_height * lines.len() as i32 + 2),
        ];
        area.draw(&Rectangle::new(corners, WHITE.filled()))
            .map_err(draw_error)?;
        area.draw(&Rectangle::new(corners, BLACK.stroke_width(1)))
            .map_err(draw_error)?;
    }

    for (i, line) in lines.iter().enumerate() {
        let y = top + line_height * i as i32;
        area.draw(&Text::new(line.as_str(), (right, y), style.clone()))
            .map_err(draw_error)?;
    }
    Ok(())
}

/// Iteration count and the optimiser's own verdict, green or red.
fn draw_summary<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    report: &ConvergenceReport,
) -> Result<()> {
    let color = if report.overall_converged { DARK_GREEN } else { RED };
    let lines = [
        format!("Iterations: {}", report.iterations),
        format!(
            "Overall Convergence: {}",
            if report.overall_converged { "Yes" } else { "No" }
        ),
    ];
    draw_text_block(area, &lines, &color, 18, true)
}
