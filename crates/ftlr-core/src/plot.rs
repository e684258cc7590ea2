use crate::dataset::Dataset;
use crate::matrix::Matrix;
use crate::stats::{Bounds, LinReg};
use crate::training::TrainedModel;
use plotters::prelude::*;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::info;

pub const PLOT_WIDTH: u32 = 800;
pub const PLOT_HEIGHT: u32 = 600;
/// Points used to draw the fitted line across the mileage range.
pub const LINE_POINTS: usize = 100;

#[derive(thiserror::Error, Debug)]
pub enum PlotError {
    #[error("could not create plot directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to draw {path}: {message}")]
    Draw { path: PathBuf, message: String },
    #[error("nothing to plot")]
    Empty,
}

type PlotResult<T> = Result<T, PlotError>;

fn draw_err<E: std::fmt::Display>(path: &Path) -> impl Fn(E) -> PlotError + '_ {
    move |e| PlotError::Draw { path: path.to_path_buf(), message: e.to_string() }
}

/// Data range with a 5% buffer on both sides.
fn padded(values: impl Iterator<Item = f64>) -> PlotResult<Range<f64>> {
    let (min, max) = values
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or(PlotError::Empty)?;
    let buffer = if max > min { (max - min) * 0.05 } else { 1.0 };
    Ok((min - buffer)..(max + buffer))
}

fn points(xs: &Matrix, ys: &Matrix) -> Vec<(f64, f64)> {
    xs.iter().zip(ys.iter()).collect()
}

/// Scatter of raw mileage against price.
pub fn draw_dataset(path: &Path, features: &Matrix, targets: &Matrix) -> PlotResult<()> {
    let data = points(features, targets);
    let root = SVGBackend::new(path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err(path))?;

    let mut ctx = ChartBuilder::on(&root)
        .caption("Price per kilometer (raw data)", ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(padded(features.iter())?, padded(targets.iter())?)
        .map_err(draw_err(path))?;

    ctx.configure_mesh()
        .x_desc("Mileage (km)")
        .y_desc("Price ($)")
        .draw()
        .map_err(draw_err(path))?;

    ctx.draw_series(data.iter().map(|point| Circle::new(*point, 4, BLUE.filled())))
        .map_err(draw_err(path))?
        .label("Data")
        .legend(|(x, y)| Circle::new((x, y), 4, BLUE.filled()));

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(draw_err(path))?;
    root.present().map_err(draw_err(path))?;
    Ok(())
}

/// Normalized mileage plotted against the raw mileage it came from.
pub fn draw_normalized(path: &Path, features: &Matrix, normalized: &Matrix) -> PlotResult<()> {
    let mut data = points(features, normalized);
    data.sort_by(|a, b| a.0.total_cmp(&b.0));

    let root = SVGBackend::new(path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err(path))?;

    let mut ctx = ChartBuilder::on(&root)
        .caption("Normalized mileage vs. gross mileage", ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(padded(features.iter())?, -0.05..1.05)
        .map_err(draw_err(path))?;

    ctx.configure_mesh()
        .x_desc("Mileage (km)")
        .y_desc("Normalized Mileage")
        .draw()
        .map_err(draw_err(path))?;

    ctx.draw_series(LineSeries::new(data.iter().copied(), BLUE.stroke_width(2)))
        .map_err(draw_err(path))?
        .label("Normalized Mileage")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    ctx.draw_series(data.iter().map(|point| Circle::new(*point, 4, BLUE.filled())))
        .map_err(draw_err(path))?;

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(draw_err(path))?;
    root.present().map_err(draw_err(path))?;
    Ok(())
}

/// Raw data with the fitted line evaluated at [`LINE_POINTS`] evenly spaced
/// mileages between the bounds.
pub fn draw_regression(
    path: &Path,
    features: &Matrix,
    targets: &Matrix,
    line: LinReg,
    bounds: Bounds,
) -> PlotResult<()> {
    let data = points(features, targets);
    let fitted: Vec<(f64, f64)> = bounds
        .linspace(LINE_POINTS)
        .into_iter()
        .map(|km| (km, line.calculate(bounds.normalize(km))))
        .collect();
    let y_range = padded(targets.iter().chain(fitted.iter().map(|p| p.1)))?;

    let root = SVGBackend::new(path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err(path))?;

    let mut ctx = ChartBuilder::on(&root)
        .caption("Car Price Prediction vs Mileage", ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(padded(features.iter())?, y_range)
        .map_err(draw_err(path))?;

    ctx.configure_mesh()
        .x_desc("Mileage (km)")
        .y_desc("Price ($)")
        .draw()
        .map_err(draw_err(path))?;

    ctx.draw_series(data.iter().map(|point| Circle::new(*point, 4, BLUE.filled())))
        .map_err(draw_err(path))?
        .label("Data Points")
        .legend(|(x, y)| Circle::new((x, y), 4, BLUE.filled()));
    ctx.draw_series(LineSeries::new(fitted, RED.stroke_width(2)))
        .map_err(draw_err(path))?
        .label("Regression Line")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(draw_err(path))?;
    root.present().map_err(draw_err(path))?;
    Ok(())
}

/// Cost after each gradient-descent iteration.
pub fn draw_cost(path: &Path, costs: &[f64]) -> PlotResult<()> {
    let series: Vec<(f64, f64)> = costs.iter().enumerate().map(|(i, &c)| (i as f64, c)).collect();
    let x_range = padded(series.iter().map(|p| p.0))?;
    let y_range = padded(costs.iter().copied())?;

    let root = SVGBackend::new(path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err(path))?;

    let mut ctx = ChartBuilder::on(&root)
        .caption("Cost history", ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_err(path))?;

    ctx.configure_mesh().x_desc("Iteration").y_desc("Cost").draw().map_err(draw_err(path))?;
    ctx.draw_series(LineSeries::new(series, RED.stroke_width(2))).map_err(draw_err(path))?;
    root.present().map_err(draw_err(path))?;
    Ok(())
}

/// Writes every evaluation plot into `dir` and returns the files created.
pub fn draw_all(dir: &Path, dataset: &Dataset, model: &TrainedModel) -> PlotResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| PlotError::Io { path: dir.to_path_buf(), source })?;

    let dataset_svg = dir.join("dataset.svg");
    draw_dataset(&dataset_svg, dataset.features(), dataset.targets())?;

    let normalized_svg = dir.join("normalized.svg");
    draw_normalized(&normalized_svg, dataset.features(), &model.normalized)?;

    let regression_svg = dir.join("regression.svg");
    draw_regression(
        &regression_svg,
        dataset.features(),
        dataset.targets(),
        model.line(),
        model.bounds,
    )?;

    let cost_svg = dir.join("cost.svg");
    draw_cost(&cost_svg, &model.costs)?;

    let written = vec![dataset_svg, normalized_svg, regression_svg, cost_svg];
    info!("wrote {} plots to {}", written.len(), dir.display());
    Ok(written)
}
