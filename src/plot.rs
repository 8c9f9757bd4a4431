//! PNG rendering of stability maps and phase time series

use crate::core::arc_phase::pixel_phase_series;
use crate::core::pipeline::PixelComparison;
use crate::core::stability::{mask_coords, StabilityMasks};
use crate::types::{PixelCoord, PixelMask, SarError, SarRealImage, SarResult};
use ndarray::{Array1, Array3};
use plotters::prelude::*;
use std::f64::consts::PI;
use std::path::Path;

/// Number of interferogram ranges in the arc phase overview
const ARC_PHASE_PANELS: usize = 10;

/// Panel grid (rows, columns) of the arc phase overview
const ARC_PHASE_GRID: (usize, usize) = (4, 4);

/// Fixed vertical extent of single-pixel phase plots
const PIXEL_PHASE_LIMIT: f64 = 4.0 * PI;

const ARC_COLOR: RGBColor = RGBColor(128, 128, 128);

type PlotResult = Result<(), Box<dyn std::error::Error>>;

fn plot_error(what: &str, e: Box<dyn std::error::Error>) -> SarError {
    SarError::Processing(format!("Failed to render {}: {}", what, e))
}

/// Padded (min, max) over the finite values, falling back to [-π, π]
fn value_range<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    if !min.is_finite() {
        return (-std::f64::consts::PI, std::f64::consts::PI);
    }
    let padding = if max > min { (max - min) * 0.1 } else { 1.0 };
    (min - padding, max + padding)
}

/// Split `0..num_ifgs` into at most `panels` contiguous ranges, the last one taking the remainder
fn panel_ranges(num_ifgs: usize, panels: usize) -> Vec<(usize, usize)> {
    let panels = panels.min(num_ifgs);
    if panels == 0 {
        return Vec::new();
    }
    let per_panel = num_ifgs / panels;
    (0..panels)
        .map(|i| {
            let start = i * per_panel;
            let end = if i + 1 == panels { num_ifgs } else { start + per_panel };
            (start, end)
        })
        .collect()
}

fn pixel_center(pixel: PixelCoord) -> (f64, f64) {
    (pixel.col as f64 + 0.5, pixel.row as f64 + 0.5)
}

/// Mean amplitude image (bright = dark grey) with first-order points in red and TCS points in blue
pub fn plot_stability_map<P: AsRef<Path>>(
    output_path: P,
    mean_amplitude: &SarRealImage,
    masks: &StabilityMasks,
) -> SarResult<()> {
    log::info!("Rendering stability map to {}", output_path.as_ref().display());
    draw_stability_map(output_path.as_ref(), mean_amplitude, masks, None)
        .map_err(|e| plot_error("stability map", e))
}

/// Stability map with the two end points of a selected arc marked and joined
pub fn plot_selected_arc<P: AsRef<Path>>(
    output_path: P,
    mean_amplitude: &SarRealImage,
    masks: &StabilityMasks,
    a: PixelCoord,
    b: PixelCoord,
) -> SarResult<()> {
    log::info!(
        "Rendering arc {} - {} over the stability map to {}",
        a,
        b,
        output_path.as_ref().display()
    );
    draw_stability_map(output_path.as_ref(), mean_amplitude, masks, Some((a, b)))
        .map_err(|e| plot_error("selected arc", e))
}

fn draw_stability_map(
    output_path: &Path,
    mean_amplitude: &SarRealImage,
    masks: &StabilityMasks,
    arc: Option<(PixelCoord, PixelCoord)>,
) -> PlotResult {
    let (rows, cols) = mean_amplitude.dim();
    let root = BitMapBackend::new(output_path, (900, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("First-order and TCS points", ("sans-serif", 25))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        // row 0 at the top
        .build_cartesian_2d(0f64..cols as f64, rows as f64..0f64)?;

    chart.configure_mesh()
        .x_desc("Range")
        .y_desc("Azimuth")
        .disable_mesh()
        .draw()?;

    chart.draw_series(mean_amplitude.indexed_iter().map(|((row, col), &value)| {
        let level = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
        let grey = (255.0 * (1.0 - level)) as u8;
        Rectangle::new(
            [(col as f64, row as f64), (col as f64 + 1.0, row as f64 + 1.0)],
            RGBColor(grey, grey, grey).filled(),
        )
    }))?;

    let centers = |coords: Vec<PixelCoord>| coords.into_iter().map(pixel_center).collect::<Vec<_>>();

    chart.draw_series(PointSeries::of_element(
        centers(masks.first_order_coords()),
        3,
        &RED,
        &|c, s, st| Circle::new(c, s, st.filled()),
    ))?
    .label("First Order Points")
    .legend(|(x, y)| Circle::new((x, y), 4, RED.filled()));

    chart.draw_series(PointSeries::of_element(
        centers(masks.tcs_coords()),
        2,
        &BLUE,
        &|c, s, st| Circle::new(c, s, st.filled()),
    ))?
    .label("TCS Points")
    .legend(|(x, y)| Circle::new((x, y), 4, BLUE.filled()));

    if let Some((a, b)) = arc {
        let ends = vec![pixel_center(a), pixel_center(b)];
        chart.draw_series(LineSeries::new(ends.clone(), ARC_COLOR.stroke_width(2)))?
            .label("Arc")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ARC_COLOR.stroke_width(2)));
        chart.draw_series(PointSeries::of_element(
            ends,
            6,
            &BLACK,
            &|c, s, st| Circle::new(c, s, st.stroke_width(2)),
        ))?;
    }

    chart.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Scatter plot of the arc phase between two pixels
pub fn plot_arc_series<P: AsRef<Path>>(
    output_path: P,
    a: PixelCoord,
    b: PixelCoord,
    series: &Array1<f64>,
) -> SarResult<()> {
    log::info!("Rendering arc phase {} - {} to {}", a, b, output_path.as_ref().display());
    draw_arc_series(output_path.as_ref(), a, b, series).map_err(|e| plot_error("arc phase", e))
}

fn draw_arc_series(output_path: &Path, a: PixelCoord, b: PixelCoord, series: &Array1<f64>) -> PlotResult {
    let root = BitMapBackend::new(output_path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let (y_min, y_max) = value_range(series.iter());
    let x_max = series.len().max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Arc Phase Between {} and {}", a, b), ("sans-serif", 25))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..x_max - 0.5, y_min..y_max)?;

    chart.configure_mesh()
        .x_desc("Time (Interferograms)")
        .y_desc("Phase (radians)")
        .draw()?;

    chart.draw_series(PointSeries::of_element(
        series.iter().enumerate().map(|(i, &v)| (i as f64, v)),
        3,
        &BLUE,
        &|c, s, st| Circle::new(c, s, st.filled()),
    ))?;

    root.present()?;
    Ok(())
}

/// Phase series of the first `max_pixels` selected pixels, one panel per interferogram range
pub fn plot_arc_phases<P: AsRef<Path>>(
    output_path: P,
    arc_phases: &Array3<f64>,
    first_order: &PixelMask,
    max_pixels: usize,
) -> SarResult<()> {
    let (num_ifgs, rows, cols) = arc_phases.dim();
    if first_order.dim() != (rows, cols) {
        return Err(SarError::InvalidParameter(format!(
            "Mask of shape {:?} does not match the {}x{} phase grid",
            first_order.dim(),
            rows,
            cols
        )));
    }

    let pixels: Vec<PixelCoord> = mask_coords(first_order).into_iter().take(max_pixels).collect();
    log::info!(
        "Rendering arc phases of {} pixels over {} interferograms to {}",
        pixels.len(),
        num_ifgs,
        output_path.as_ref().display()
    );
    draw_arc_phases(output_path.as_ref(), arc_phases, &pixels).map_err(|e| plot_error("arc phases", e))
}

fn draw_arc_phases(output_path: &Path, arc_phases: &Array3<f64>, pixels: &[PixelCoord]) -> PlotResult {
    let root = BitMapBackend::new(output_path, (1400, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let cells = root.split_evenly(ARC_PHASE_GRID);
    let ranges = panel_ranges(arc_phases.dim().0, ARC_PHASE_PANELS);

    for (&(start, end), area) in ranges.iter().zip(cells.iter()) {
        let values: Vec<f64> = pixels
            .iter()
            .flat_map(|p| (start..end).map(move |t| arc_phases[[t, p.row, p.col]]))
            .collect();
        let (y_min, y_max) = value_range(values.iter());

        let mut chart = ChartBuilder::on(area)
            .caption(format!("Arc Phase (IFG {} - {})", start, end), ("sans-serif", 14))
            .margin(5)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(start as f64 - 0.5..end as f64 - 0.5, y_min..y_max)?;

        chart.configure_mesh()
            .x_desc("Interferogram Index")
            .y_desc("Phase (radians)")
            .label_style(("sans-serif", 10))
            .draw()?;

        for (i, pixel) in pixels.iter().enumerate() {
            let color = Palette99::pick(i).mix(0.7);
            chart.draw_series(LineSeries::new(
                (start..end).map(|t| (t as f64, arc_phases[[t, pixel.row, pixel.col]])),
                color.stroke_width(1),
            ))?;
        }
    }

    root.present()?;
    Ok(())
}

/// Scatter of one pixel's phase series on a fixed [-4π, 4π] axis
///
/// Samples outside the axis are left out.
pub fn plot_pixel_phases<P: AsRef<Path>>(
    output_path: P,
    arc_phases: &Array3<f64>,
    pixel: PixelCoord,
) -> SarResult<()> {
    let series = pixel_phase_series(arc_phases, pixel)?;
    log::info!("Rendering phase of pixel {} to {}", pixel, output_path.as_ref().display());
    draw_pixel_phases(output_path.as_ref(), pixel, &series).map_err(|e| plot_error("pixel phase", e))
}

fn draw_pixel_phases(output_path: &Path, pixel: PixelCoord, series: &Array1<f64>) -> PlotResult {
    let root = BitMapBackend::new(output_path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = series.len().max(1) as f64;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Pixel {}", pixel), ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..x_max - 0.5, -PIXEL_PHASE_LIMIT..PIXEL_PHASE_LIMIT)?;

    chart.configure_mesh()
        .x_desc("Interferogram Index")
        .y_desc("Phase (radians)")
        .draw()?;

    let visible: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .filter(|(_, v)| v.abs() <= PIXEL_PHASE_LIMIT)
        .map(|(i, &v)| (i as f64, v))
        .collect();
    if visible.len() < series.len() {
        log::debug!(
            "{} samples of pixel {} fall outside ±4π",
            series.len() - visible.len(),
            pixel
        );
    }

    chart.draw_series(PointSeries::of_element(
        visible,
        2,
        &BLUE,
        &|c, s, st| Circle::new(c, s, st.filled()),
    ))?;

    root.present()?;
    Ok(())
}

/// Original, Butterworth and Savitzky-Golay series of one pixel
pub fn plot_comparison<P: AsRef<Path>>(output_path: P, comparison: &PixelComparison) -> SarResult<()> {
    log::info!(
        "Rendering filter comparison for pixel {} to {}",
        comparison.pixel,
        output_path.as_ref().display()
    );
    draw_comparison(output_path.as_ref(), comparison).map_err(|e| plot_error("filter comparison", e))
}

fn draw_comparison(output_path: &Path, comparison: &PixelComparison) -> PlotResult {
    let root = BitMapBackend::new(output_path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let (y_min, y_max) = value_range(
        comparison
            .original
            .iter()
            .chain(comparison.butterworth.data.iter())
            .chain(comparison.savgol.data.iter()),
    );
    let x_max = comparison.original.len().max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Pixel {} - Arc Phase Comparison", comparison.pixel),
            ("sans-serif", 22),
        )
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..x_max - 0.5, y_min..y_max)?;

    chart.configure_mesh()
        .x_desc("Interferogram Index")
        .y_desc("Phase (radians)")
        .draw()?;

    let indexed = |series: &Array1<f64>| {
        series
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v))
            .collect::<Vec<_>>()
    };

    chart.draw_series(PointSeries::of_element(
        indexed(&comparison.original),
        3,
        &BLACK,
        &|c, s, st| Circle::new(c, s, st.filled()),
    ))?
    .label("Original")
    .legend(|(x, y)| Circle::new((x, y), 3, BLACK.filled()));

    chart.draw_series(LineSeries::new(indexed(&comparison.butterworth.data), &RED))?
        .label("Butterworth Filter")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.filled()));

    chart.draw_series(LineSeries::new(indexed(&comparison.savgol.data), &BLUE))?
        .label("Savitzky-Golay Filter")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.filled()));

    chart.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
