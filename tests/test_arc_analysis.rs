use approx::assert_abs_diff_eq;
use arcphase::core::{
    arc_phase_series, butter_lowpass_filter, compute_adi, compute_arc_phase, sav_golay_smooth,
    select_points, select_reference_pixel, AnalysisConfig, ArcAnalysis, ArcSelector, FilterMode,
    SelectionEvent, StabilityThresholds,
};
use arcphase::types::{PixelCoord, SarComplex, StackData};
use ndarray::{Array1, Array2, Array3};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Constant amplitude everywhere, a 0.5 rad per acquisition phase ramp at (2, 3)
fn ramp_stack(num_acq: usize) -> StackData {
    let slc = Array3::from_shape_fn((num_acq, 4, 4), |(t, r, c)| {
        let phase = if (r, c) == (2, 3) { 0.5 * t as f32 } else { 0.0 };
        SarComplex::from_polar(3.0, phase)
    });

    StackData {
        slc,
        tbase: Array1::linspace(0.0, 1.0, num_acq),
        pbase: Array1::zeros(num_acq),
        incidence_angle: Array2::from_elem((4, 4), 0.6),
        slant_range: Array2::from_elem((4, 4), 850_000.0),
    }
}

#[test]
fn test_constant_amplitude_stack_end_to_end() {
    init_logging();
    let data = ramp_stack(10);

    let adi = compute_adi(&data.slc).unwrap();
    assert!(adi.adi.iter().all(|&v| v.abs() < 1e-5));
    assert!(adi.mean_amplitude.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    assert_eq!(adi.num_indeterminate(), 0);

    let masks = select_points(&adi.adi, 0.1, 0.3);
    assert_eq!(masks.count_first_order(), 16);
    assert_eq!(masks.count_tcs(), 0);

    let reference = select_reference_pixel(&masks.first_order).unwrap();
    assert_eq!(reference, PixelCoord::new(0, 0));

    let phases = compute_arc_phase(&data.slc, reference.row, reference.col).unwrap();
    assert_eq!(phases.dim(), (10, 4, 4));

    // the ramp wraps past π around t = 7 and must come back unwrapped
    for t in 0..10 {
        assert_abs_diff_eq!(phases[[t, 2, 3]], 0.5 * t as f64, epsilon = 1e-5);
        assert_abs_diff_eq!(phases[[t, 0, 0]], 0.0, epsilon = 1e-12);
    }

    let flat = arc_phase_series(&phases, PixelCoord::new(1, 1), PixelCoord::new(0, 0)).unwrap();
    assert!(flat.iter().all(|&v| v.abs() < 1e-12));

    let ramp = arc_phase_series(&phases, PixelCoord::new(2, 3), PixelCoord::new(1, 1)).unwrap();
    assert_abs_diff_eq!(ramp[9], 4.5, epsilon = 1e-5);
}

#[test]
fn test_interactive_selection_flow() {
    init_logging();
    let data = ramp_stack(8);
    let adi = compute_adi(&data.slc).unwrap();
    let masks = select_points(&adi.adi, 0.1, 0.3);
    let phases = compute_arc_phase(&data.slc, 0, 0).unwrap();

    let mut selector = ArcSelector::new(masks);
    assert_eq!(selector.click(2, 3), SelectionEvent::First(PixelCoord::new(2, 3)));
    assert_eq!(selector.click(17, 0), SelectionEvent::Rejected(PixelCoord::new(17, 0)));

    let (a, b) = match selector.click(0, 1) {
        SelectionEvent::Arc(a, b) => (a, b),
        other => panic!("expected a completed arc, got {:?}", other),
    };
    let series = selector.arc_series(&phases, a, b).unwrap();
    assert_eq!(series.len(), 8);
    assert_abs_diff_eq!(series[4], 2.0, epsilon = 1e-5);
}

#[test]
fn test_smoothing_a_ramp_series() {
    init_logging();
    let data = ramp_stack(30);
    let phases = compute_arc_phase(&data.slc, 0, 0).unwrap();
    let series = arc_phase_series(&phases, PixelCoord::new(2, 3), PixelCoord::new(0, 0)).unwrap();

    // a straight line is a degree-1 polynomial, the local fit reproduces it
    let savgol = sav_golay_smooth(&series, 11, 2);
    for (smoothed, original) in savgol.iter().zip(series.iter()) {
        assert_abs_diff_eq!(*smoothed, *original, epsilon = 1e-4);
    }

    let butterworth = butter_lowpass_filter(&series, 0.1, 1.0, 5).unwrap();
    assert_eq!(butterworth.len(), 30);
    assert!(butterworth.iter().all(|v| v.is_finite()));
    // unity DC gain and zero phase: the middle of a ramp passes through
    assert_abs_diff_eq!(butterworth[15], series[15], epsilon = 0.2);
}

#[test]
fn test_pipeline_filter_modes_follow_series_length() {
    init_logging();
    let config = AnalysisConfig {
        thresholds: StabilityThresholds { thr_ps: 0.1, thr_tcs: 0.3 },
        comparison_points: 3,
        ..AnalysisConfig::default()
    };
    let analysis = ArcAnalysis::new(config);

    let long = analysis.run(&ramp_stack(16)).unwrap();
    assert_eq!(long.comparisons.len(), 3);
    assert!(long
        .comparisons
        .iter()
        .all(|c| c.butterworth.mode == FilterMode::ZeroPhase));

    let medium = analysis.run(&ramp_stack(10)).unwrap();
    assert!(medium
        .comparisons
        .iter()
        .all(|c| c.butterworth.mode == FilterMode::Causal));

    let short = analysis.run(&ramp_stack(4)).unwrap();
    for comparison in &short.comparisons {
        assert_eq!(comparison.butterworth.mode, FilterMode::Skipped);
        assert_eq!(comparison.butterworth.data, comparison.original);
    }
}

#[test]
fn test_default_config() {
    let config = AnalysisConfig::default();
    assert_eq!(config.thresholds.thr_ps, 0.25);
    assert_eq!(config.thresholds.thr_tcs, 0.4);
    assert_eq!(config.butterworth.order, 5);
    assert_eq!(config.savgol.window_length, 11);
    assert_eq!(config.savgol.polyorder, 2);
    assert_eq!(config.comparison_points, 5);
}
