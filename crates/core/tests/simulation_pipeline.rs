//! End-to-end run of the reference scenario followed by a camera query.
use plume_sim_core::atmosphere::WindSeries;
use plume_sim_core::camera::{CameraDetector, CameraPose};
use plume_sim_core::core_types::Vec3;
use plume_sim_core::grid::SpatialGrid;
use plume_sim_core::leak::LeakDescriptor;
use plume_sim_core::simulation::{PuffSimulation, SimulationConfig};
use tracing_subscriber::EnvFilter;

const SPEEDS: [f64; 10] = [2.2, 2.5, 1.8, 4.0, 5.5, 6.2, 4.7, 3.2, 3.8, 5.1];
const DIRECTIONS: [f64; 10] = [
    211.0, 206.0, 199.0, 198.0, 196.0, 196.0, 204.0, 205.0, 200.0, 206.0,
];

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_reference_scenario_end_to_end() {
    init_tracing();

    let config = SimulationConfig::default();
    let leak = LeakDescriptor::event(1.0, 2.01, 30.0).unwrap();
    let grid =
        SpatialGrid::from_linspace((-51.0, 49.0, 20), (-50.0, 50.0, 20), (0.0, 5.0, 6)).unwrap();
    let wind = WindSeries::from_meteorological(&SPEEDS, &DIRECTIONS).unwrap();

    let results = PuffSimulation::new(config, leak, grid.clone(), wind)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(results.len(), 20);
    assert_eq!(results.concentration_history.len(), 20);
    assert_eq!(results.wind_speeds[0], 2.2);
    assert_eq!(results.wind_speeds[1], 2.2);
    assert_eq!(results.wind_speeds[2], 2.5);
    for field in &results.raw_history {
        assert_eq!(field.dims(), (20, 20, 6));
        assert!(field.values().iter().all(|v| v.is_finite() && *v >= 0.0));
    }
    // First window is never corrected
    assert_eq!(results.concentration_history[0], results.raw_history[0]);
    assert_eq!(results.concentration_history[1], results.raw_history[1]);
    assert!(results.peak_concentration() > 0.0);

    // Camera query on the final stitched field
    let detector = CameraDetector::with_defaults().unwrap();
    let location = Vec3::new(-50.0, -50.0, 1.0);
    let pose = CameraPose::looking_at(location, Vec3::new(0.0, 0.0, 1.0)).unwrap();
    let field = results.last_field().unwrap();
    let detection = detector.detect(field, &results.grid, &pose).unwrap();
    assert!(detection.full_resolution_pixels <= 16 * 80 * 60);
}
