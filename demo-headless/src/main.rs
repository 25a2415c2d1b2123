use clap::Parser;
use plume_sim_core::{
    CameraDetector, CameraPose, LeakDescriptor, PlumeError, PuffSimulation, Seconds,
    SimulationConfig, SimulationResults, SpatialGrid, Vec3, WindSeries,
};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Wind speeds of the reference scenario (m/s), one per minute
const REFERENCE_SPEEDS: [f64; 10] = [2.2, 2.5, 1.8, 4.0, 5.5, 6.2, 4.7, 3.2, 3.8, 5.1];

/// Wind directions of the reference scenario (degrees from north)
const REFERENCE_DIRECTIONS: [f64; 10] = [
    211.0, 206.0, 199.0, 198.0, 196.0, 196.0, 204.0, 205.0, 200.0, 206.0,
];

/// Gas leak plume simulation with optional IR camera detection
#[derive(Parser, Debug)]
#[command(name = "plume-sim-demo")]
#[command(about = "Puff dispersion of a methane leak with IR camera detection", long_about = None)]
struct Args {
    /// Leak emission rate in g/s
    #[arg(short, long, default_value_t = 1.0)]
    rate: f64,

    /// Leak height above ground in meters
    #[arg(long, default_value_t = 2.01)]
    height: f64,

    /// Model a bounded release of size rate × time step instead of a sustained leak
    #[arg(short, long)]
    event: bool,

    /// Simulated duration in seconds
    #[arg(short, long, default_value_t = 600.0)]
    duration: f64,

    /// Time step in seconds
    #[arg(long, default_value_t = 30.0)]
    time_step: f64,

    /// Interval between wind samples in seconds
    #[arg(long, default_value_t = 60.0)]
    wind_interval: f64,

    /// Run the IR camera detector on the final field
    #[arg(short, long)]
    camera: bool,

    /// Camera location as x,y,z in meters
    #[arg(long, value_delimiter = ',', num_args = 3, default_values_t = [0.0, 0.0, 0.0])]
    camera_location: Vec<f64>,

    /// Camera aim direction as x,y,z
    #[arg(long, value_delimiter = ',', num_args = 3, default_values_t = [1.0, 1.0, 1.0])]
    camera_aim: Vec<f64>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> plume_sim_core::Result<()> {
    println!("=== Plume Simulation Demo ===\n");

    let config = SimulationConfig {
        total_time: Seconds::new(args.duration),
        time_step: Seconds::new(args.time_step),
        wind_update_interval: Seconds::new(args.wind_interval),
        ..SimulationConfig::default()
    };

    let event_size = args.event.then_some(args.rate * args.time_step);
    let leak = LeakDescriptor::build(args.rate, args.height, event_size)?;
    println!(
        "Leak: {:.3} g/s at {:.2} m ({})",
        leak.emission_rate(),
        leak.height(),
        match event_size {
            Some(size) => format!("event of {size:.1} g"),
            None => "continuous".to_string(),
        }
    );

    let grid = SpatialGrid::from_linspace((-51.0, 49.0, 20), (-50.0, 50.0, 20), (0.0, 5.0, 6))?;
    let (nx, ny, nz) = grid.dims();
    println!("Grid: {nx}x{ny}x{nz} points");

    let wind = WindSeries::from_meteorological(&REFERENCE_SPEEDS, &REFERENCE_DIRECTIONS)?;
    let simulation = PuffSimulation::new(config, leak, grid, wind)?;
    info!("Running {} time steps", simulation.time_grid().len());

    let results = simulation.run()?;
    print_summary(&results);

    if args.camera {
        let location = vec3_arg("camera_location", &args.camera_location)?;
        let aim = vec3_arg("camera_aim", &args.camera_aim)?;
        let pose = CameraPose::new(location, aim)?;
        let detector = CameraDetector::with_defaults()?;

        if let Some(field) = results.last_field() {
            let detection = detector.detect(field, &results.grid, &pose)?;
            println!("\n=== Camera ===");
            println!(
                "Location: ({:.1}, {:.1}, {:.1}), aim: ({:.3}, {:.3}, {:.3})",
                location.x,
                location.y,
                location.z,
                pose.aim().x,
                pose.aim().y,
                pose.aim().z
            );
            println!(
                "Triggered pixels: {} (reduced), {} (full resolution)",
                detection.triggered_pixels, detection.full_resolution_pixels
            );
            println!("Detected: {}", detection.as_flag());
        }
    }

    Ok(())
}

fn vec3_arg(name: &'static str, values: &[f64]) -> plume_sim_core::Result<Vec3> {
    match values {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(PlumeError::configuration(
            name,
            format!("expected x,y,z, got {} values", values.len()),
        )),
    }
}

fn print_summary(results: &SimulationResults) {
    println!("\nTime(s) | Wind(m/s) | Angle(rad) | Max raw(ppm) | Max(ppm) | Total(ppm)");
    println!("--------|-----------|------------|--------------|----------|-----------");
    for (m, &t) in results.time_axis.iter().enumerate() {
        let raw = &results.raw_history[m];
        let stitched = &results.concentration_history[m];
        println!(
            "{:7.1} | {:9.2} | {:10.3} | {:12.4} | {:8.4} | {:10.2}",
            t,
            results.wind_speeds[m],
            results.wind_angles[m],
            raw.max(),
            stitched.max(),
            stitched.total()
        );
    }

    let stats = results.total_stats();
    println!("\n=== Simulation Complete ===");
    println!("Peak concentration: {:.4} ppm", results.peak_concentration());
    println!(
        "Masked cells: {}, non-converged cells: {}",
        stats.masked_cells, stats.non_converged_cells
    );
}
