//! Load a lens profile, calibrate it, trace a sensor grid and print the statistics.
//!
//! Usage: `lentil <profile> [grid size]`

#[macro_use]
extern crate log;

use lentil::core::lentil::Float;
use lentil::core::geometry::Point2f;
use lentil::core::camera::{Camera, CameraSample};
use lentil::core::lens_model::LensDatabase;
use lentil::core::lens_profile::LensProfile;
use lentil::core::parser::read_params_file;
use lentil::core::rng::Rng;
use lentil::core::stats_accumulator::StatsAccumulator;
use lentil::cameras::PolynomialCamera;
use lentil::lenses::register_reference_models;
use rayon::prelude::*;
use std::io::{self, Write};
use std::process;

const DEFAULT_GRID_SIZE: u32 = 64;

fn run(path: &str, grid_size: u32) -> io::Result<()> {
    let mut database = LensDatabase::new();
    register_reference_models(&mut database);

    let params = read_params_file(path)?;
    let profile = LensProfile::from_params(&params, &database)?;
    let camera = PolynomialCamera::new(profile, &database)?;

    info!("Tracing a {}x{} sensor grid", grid_size, grid_size);
    let accepted: u64 = (0..grid_size * grid_size)
        .into_par_iter()
        .map(|index| {
            let (i, j) = (index % grid_size, index / grid_size);
            let p_film = Point2f::new(
                (i as Float + 0.5) / grid_size as Float * 2.0 - 1.0,
                (j as Float + 0.5) / grid_size as Float * 2.0 - 1.0
            );
            let mut rng = Rng::for_sample(index, 0);
            let p_lens = rng.uniform_point2f();
            let ray = camera.generate_ray(&CameraSample { p_film, p_lens }, &mut rng);
            if ray.is_valid() { 1 } else { 0 }
        })
        .sum();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let profile = camera.profile();
    writeln!(out, "Lens: {} ({})", profile.lens_name, profile.lens_model)?;
    writeln!(out, "Focus: {}", camera.focus())?;
    writeln!(out, "Sensor shift: {} mm", camera.sensor_shift())?;
    match camera.fstop() {
        Some(calibration) => writeln!(out, "Aperture: {}", calibration)?,
        None => writeln!(out, "Aperture radius: {} mm", camera.aperture_radius())?,
    }
    writeln!(out, "Accepted rays: {} / {}", accepted, grid_size * grid_size)?;

    let stats = StatsAccumulator::instance();
    stats.accumulate();
    stats.print(&mut out)
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: {} <profile> [grid size]", args[0]);
        process::exit(2);
    }
    let grid_size = match args.get(2).map(|s| s.parse::<u32>()) {
        None => DEFAULT_GRID_SIZE,
        Some(Ok(n)) if n > 0 => n,
        Some(_) => {
            eprintln!("grid size must be a positive integer");
            process::exit(2);
        }
    };

    if let Err(e) = run(&args[1], grid_size) {
        error!("{}", e);
        process::exit(1);
    }
}
