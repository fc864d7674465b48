use crate::core::lentil::Float;
use crate::core::geometry::{Point2f, Point3f};
use crate::core::camera::{Camera, CameraSample};
use crate::core::lens_profile::{LensProfile, FocusMethod};
use crate::core::lens_model::LensDatabase;
use crate::core::evaluator::LensEvaluator;
use crate::core::bokeh::BokehShape;
use crate::core::tracer::{Tracer, CameraRay, OcclusionQuery, Rejection};
use crate::core::focus::{FocusSolution, camera_set_focus, camera_set_focus_infinity, logarithmic_focus_search};
use crate::core::fstop::{FStopCalibration, trace_backwards_for_fstop};
use crate::core::stats_accumulator::StatsAccumulator;
use crate::core::rng::Rng;
use crate::bokeh::create_bokeh_shape;
use std::io;

pub const STAT_VIGNETTED: &str = "Camera/Rays vignetted by lens system";
pub const STAT_ATTEMPTS: &str = "Camera/Attempts per ray";

/// Counter of rays whose last attempt failed for `rejection`.
pub fn rejection_stat(rejection: Rejection) -> String {
    format!("Camera/Rays rejected: {}", rejection)
}

/// A camera whose lens is a fitted ray-transfer model.
pub struct PolynomialCamera {
    profile: LensProfile,
    evaluator: LensEvaluator,
    bokeh: Box<dyn BokehShape>,
    focus: FocusSolution,
    fstop: Option<FStopCalibration>
}

impl PolynomialCamera {
    /// Resolve the lens model and calibrate aperture and focus for `profile`.
    pub fn new(profile: LensProfile, database: &LensDatabase) -> io::Result<PolynomialCamera> {
        let evaluator = LensEvaluator::new(database, profile.lens_model)?;
        let bokeh = create_bokeh_shape(&profile.bokeh)?;
        let mut profile = profile;

        let mut fstop = None;
        if profile.fstop > 0.0 {
            fstop = trace_backwards_for_fstop(&profile, &evaluator, profile.fstop);
            match fstop {
                Some(calibration) => {
                    profile.aperture_radius = calibration.aperture_radius.min(profile.aperture_housing_radius);
                }
                None => warn!("Could not calibrate f/{} for lens {}, keeping aperture radius {} mm",
                    profile.fstop, profile.lens_name, profile.aperture_radius),
            }
        }

        let focus = match (profile.focus_distance_mm(), profile.focus_method) {
            (None, _) => camera_set_focus_infinity(&profile, &evaluator),
            (Some(distance), FocusMethod::Average) => camera_set_focus(&profile, &evaluator, distance),
            (Some(distance), FocusMethod::Logarithmic) => logarithmic_focus_search(&profile, &evaluator, distance),
        };
        if focus.is_failed() {
            warn!("Focus calibration failed for lens {}, the sensor stays at the back focal plane", profile.lens_name);
        }
        profile.sensor_shift = focus.offset() + profile.extra_sensor_shift;

        info!("Lens {} ({}): aperture radius {} mm, sensor shift {} mm, focus {}",
            profile.lens_name, profile.lens_model, profile.aperture_radius, profile.sensor_shift, focus);
        if let Some(calibration) = fstop {
            info!("Lens {}: calibrated {}", profile.lens_name, calibration);
        }

        Ok(PolynomialCamera { profile, evaluator, bokeh, focus, fstop })
    }

    pub fn profile(&self) -> &LensProfile {
        &self.profile
    }

    pub fn focus(&self) -> FocusSolution {
        self.focus
    }

    pub fn fstop(&self) -> Option<FStopCalibration> {
        self.fstop
    }

    pub fn aperture_radius(&self) -> Float {
        self.profile.aperture_radius
    }

    fn tracer(&self) -> Tracer<'_> {
        Tracer::new(&self.profile, &self.evaluator, self.bokeh.as_ref())
    }
}

impl Camera for PolynomialCamera {
    fn generate_ray(&self, sample: &CameraSample, rng: &mut Rng) -> CameraRay {
        let ray = self.tracer().trace_ray(&sample.p_film, &sample.p_lens, rng);
        let stats = StatsAccumulator::instance();
        stats.report_percentage(STAT_VIGNETTED, if ray.is_valid() { 0 } else { 1 }, 1);
        stats.report_int_distribution(STAT_ATTEMPTS, i64::from(ray.attempts));
        if let Some(rejection) = ray.rejection {
            stats.report_counter(&rejection_stat(rejection), 1);
        }
        ray
    }

    fn sensor_position(&self, scene: &Point3f, rng: &mut Rng, occlusion: &dyn OcclusionQuery) -> Option<Point2f> {
        self.tracer().trace_backwards(scene, rng, occlusion)
    }

    fn sensor_shift(&self) -> Float {
        self.profile.sensor_shift
    }
}
