//! Typed camera settings, built once per render from a parameter set.

use super::lentil::Float;
use super::paramset::ParamSet;
use super::coordinates::{PupilGeometry, PupilSurface};
use super::lens_model::{LensConstants, LensDatabase, LensModelId};
use super::bokeh::BokehSettings;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

/// Scene unit system. Lens models work in millimeters.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnitSystem {
    Millimeters,
    Centimeters,
    Decimeters,
    Meters
}

impl UnitSystem {
    /// Scene units per millimeter.
    pub fn scale(self) -> Float {
        match self {
            UnitSystem::Millimeters => 1.0,
            UnitSystem::Centimeters => 0.1,
            UnitSystem::Decimeters => 0.01,
            UnitSystem::Meters => 0.001,
        }
    }
}

impl FromStr for UnitSystem {
    type Err = io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mm" => Ok(UnitSystem::Millimeters),
            "cm" => Ok(UnitSystem::Centimeters),
            "dm" => Ok(UnitSystem::Decimeters),
            "m" => Ok(UnitSystem::Meters),
            _ => Err(io::Error::new(io::ErrorKind::InvalidData, format!("unknown units \"{}\"", s)))
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitSystem::Millimeters => "mm",
            UnitSystem::Centimeters => "cm",
            UnitSystem::Decimeters => "dm",
            UnitSystem::Meters => "m",
        };
        write!(f, "{}", name)
    }
}

/// How the sensor shift for a focus distance is found.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FocusMethod {
    /// Average of backward-traced estimates.
    Average,
    /// Scan of candidate shifts.
    Logarithmic
}

impl FromStr for FocusMethod {
    type Err = io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "average" => Ok(FocusMethod::Average),
            "logarithmic" => Ok(FocusMethod::Logarithmic),
            _ => Err(io::Error::new(io::ErrorKind::InvalidData, format!("unknown focus method \"{}\"", s)))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LensProfile {
    pub lens_model: LensModelId,
    pub lens_name: String,
    pub outer_pupil: PupilSurface,
    pub inner_pupil: PupilSurface,
    pub back_focal_length: Float,
    pub aperture_housing_radius: Float,
    /// Sensor width in millimeters.
    pub sensor_width: Float,
    pub units: UnitSystem,
    pub vignetting_retries: u32,
    pub bokeh: BokehSettings,
    /// Sensor shift in millimeters, set by focusing.
    pub sensor_shift: Float,
    /// Wavelength in micrometers.
    pub wavelength: Float,
    pub enable_dof: bool,
    /// Aperture radius in millimeters, calibrated from `fstop` when that is set.
    pub aperture_radius: Float,
    /// Requested f-number, 0 to use `aperture_radius` as given.
    pub fstop: Float,
    /// Focus distance in scene units, `<= 0` focuses at infinity.
    pub focus_distance: Float,
    /// Added to the computed sensor shift, millimeters.
    pub extra_sensor_shift: Float,
    pub focus_method: FocusMethod
}

/// Apply `<prefix>_geometry`, `<prefix>_radius` and `<prefix>_curvature_radius` to a
/// pupil. A curved pupil needs a non-zero curvature radius.
fn read_pupil_overrides(params: &ParamSet, prefix: &str, pupil: &mut PupilSurface) -> io::Result<()> {
    if let Some(geometry) = params.find_string(&format!("{}_geometry", prefix)).and_then(|v| v.first()) {
        pupil.geometry = geometry.parse::<PupilGeometry>()?;
    }
    pupil.radius = params.find_one_float(&format!("{}_radius", prefix), pupil.radius);
    pupil.curvature_radius = params.find_one_float(&format!("{}_curvature_radius", prefix), pupil.curvature_radius);

    if !(pupil.radius > 0.0) {
        error!("Invalid {}: radius {} must be positive", prefix, pupil.radius);
        return Err(io::Error::new(io::ErrorKind::InvalidData,
            format!("{}_radius must be positive", prefix)));
    }
    if pupil.geometry != PupilGeometry::Plane && (pupil.curvature_radius == 0.0 || !pupil.curvature_radius.is_finite()) {
        error!("Invalid {}: {} geometry needs a non-zero \"{}_curvature_radius\"", prefix, pupil.geometry, prefix);
        return Err(io::Error::new(io::ErrorKind::InvalidData,
            format!("{} geometry {} without a curvature radius", prefix, pupil.geometry)));
    }
    Ok(())
}

impl LensProfile {
    /// Profile with default settings for a lens model.
    pub fn for_model(id: LensModelId, constants: &LensConstants) -> LensProfile {
        LensProfile {
            lens_model: id,
            lens_name: constants.name.clone(),
            outer_pupil: constants.outer_pupil,
            inner_pupil: constants.inner_pupil,
            back_focal_length: constants.back_focal_length,
            aperture_housing_radius: constants.aperture_housing_radius,
            sensor_width: 36.0,
            units: UnitSystem::Centimeters,
            vignetting_retries: 15,
            bokeh: BokehSettings::default(),
            sensor_shift: 0.0,
            wavelength: 0.55,
            enable_dof: true,
            aperture_radius: constants.aperture_housing_radius,
            fstop: 0.0,
            focus_distance: 150.0,
            extra_sensor_shift: 0.0,
            focus_method: FocusMethod::Average
        }
    }

    pub fn from_params(params: &ParamSet, database: &LensDatabase) -> io::Result<LensProfile> {
        let lens = params.find_one_string("lens_model", "thin_lens_50mm");
        let (id, model) = match database.find_by_name(&lens) {
            Some(found) => found,
            None => {
                let by_id = lens.parse::<u32>().ok()
                    .and_then(|id| database.get(LensModelId(id)).map(|m| (LensModelId(id), m)));
                match by_id {
                    Some(found) => found,
                    None => {
                        error!("Lens model \"{}\" is not in the lens database", lens);
                        return Err(io::Error::new(io::ErrorKind::InvalidData,
                            format!("unknown lens model \"{}\"", lens)));
                    }
                }
            }
        };

        let mut profile = LensProfile::for_model(id, model.constants());
        profile.units = params.find_one_string("units", "cm").parse()?;
        profile.sensor_width = params.find_one_float("sensor_width", profile.sensor_width);
        profile.wavelength = params.find_one_float("wavelength", 550.0) * 0.001;
        profile.enable_dof = params.find_one_bool("enable_dof", profile.enable_dof);
        profile.fstop = params.find_one_float("fstop", profile.fstop);
        profile.focus_distance = params.find_one_float("focus_distance", profile.focus_distance);
        profile.extra_sensor_shift = params.find_one_float("extra_sensor_shift", 0.0);
        profile.aperture_radius = params.find_one_float("aperture_radius", profile.aperture_radius);
        profile.focus_method = params.find_one_string("focus_method", "average").parse()?;

        let retries = params.find_one_int("vignetting_retries", profile.vignetting_retries as i32);
        if retries < 0 {
            warn!("\"vignetting_retries\" {} is negative, using 0", retries);
        }
        profile.vignetting_retries = retries.max(0) as u32;

        let blades = params.find_one_int("bokeh_aperture_blades", 0);
        profile.bokeh.aperture_blades = blades.max(0) as u32;
        profile.bokeh.enable_image = params.find_one_bool("bokeh_enable_image", false);
        let image_path = params.find_one_string("bokeh_image_path", "");
        profile.bokeh.image_path = if image_path.is_empty() { None } else { Some(PathBuf::from(image_path)) };

        read_pupil_overrides(params, "outer_pupil", &mut profile.outer_pupil)?;
        read_pupil_overrides(params, "inner_pupil", &mut profile.inner_pupil)?;

        if !(profile.sensor_width > 0.0) || !(profile.wavelength > 0.0) || profile.aperture_radius < 0.0 {
            error!("Invalid lens profile: sensor_width {}, wavelength {}um, aperture_radius {}",
                profile.sensor_width, profile.wavelength, profile.aperture_radius);
            return Err(io::Error::new(io::ErrorKind::InvalidData,
                "sensor_width and wavelength must be positive, aperture_radius non-negative"));
        }

        params.report_unused();
        Ok(profile)
    }

    /// Focus distance in millimeters, `None` for infinity.
    pub fn focus_distance_mm(&self) -> Option<Float> {
        if self.focus_distance > 0.0 {
            Some(self.focus_distance / self.units.scale())
        } else {
            None
        }
    }
}
