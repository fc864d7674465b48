//! The lens model contract and the registry of available models.
//!
//! A lens model is an opaque ray-transfer function fitted offline to an optical
//! prescription. The core only talks to it through `LensModel`, so adding a lens is a
//! matter of registering another implementation in a `LensDatabase`.

use super::lentil::Float;
use super::geometry::{Point2f, Point3f};
use super::light_field::LightFieldState;
use super::coordinates::PupilSurface;
use hashbrown::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque key of a lens model.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LensModelId(pub u32);

impl fmt::Display for LensModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Fixed optical data of a lens model, lengths in millimeters.
#[derive(Debug, Clone, PartialEq)]
pub struct LensConstants {
    pub name: String,
    pub focal_length: Float,
    pub outer_pupil: PupilSurface,
    pub inner_pupil: PupilSurface,
    /// Distance from the unshifted sensor to the inner pupil.
    pub back_focal_length: Float,
    pub aperture_housing_radius: Float
}

/// Result of the forward aperture solve.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct ApertureSample {
    /// Sensor state with the solved direction.
    pub sensor: LightFieldState,
    /// State at the aperture reached by that direction.
    pub aperture: LightFieldState,
    /// 0 when the solve did not converge.
    pub transmittance: Float
}

/// Result of the backward aperture solve.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct BackwardSample {
    /// Sensor state on the unshifted reference plane.
    pub sensor: LightFieldState,
    /// State on the outer pupil.
    pub outer: LightFieldState,
    /// 0 when no valid path exists.
    pub transmittance: Float
}

pub trait LensModel: Send + Sync {
    fn constants(&self) -> &LensConstants;

    /// Propagate a sensor-side state to the outer pupil, returning the transmittance.
    fn evaluate(&self, input: &LightFieldState) -> (LightFieldState, Float);

    /// Solve the sensor direction so that the ray leaving `sensor` (after moving
    /// `sensor_shift` along it) passes through `aperture_point`.
    fn sample_aperture(&self, sensor: &LightFieldState, aperture_point: &Point2f, sensor_shift: Float) -> ApertureSample;

    /// Solve for the sensor state of the path from `scene` (lens frame, millimeters)
    /// through `aperture_point`.
    fn sample_aperture_backward(&self, scene: &Point3f, aperture_point: &Point2f, wavelength: Float) -> BackwardSample;
}

/// Registry of lens models keyed by id.
#[derive(Default, Clone)]
pub struct LensDatabase {
    models: HashMap<LensModelId, Arc<dyn LensModel>>
}

impl LensDatabase {
    pub fn new() -> LensDatabase {
        LensDatabase::default()
    }

    /// Register a model, returning the one previously stored under `id`.
    pub fn register(&mut self, id: LensModelId, model: Arc<dyn LensModel>) -> Option<Arc<dyn LensModel>> {
        let previous = self.models.insert(id, model);
        if previous.is_some() {
            warn!("Lens model {} registered twice, replacing it", id);
        }
        previous
    }

    pub fn get(&self, id: LensModelId) -> Option<Arc<dyn LensModel>> {
        self.models.get(&id).cloned()
    }

    pub fn find_by_name(&self, name: &str) -> Option<(LensModelId, Arc<dyn LensModel>)> {
        self.models.iter()
            .find(|(_, model)| model.constants().name == name)
            .map(|(id, model)| (*id, model.clone()))
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> Vec<LensModelId> {
        let mut ids: Vec<LensModelId> = self.models.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl fmt::Debug for LensDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.ids().into_iter().filter_map(|id|
                self.models.get(&id).map(|m| (id, m.constants().name.clone()))))
            .finish()
    }
}
