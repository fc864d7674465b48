use super::lentil::Float;
use super::light_field::LightFieldState;
use super::lens_model::{LensConstants, LensDatabase, LensModel, LensModelId};
use std::io;
use std::sync::Arc;

/// Clamp a transmittance reported by a model: negative values and NaN mean the ray
/// was fully occluded.
#[inline]
pub fn clamp_transmittance(t: Float) -> Float {
    // max() returns the other operand for NaN
    t.max(0.0)
}

/// A resolved lens model, the entry point for every transfer evaluation.
#[derive(Clone)]
pub struct LensEvaluator {
    id: LensModelId,
    model: Arc<dyn LensModel>
}

impl LensEvaluator {
    pub fn new(database: &LensDatabase, id: LensModelId) -> io::Result<LensEvaluator> {
        match database.get(id) {
            Some(model) => Ok(LensEvaluator { id, model }),
            None => {
                error!("Lens model {} is not in the lens database", id);
                Err(io::Error::new(io::ErrorKind::InvalidData, format!("unknown lens model {}", id)))
            }
        }
    }

    pub fn from_model(id: LensModelId, model: Arc<dyn LensModel>) -> LensEvaluator {
        LensEvaluator { id, model }
    }

    pub fn id(&self) -> LensModelId {
        self.id
    }

    pub fn model(&self) -> &dyn LensModel {
        self.model.as_ref()
    }

    pub fn constants(&self) -> &LensConstants {
        self.model.constants()
    }

    /// Propagate a sensor-side state to the outer pupil.
    pub fn evaluate(&self, input: &LightFieldState) -> (LightFieldState, Float) {
        let (out, transmittance) = self.model.evaluate(input);
        (out, clamp_transmittance(transmittance))
    }
}
