//! Analytic lens models that satisfy the lens database contract.

mod identity;
pub use identity::*;
mod thin_lens;
pub use thin_lens::*;

use crate::core::lens_model::{LensDatabase, LensModelId};
use std::sync::Arc;

pub const IDENTITY_LENS_ID: LensModelId = LensModelId(0);
pub const THIN_LENS_ID: LensModelId = LensModelId(1);

/// Register the built-in reference models: free space (id 0) and a 50mm ideal thin
/// lens (id 1).
pub fn register_reference_models(database: &mut LensDatabase) {
    database.register(IDENTITY_LENS_ID, Arc::new(IdentityLens::default()));
    database.register(THIN_LENS_ID, Arc::new(ThinLens::default()));
}
