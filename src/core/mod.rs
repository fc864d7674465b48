pub mod lentil;
pub mod geometry;
pub mod rng;
pub mod sampling;
pub mod stats_accumulator;
pub mod paramset;
pub mod parser;
pub mod light_field;
pub mod coordinates;
pub mod lens_model;
pub mod evaluator;
pub mod aperture;
pub mod bokeh;
pub mod lens_profile;
pub mod tracer;
pub mod focus;
pub mod fstop;
pub mod camera;
