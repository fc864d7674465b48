pub mod vector2;
pub use vector2::*;
pub mod vector3;
pub use vector3::*;
pub mod point2;
pub use point2::*;
pub mod point3;
pub use point3::*;
