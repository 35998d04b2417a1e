pub mod kalman;
pub mod projection;
pub mod vec;

pub use kalman::*;
pub use projection::*;
pub use vec::*;
