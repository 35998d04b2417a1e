pub mod clock;
pub mod observable;
pub mod timer;

pub use clock::*;
pub use observable::*;
pub use timer::*;
