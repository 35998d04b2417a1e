pub mod cache;
pub mod protocol;
pub mod request;
pub mod residency;
pub mod source;
pub mod window;

pub use cache::*;
pub use protocol::*;
pub use request::*;
pub use residency::*;
pub use source::*;
pub use window::*;
