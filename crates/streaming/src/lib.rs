pub mod asset;
pub mod ion;
pub mod residency;
pub mod service;

pub use asset::*;
pub use ion::*;
pub use residency::*;
pub use service::*;
