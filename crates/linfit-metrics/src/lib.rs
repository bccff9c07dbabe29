pub mod regression;
pub mod classification;

pub use regression::*;
pub use classification::*;
