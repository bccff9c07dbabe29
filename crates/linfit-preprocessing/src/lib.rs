pub mod standardizer;
pub mod encoder;
pub mod split;

pub use standardizer::*;
pub use encoder::*;
pub use split::*;
