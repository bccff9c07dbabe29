pub mod options;
pub mod schedule;
pub mod gradient_descent;

pub use options::*;
pub use schedule::*;
pub use gradient_descent::*;
