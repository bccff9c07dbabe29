pub mod model;
pub mod regression;
pub mod logistic;
pub mod multinomial;

pub use model::*;
pub use regression::*;
pub use logistic::*;
pub use multinomial::*;
