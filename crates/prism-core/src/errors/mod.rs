mod prism_error;
mod weight_error;

pub use prism_error::{PrismError, PrismResult};
pub use weight_error::WeightError;
