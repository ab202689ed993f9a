pub mod extract;
pub mod validation;

pub use extract::{JsonBody, PathParam, QueryParams};
pub use validation::required;
