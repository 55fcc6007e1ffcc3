//! Expression evaluation and statement execution (§4.6 "Evaluation").

pub mod aggregate;
pub mod executor;
pub mod expr;
pub mod result;

pub use executor::evaluate;
pub use result::{EvalResult, ResultRow};
