mod error;
mod rules;
mod traits;

pub use error::{Result, ValidationError};
pub use rules::RuleValidator;
pub use traits::Validator;
