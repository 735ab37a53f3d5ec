pub mod error;

pub use error::{MapError, Result};
