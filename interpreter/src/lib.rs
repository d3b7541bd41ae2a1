pub mod compiler;
pub mod directive;
pub mod error;
pub mod executor;
pub mod instruction;
pub mod library;

pub use error::RunError;
pub use executor::{MAX_DEPTH, execute_program, execute_program_with, render};
pub use library::Library;
