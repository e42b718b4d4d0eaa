pub mod error;
pub mod input;
pub mod octave;
pub mod output;
pub mod parser;
pub mod report;
pub mod summary;

pub use error::{ConvertError, Result};
pub use report::{ConvertOptions, MissingRecordPolicy, convert_directory};
