pub mod enums;
pub mod message;
pub mod protocol;

pub use enums::*;
pub use message::*;
pub use protocol::*;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
