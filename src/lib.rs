pub mod config;
pub mod discretization;
pub mod error;
pub mod fields;
pub mod numerics;
pub mod processing;

pub use error::{Result, RomError};
