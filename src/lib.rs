//! Download exome variant calls, annotate them with ClinVar and flatten them into one table.

pub mod annotate;
pub mod common;
pub mod config;
pub mod download;
pub mod error;
pub mod pipeline;

pub use error::Error;
