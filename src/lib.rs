pub mod analysis;
pub mod config;
pub mod countries;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod plot;

pub use error::{PipelineError, Result};
