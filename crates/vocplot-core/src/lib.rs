pub mod aggregate;
pub mod charts;
pub mod compounds;
pub mod config;
pub mod driver;
pub mod error;
mod frame;
pub mod normalize;
pub mod periods;
pub mod sites;
pub mod temporal;
pub mod tiers;

pub use error::{AnalysisError, Result};
