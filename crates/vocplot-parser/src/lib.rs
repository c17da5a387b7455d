pub mod errors;
pub mod model;
mod reader;
pub mod schema;

pub use errors::ParserError;
pub use model::ParsedObservations;
pub use reader::{parse_observations, read_observation_file};

#[cfg(test)]
mod tests;
