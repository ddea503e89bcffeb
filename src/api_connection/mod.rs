pub mod connection;
pub mod endpoints;

pub use connection::{ApiConnectionError, RecipeClient};
pub use endpoints::{GenerateContentRequest, GenerationConfig, SafetySetting};
