pub mod api_connection;
pub mod cli;
pub mod config;
pub mod pantry;
pub mod recipe_request;
pub mod recipe_response;
pub mod recipe_session;
pub mod repl;
pub mod store;
pub mod workspace;
