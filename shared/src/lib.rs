pub mod models;
pub mod prompt;
