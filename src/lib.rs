pub mod cli;
pub mod debounce;
pub mod error;
pub mod feed;
pub mod github;
pub mod models;
pub mod types;
