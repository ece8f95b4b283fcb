pub mod config;
pub mod dates;
pub mod fetch;
pub mod heuristics;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod service;
pub mod store;
