pub mod leagues;
pub mod service;
pub mod simplify;
pub mod types;
