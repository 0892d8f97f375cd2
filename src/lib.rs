pub mod config;
pub mod errors;
pub mod html;
pub mod quality;
pub mod report;
pub mod store;
pub mod variation;
