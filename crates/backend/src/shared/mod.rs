pub mod config;
pub mod excel;
pub mod format;
