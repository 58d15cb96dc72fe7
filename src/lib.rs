pub mod analyzers;
pub mod columns;
pub mod config;
pub mod dashboard;
pub mod entry;
pub mod errors;
pub mod output;
pub mod parser;
