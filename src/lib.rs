pub mod analysis;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod exit;
pub mod export;
pub mod extract;
pub mod index;
pub mod model;
pub mod ngram;
pub mod reporting;
pub mod units;
pub mod vector;
