// Library root: the pipeline stages are public so they can be tested and
// composed on their own.

pub mod cli;
pub mod config;
pub mod data;
pub mod optimizer;
pub mod pipeline;
pub mod report;
pub mod valuation;
