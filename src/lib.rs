pub mod cli;
pub mod error;
pub mod filter;
pub mod join;
pub mod model;
pub mod report;
pub mod salesforce;
pub mod snapshot;
pub mod source;
