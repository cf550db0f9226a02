//! Multi-criteria supplier ranking: min-max normalized weighted scoring (or
//! a loaded feed-forward model), selection analysis, a JSON supplier store
//! and a run history.

pub mod config;
pub mod history;
pub mod optimize;
pub mod output;
pub mod sample;
pub mod scoring;
pub mod supplier;
