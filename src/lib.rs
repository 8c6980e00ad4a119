pub mod collate;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod fields;
pub mod logging;
pub mod pipeline;
pub mod reconcile;
pub mod storage;
