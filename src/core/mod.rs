//! Configuration, error types, language models and the NiuTrans backend

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod retry;
