//! quizmark-core — Answer evaluator, evaluation service, and request boundary.
//!
//! This crate defines the data model, the keyword-overlap scorer, the store
//! traits it is persisted through, and the HTTP-style boundary around it.

pub mod boundary;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod report;
pub mod service;
pub mod statistics;
pub mod traits;
