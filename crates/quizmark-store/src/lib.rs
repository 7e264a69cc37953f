//! quizmark-store — Question and response store adapters.
//!
//! Implements the `QuestionStore` and `ResponseStore` traits for an in-memory
//! store and a hosted REST database, plus configuration loading.

pub mod config;
pub mod memory;
pub mod rest;

pub use config::{create_stores, load_config_from, QuizmarkConfig, StoreConfig, Stores};
pub use memory::InMemoryStore;
pub use rest::RestStore;
