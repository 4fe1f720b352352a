//! Remote model training on Kaggle.
//!
//! A training run is a Kaggle script kernel rendered from a template,
//! pushed through the Kaggle REST API, then polled until it finishes.
//! Dataset archives uploaded by reviewers are unpacked locally first.

pub mod api;
pub mod dataset;
pub mod error;
pub mod notebook;
pub mod poll;

pub use api::{KaggleApi, KernelPush, KernelStatus, PushResponse};
pub use error::TrainingError;
pub use poll::{wait_for_completion, PollConfig, StatusSource};
