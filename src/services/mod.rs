//! Service layer: the round loop and its collaborators.

pub mod classifier;
pub mod executor;
pub mod presenter;
pub mod scheduler;

pub use classifier::{strip_valid_header, StreamClassifier};
pub use executor::{RoundExecutor, ROUND_PROMPT, SYSTEM_PROMPT};
pub use presenter::DisplayPresenter;
pub use scheduler::RoundScheduler;
