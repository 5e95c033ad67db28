pub mod evidence;
pub mod history;
pub mod normalizer;
pub mod render;
pub mod social;
pub mod synthesizer;
pub mod traits;
pub mod verifier;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use history::HistoryStore;
pub use verifier::{RunOutcome, VerificationRun, Verifier};
