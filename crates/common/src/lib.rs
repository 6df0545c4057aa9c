pub mod envelope;
pub mod error;
pub mod status;

pub use envelope::Envelope;
pub use error::{Error, Result};
pub use status::{ClaimStatus, Outcome, PipelineStage, ReviewTier, StatusVocabulary};
