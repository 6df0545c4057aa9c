//! FRA Claim Lifecycle
//!
//! Domain core behind the Gram Sabha dashboard: claim records, the status
//! transition engine, jurisdiction scoping and statistics aggregation.
//!
//! ## Components
//!
//! - [`ClaimStore`] - claims keyed by id, one lock per claim
//! - [`TransitionEngine`] - the lifecycle table and its checks
//! - [`statistics::aggregate`] - per-stage counts and success rate
//! - [`jurisdiction`] - gram panchayat scoping of reads and writes
//! - [`ClaimService`] - officer-facing operations combining the above

pub mod filter;
pub mod jurisdiction;
pub mod models;
pub mod repository;
pub mod service;
pub mod statistics;
pub mod store;
pub mod transition;

pub use filter::ClaimQuery;
pub use models::{
    Claim, ClaimDetailsUpdate, ClaimType, Claimant, HistoryEntry, LandDetails, MapData, NewClaim,
    OfficerProfile, ProfileUpdate,
};
pub use repository::{ClaimRepository, MemoryRepository, RedisRepository};
pub use service::ClaimService;
pub use statistics::{aggregate, Statistics};
pub use store::ClaimStore;
pub use transition::{Actor, TransitionEngine, TransitionOutcome};
