//! Harvest core: pure data model and convergence state machine.
//!
//! Everything in this crate is deterministic and IO-free so the harvesting
//! policy can be tested without a browser.
mod item;
mod links;
mod mentions;
mod result;
mod result_set;
mod session;

pub use item::{ContentType, FollowerHandle, Identified, PostSummary, ProfileStats};
pub use links::normalize_post_link;
pub use mentions::mentions_from_caption;
pub use result::HarvestResult;
pub use result_set::ResultSet;
pub use session::{
    ConvergencePolicy, HarvestSession, RoundDecision, SessionState, StopReason,
};
