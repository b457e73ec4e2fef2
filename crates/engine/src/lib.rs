//! Permanent-deletion engine for wiki pages.
//!
//! The [`Purger`] removes a page together with its revisions, content,
//! link tables, logs and file artifacts:
//! - Eligibility is checked before any transaction opens
//! - Every relational deletion runs in one metadata transaction
//! - Shared content units are deleted only when no other revision uses them
//! - Artifacts, link-cache invalidation and category refreshes follow commit

pub mod artifacts;
pub mod content;
pub mod eligibility;
pub mod error;
pub mod link_cache;
pub mod planner;
pub mod refresh;
pub mod resolver;
pub mod stats;

pub use artifacts::{ArtifactPlan, ArtifactPurger, ArtifactReport};
pub use content::{ContentPurger, LegacyContentPurger, MultiUnitContentPurger};
pub use eligibility::{PurgeCandidate, check_eligibility};
pub use error::{ArtifactPurgeFailure, IneligibleReason, PurgeError, PurgeResult};
pub use link_cache::{LinkCache, NullLinkCache};
pub use planner::{Authorization, PurgeOutcome, PurgePreview, Purger};
pub use refresh::{
    RefreshOutcome, RefreshQueue, RefreshReport, RefreshWorker, refresh_category, refresh_channel,
};
pub use resolver::SharedContentResolver;
pub use stats::CascadeStats;
