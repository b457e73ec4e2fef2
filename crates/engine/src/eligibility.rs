//! Eligibility rules for permanent deletion.

use crate::error::IneligibleReason;
use expunge_core::PageKey;
use expunge_core::config::PurgeConfig;
use expunge_metadata::models::PageRow;

/// A page that passed the eligibility rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeCandidate {
    pub page_id: i64,
    pub key: PageKey,
    pub is_redirect: bool,
}

/// Apply the eligibility rules to a looked-up page row.
///
/// A page qualifies when it exists, has a valid non-empty title, lives in a
/// real (non-virtual) namespace, and that namespace is enabled in the
/// configuration.
pub fn check_eligibility(
    page: Option<&PageRow>,
    config: &PurgeConfig,
) -> Result<PurgeCandidate, IneligibleReason> {
    let page = page.ok_or(IneligibleReason::NotFound)?;
    if page.page_id <= 0 {
        return Err(IneligibleReason::NotFound);
    }

    let namespace = page.namespace();
    if namespace.is_virtual() {
        return Err(IneligibleReason::VirtualNamespace(namespace));
    }

    let key = page
        .key()
        .map_err(|e| IneligibleReason::InvalidTitle(e.to_string()))?;

    if !config.is_namespace_eligible(namespace) {
        return Err(IneligibleReason::NamespaceNotEligible(namespace));
    }

    Ok(PurgeCandidate {
        page_id: page.page_id,
        key,
        is_redirect: page.page_is_redirect,
    })
}
