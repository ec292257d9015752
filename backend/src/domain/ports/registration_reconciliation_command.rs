//! Driving port for reissuing fallback registration codes.

use async_trait::async_trait;

use crate::domain::{AssignedCode, Error, RegistrationCode, UserId};

/// A user whose fallback code was replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReissuedCode {
    /// Account that was updated.
    pub user_id: UserId,
    /// Fallback code that was replaced.
    pub previous: RegistrationCode,
    /// Newly issued code.
    pub replacement: AssignedCode,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    /// Codes replaced during the pass, in processing order.
    pub reissued: Vec<ReissuedCode>,
    /// Users still holding fallback codes once the pass finished, including
    /// those beyond the batch limit.
    pub pending: usize,
}

/// Domain use-case port for the reconciliation job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationReconciliationCommand: Send + Sync {
    /// Reissue well-formed codes to users holding fallback codes.
    async fn reconcile(&self) -> Result<ReconciliationReport, Error>;
}
