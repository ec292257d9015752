//! Reissue well-formed codes to users registered with a fallback.
//!
//! Each pass lists fallback holders oldest first and asks the allocator for a
//! fresh code per user. A pass stops as soon as the allocator itself degrades,
//! leaving the remaining users for the next run.
//!
//! The allocator must draw from the registration sequence. Replacing a code
//! leaves the user count unchanged, so a count-derived allocator would hand
//! the same code to every holder. Deployments numbering by count wire in
//! [`DisabledReconciliation`] instead.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    ReconciliationReport, RegistrationCodeAllocator, RegistrationReconciliationCommand,
    ReissuedCode, UserRepository,
};
use crate::domain::registration_service::map_persistence_error;
use crate::domain::{AllocationStrategy, Error, RegistrationCode};

/// Maximum number of users examined per pass unless overridden.
pub const DEFAULT_RECONCILE_BATCH: usize = 100;

/// Reconciliation service implementing [`RegistrationReconciliationCommand`].
#[derive(Clone)]
pub struct RegistrationReconciliationService<U> {
    users: Arc<U>,
    allocator: Arc<dyn RegistrationCodeAllocator>,
    batch_limit: usize,
}

impl<U> RegistrationReconciliationService<U> {
    /// Create a service examining up to [`DEFAULT_RECONCILE_BATCH`] users per
    /// pass. `allocator` should be a sequence-backed allocator.
    pub fn new(users: Arc<U>, allocator: Arc<dyn RegistrationCodeAllocator>) -> Self {
        Self {
            users,
            allocator,
            batch_limit: DEFAULT_RECONCILE_BATCH,
        }
    }

    /// Override the per-pass limit. Zero is treated as one.
    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit.max(1);
        self
    }
}

#[async_trait]
impl<U> RegistrationReconciliationCommand for RegistrationReconciliationService<U>
where
    U: UserRepository,
{
    async fn reconcile(&self) -> Result<ReconciliationReport, Error> {
        let holders = self
            .users
            .list_with_fallback_codes(self.batch_limit)
            .await
            .map_err(map_persistence_error)?;

        let mut report = ReconciliationReport::default();
        let mut examined = 0;
        for user in &holders {
            let RegistrationCode::Assigned(replacement) = self.allocator.next_code().await else {
                warn!(
                    remaining = holders.len() - examined,
                    "allocator degraded; deferring reconciliation"
                );
                break;
            };
            examined += 1;

            let updated = user
                .reissue_code(replacement)
                .map_err(|err| Error::internal(err.to_string()))?;
            let swapped = self
                .users
                .replace_registration_code(
                    user.id(),
                    user.registration_code(),
                    updated.registration_code(),
                )
                .await
                .map_err(map_persistence_error)?;

            if swapped {
                report.reissued.push(ReissuedCode {
                    user_id: *user.id(),
                    previous: *user.registration_code(),
                    replacement,
                });
            } else {
                warn!(
                    user_id = %user.id(),
                    discarded = %replacement,
                    "registration code changed concurrently; skipping"
                );
            }
        }

        report.pending = match self.users.count_with_fallback_codes().await {
            Ok(remaining) => remaining,
            Err(err) => {
                let in_batch = holders.len() - examined;
                warn!(error = %err, in_batch, "could not count remaining fallback holders");
                in_batch
            }
        };
        info!(
            reissued = report.reissued.len(),
            pending = report.pending,
            "reconciliation pass finished"
        );
        Ok(report)
    }
}

/// Reconciliation stand-in for strategies that cannot reissue codes safely.
#[derive(Debug, Clone, Copy)]
pub struct DisabledReconciliation {
    strategy: AllocationStrategy,
}

impl DisabledReconciliation {
    /// Refuse every pass while `strategy` is active.
    pub fn new(strategy: AllocationStrategy) -> Self {
        Self { strategy }
    }
}

#[async_trait]
impl RegistrationReconciliationCommand for DisabledReconciliation {
    async fn reconcile(&self) -> Result<ReconciliationReport, Error> {
        warn!(strategy = %self.strategy, "reconciliation requested but disabled");
        Err(Error::service_unavailable(format!(
            "reconciliation requires the `{}` allocation strategy",
            AllocationStrategy::Sequence
        ))
        .with_details(json!({
            "code": "reconciliation_disabled",
            "strategy": self.strategy.to_string(),
        })))
    }
}
