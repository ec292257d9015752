//! Registration code allocators.
//!
//! [`CountingRegistrationAllocator`] reads the current number of users and
//! derives the next code from it. Two registrations that read the same count
//! before either is stored receive the same code; the store does nothing to
//! prevent it.
//!
//! [`SequenceRegistrationAllocator`] draws the ordinal from an atomically
//! incremented sequence instead, so concurrent registrations never collide.
//! Both share the encoding in [`AssignedCode`] and the fallback policy: a
//! failed or nonsensical read yields a [`FallbackCode`] stamped with the
//! clock's current time, never an error.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::ports::{RegistrationCodeAllocator, RegistrationSequence, UserCountSource};
use crate::domain::{AssignedCode, FallbackCode, RegistrationCode};

/// Which allocator the application wires in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// Atomic store-owned sequence.
    #[default]
    Sequence,
    /// Fresh count read per allocation.
    Count,
}

/// Unrecognised allocation strategy label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown allocation strategy `{0}`; expected `sequence` or `count`")]
pub struct UnknownAllocationStrategy(pub String);

impl FromStr for AllocationStrategy {
    type Err = UnknownAllocationStrategy;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sequence" => Ok(Self::Sequence),
            "count" => Ok(Self::Count),
            _ => Err(UnknownAllocationStrategy(raw.to_owned())),
        }
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence => f.write_str("sequence"),
            Self::Count => f.write_str("count"),
        }
    }
}

fn fallback(clock: &dyn Clock, reason: &str, detail: &dyn fmt::Display) -> RegistrationCode {
    let code = FallbackCode::new(clock.utc());
    warn!(
        %code,
        reason,
        detail = %detail,
        "issuing fallback registration code; reconcile once numbering recovers"
    );
    code.into()
}

/// Allocator deriving codes from the current user count.
#[derive(Clone)]
pub struct CountingRegistrationAllocator<S> {
    source: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> CountingRegistrationAllocator<S> {
    /// Create an allocator reading counts from `source`.
    pub fn new(source: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { source, clock }
    }
}

#[async_trait]
impl<S> RegistrationCodeAllocator for CountingRegistrationAllocator<S>
where
    S: UserCountSource,
{
    async fn next_code(&self) -> RegistrationCode {
        let count = match self.source.count_users().await {
            Ok(count) => count,
            Err(err) => return fallback(self.clock.as_ref(), "count_unavailable", &err),
        };

        match u64::try_from(count) {
            Ok(count) => {
                let code = AssignedCode::for_count(count);
                debug!(count, %code, "derived registration code from user count");
                code.into()
            }
            Err(_) => fallback(self.clock.as_ref(), "invalid_count", &count),
        }
    }
}

/// Allocator drawing ordinals from an atomic sequence.
#[derive(Clone)]
pub struct SequenceRegistrationAllocator<Q> {
    sequence: Arc<Q>,
    clock: Arc<dyn Clock>,
}

impl<Q> SequenceRegistrationAllocator<Q> {
    /// Create an allocator advancing `sequence` once per code.
    pub fn new(sequence: Arc<Q>, clock: Arc<dyn Clock>) -> Self {
        Self { sequence, clock }
    }
}

#[async_trait]
impl<Q> RegistrationCodeAllocator for SequenceRegistrationAllocator<Q>
where
    Q: RegistrationSequence,
{
    async fn next_code(&self) -> RegistrationCode {
        let ordinal = match self.sequence.next_ordinal().await {
            Ok(ordinal) => ordinal,
            Err(err) => return fallback(self.clock.as_ref(), "sequence_unavailable", &err),
        };

        let code = u64::try_from(ordinal)
            .ok()
            .and_then(|ordinal| AssignedCode::from_ordinal(ordinal).ok());
        match code {
            Some(code) => {
                debug!(ordinal, %code, "derived registration code from sequence");
                code.into()
            }
            None => fallback(self.clock.as_ref(), "invalid_ordinal", &ordinal),
        }
    }
}
