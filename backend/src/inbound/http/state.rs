//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` so they depend only on
//! driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{RegistrationReconciliationCommand, UserRegistrationCommand};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registers new users.
    pub registrations: Arc<dyn UserRegistrationCommand>,
    /// Reissues fallback codes.
    pub reconciliation: Arc<dyn RegistrationReconciliationCommand>,
}

impl HttpState {
    /// Bundle the driving ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use registrar::domain::{
    ///     RegistrationReconciliationService, SequenceRegistrationAllocator,
    ///     UserRegistrationService,
    /// };
    /// use registrar::inbound::http::state::HttpState;
    /// use registrar::outbound::memory::InMemoryUserStore;
    ///
    /// let store = Arc::new(InMemoryUserStore::new());
    /// let allocator = Arc::new(SequenceRegistrationAllocator::new(
    ///     store.clone(),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(
    ///     Arc::new(UserRegistrationService::new(
    ///         store.clone(),
    ///         allocator.clone(),
    ///         Arc::new(DefaultClock),
    ///     )),
    ///     Arc::new(RegistrationReconciliationService::new(store, allocator)),
    /// );
    /// let _registrations = state.registrations.clone();
    /// ```
    pub fn new(
        registrations: Arc<dyn UserRegistrationCommand>,
        reconciliation: Arc<dyn RegistrationReconciliationCommand>,
    ) -> Self {
        Self {
            registrations,
            reconciliation,
        }
    }
}
