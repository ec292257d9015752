//! Adapter selection and HTTP state assembly.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use registrar::domain::ports::{
    RegistrationCodeAllocator, RegistrationReconciliationCommand, RegistrationSequence,
    UserCountSource, UserRepository,
};
use registrar::domain::{
    AllocationStrategy, CountingRegistrationAllocator, DisabledReconciliation,
    RegistrationReconciliationService, SequenceRegistrationAllocator, UserRegistrationService,
};
use registrar::inbound::http::state::HttpState;
use registrar::outbound::memory::InMemoryUserStore;
use registrar::outbound::persistence::{
    DbPool, DieselRegistrationSequence, DieselUserRepository, MigrationError, PoolConfig,
    PoolError, run_pending_migrations,
};

use super::config::{RegistrarSettings, SettingsError};

/// Failure while assembling application state.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// A setting could not be interpreted.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Migrations failed to apply.
    #[error(transparent)]
    Migrations(#[from] MigrationError),
    /// The connection pool could not be built.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Store adapters feeding the domain services.
struct Stores<U, C, Q> {
    users: Arc<U>,
    counts: Arc<C>,
    sequence: Arc<Q>,
}

fn assemble<U, C, Q>(
    stores: Stores<U, C, Q>,
    strategy: AllocationStrategy,
    reconcile_batch: usize,
    clock: Arc<dyn Clock>,
) -> HttpState
where
    U: UserRepository + 'static,
    C: UserCountSource + 'static,
    Q: RegistrationSequence + 'static,
{
    let (allocator, reconciliation): (
        Arc<dyn RegistrationCodeAllocator>,
        Arc<dyn RegistrationReconciliationCommand>,
    ) = match strategy {
        AllocationStrategy::Sequence => {
            let allocator: Arc<dyn RegistrationCodeAllocator> = Arc::new(
                SequenceRegistrationAllocator::new(stores.sequence, Arc::clone(&clock)),
            );
            let reconciliation = RegistrationReconciliationService::new(
                Arc::clone(&stores.users),
                Arc::clone(&allocator),
            )
            .with_batch_limit(reconcile_batch);
            (allocator, Arc::new(reconciliation))
        }
        AllocationStrategy::Count => (
            Arc::new(CountingRegistrationAllocator::new(
                stores.counts,
                Arc::clone(&clock),
            )),
            Arc::new(DisabledReconciliation::new(strategy)),
        ),
    };

    let registrations = UserRegistrationService::new(stores.users, allocator, clock);
    HttpState::new(Arc::new(registrations), reconciliation)
}

/// Build handler state from settings, migrating the database when one is
/// configured.
pub async fn build_http_state(
    settings: &RegistrarSettings,
    clock: Arc<dyn Clock>,
) -> Result<HttpState, StartupError> {
    let strategy = settings.allocation_strategy()?;
    let reconcile_batch = settings.reconcile_batch();

    let Some(database_url) = settings.database_url() else {
        info!(%strategy, "no database configured; using in-memory store");
        let store = Arc::new(InMemoryUserStore::new());
        let stores = Stores {
            users: Arc::clone(&store),
            counts: Arc::clone(&store),
            sequence: store,
        };
        return Ok(assemble(stores, strategy, reconcile_batch, clock));
    };

    run_pending_migrations(database_url).await?;
    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size()))
        .await?;
    info!(%strategy, pool_max_size = settings.pool_max_size(), "using PostgreSQL store");

    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let stores = Stores {
        users: Arc::clone(&users),
        counts: users,
        sequence: Arc::new(DieselRegistrationSequence::new(pool)),
    };
    Ok(assemble(stores, strategy, reconcile_batch, clock))
}
