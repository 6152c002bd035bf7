use std::sync::Arc;

use defaultdesk_auth::{Argon2PasswordHasher, Hs256Jwt};
use defaultdesk_infra::customers::CustomerDirectory;
use defaultdesk_infra::identity::IdentityService;
use defaultdesk_infra::lifecycle::ApplicationLifecycle;
use defaultdesk_infra::repository::UnitOfWorkFactory;
use defaultdesk_infra::statistics::StatisticsEngine;

/// Services shared by all handlers.
///
/// Every service holds the same store handle; each call opens its own unit of work.
#[derive(Clone)]
pub struct AppServices {
    pub lifecycle: ApplicationLifecycle,
    pub statistics: StatisticsEngine,
    pub identity: IdentityService,
    pub customers: CustomerDirectory,
}

impl AppServices {
    pub fn new(store: Arc<dyn UnitOfWorkFactory>, jwt: Arc<Hs256Jwt>) -> Self {
        Self {
            lifecycle: ApplicationLifecycle::new(store.clone()),
            statistics: StatisticsEngine::new(store.clone()),
            identity: IdentityService::new(store.clone(), Arc::new(Argon2PasswordHasher::new()), jwt),
            customers: CustomerDirectory::new(store),
        }
    }
}
