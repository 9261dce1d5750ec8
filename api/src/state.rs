//! Application state: the service graph shared by every worker

use std::sync::Arc;

use vx_core::repositories::{BusinessRepository, RightsRepository, UserRepository};
use vx_core::services::{
    AuthService, AuthServiceConfig, Authorizer, BusinessService, GuardService, OtpNotifier,
    OtpService, OtpServiceConfig, PasswordHasher, RightsService, TokenService, TokenServiceConfig,
    UserService,
};
use vx_infra::MemoryStore;
use vx_shared::config::AuthConfig;

/// The persistence backend the application runs on
pub trait Repositories: 'static {
    type Users: UserRepository + 'static;
    type Businesses: BusinessRepository + 'static;
    type Rights: RightsRepository + 'static;
}

/// In-process tables; one store backs all three repositories
pub struct InMemory;

impl Repositories for InMemory {
    type Users = MemoryStore;
    type Businesses = MemoryStore;
    type Rights = MemoryStore;
}

#[cfg(feature = "mysql")]
pub use mysql_backend::MySql;

#[cfg(feature = "mysql")]
mod mysql_backend {
    use vx_infra::database::{MySqlBusinessRepository, MySqlRightsRepository, MySqlUserRepository};

    /// MySQL through the sqlx pool
    pub struct MySql;

    impl super::Repositories for MySql {
        type Users = MySqlUserRepository;
        type Businesses = MySqlBusinessRepository;
        type Rights = MySqlRightsRepository;
    }
}

/// Services shared across workers
pub struct AppState<P: Repositories> {
    pub auth: Arc<AuthService<P::Users>>,
    pub otp: Arc<OtpService<P::Users>>,
    pub users: Arc<UserService<P::Users>>,
    pub businesses: Arc<BusinessService<P::Businesses, P::Rights, P::Users>>,
    pub rights: Arc<RightsService<P::Businesses, P::Rights, P::Users>>,
    pub guard: Arc<GuardService<P::Users>>,
}

impl<P: Repositories> AppState<P> {
    /// Wire the services over the given repositories
    pub fn new(
        users: Arc<P::Users>,
        businesses: Arc<P::Businesses>,
        rights: Arc<P::Rights>,
        notifier: Arc<dyn OtpNotifier>,
        config: &AuthConfig,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(TokenServiceConfig::from(&config.jwt)));
        let hasher = PasswordHasher::new(config.password.bcrypt_cost);
        let otp = Arc::new(OtpService::new(
            users.clone(),
            notifier,
            OtpServiceConfig::from(&config.otp),
        ));
        let auth = Arc::new(AuthService::new(
            users.clone(),
            tokens.clone(),
            otp.clone(),
            hasher,
            AuthServiceConfig::default(),
        ));
        let authority = Arc::new(RightsService::new(businesses.clone(), rights, users.clone()));

        Self {
            auth,
            otp,
            users: Arc::new(UserService::new(users.clone(), hasher)),
            businesses: Arc::new(BusinessService::new(businesses, authority.clone())),
            rights: authority,
            guard: Arc::new(GuardService::new(users, tokens)),
        }
    }

    /// The guard as the object the middleware resolves from app data
    pub fn authorizer(&self) -> Arc<dyn Authorizer> {
        self.guard.clone()
    }
}

impl AppState<InMemory> {
    /// State over a fresh in-memory store
    pub fn in_memory(
        store: MemoryStore,
        notifier: Arc<dyn OtpNotifier>,
        config: &AuthConfig,
    ) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store.clone(), store, notifier, config)
    }
}
