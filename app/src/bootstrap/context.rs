use std::sync::Arc;

use petfinder_adapters::{
    incoming::{
        auth_store::store::AuthStore,
        queries::{
            cache::{QueryClient, QueryOptions},
            hooks::AuthQueries,
        },
    },
    outgoing::{
        supabase_reqwest::{auth_repository_supabase::SupabaseAuthAdapter, http::SupabaseSettings},
        tokio_spawn::TokioTaskSpawnAdapter,
    },
};
use petfinder_application::{
    auth::service::AuthService,
    error::{AppError, AppResult},
    infrastructure_config::Config,
    ports::{
        incoming::auth::AuthUseCase,
        outgoing::{auth_repository::AuthRepositoryPort, task_spawn::DynTaskSpawnPort},
    },
};

/// Everything the running client needs, wired once at startup.
pub struct AppContext {
    pub config: Arc<Config>,
    pub auth_service: Arc<dyn AuthUseCase>,
    pub auth_store: Arc<AuthStore>,
    pub auth_queries: Arc<AuthQueries>,
    pub query_client: Arc<QueryClient>,
    pub task_spawn: DynTaskSpawnPort,
}

impl AppContext {
    /// Must be called from within a tokio runtime.
    pub fn new(config: Config) -> AppResult<Self> {
        let config = Arc::new(config);

        let auth_service = Self::create_auth_service(&config)?;
        let auth_store = Arc::new(AuthStore::new(Arc::clone(&auth_service)));
        let query_client = Arc::new(QueryClient::new(QueryOptions::from_config(&config.query)));
        let auth_queries = Arc::new(AuthQueries::new(
            Arc::clone(&auth_store),
            Arc::clone(&auth_service),
            Arc::clone(&query_client),
        ));
        let task_spawn = Self::create_task_spawn()?;

        Ok(Self {
            config,
            auth_service,
            auth_store,
            auth_queries,
            query_client,
            task_spawn,
        })
    }

    fn create_auth_service(config: &Config) -> AppResult<Arc<dyn AuthUseCase>> {
        let settings = SupabaseSettings::from_config(config)?;
        let auth_repository: Arc<dyn AuthRepositoryPort> =
            Arc::new(SupabaseAuthAdapter::new(&settings)?);
        Ok(Arc::new(AuthService::new(auth_repository)))
    }

    fn create_task_spawn() -> AppResult<DynTaskSpawnPort> {
        let spawner = TokioTaskSpawnAdapter::current().ok_or_else(|| AppError::ConfigError {
            message: "Application context requires a running tokio runtime".to_string(),
        })?;
        Ok(Arc::new(spawner))
    }
}
