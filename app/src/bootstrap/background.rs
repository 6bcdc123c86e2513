use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use petfinder_adapters::incoming::queries::cache::QueryClient;
use petfinder_application::{
    error::AppResult, infrastructure_config::SessionConfig, ports::incoming::auth::AuthUseCase,
};

/// Keeps the stored session alive by refreshing it shortly before it
/// expires. A successful refresh is announced as `TOKEN_REFRESHED`, which
/// the store listener turns into a re-initialization.
pub struct SessionRefresher {
    auth_use_case: Arc<dyn AuthUseCase>,
    tick: Duration,
    margin: time::Duration,
}

impl SessionRefresher {
    pub fn new(auth_use_case: Arc<dyn AuthUseCase>, config: &SessionConfig) -> Self {
        Self {
            auth_use_case,
            tick: Duration::from_secs(config.refresh_tick_secs),
            margin: config.refresh_margin(),
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.refresh_if_due(OffsetDateTime::now_utc()).await {
                    warn!(error = %e, "Background session refresh failed");
                }
            }
        })
    }

    /// Returns whether a refresh was performed.
    pub async fn refresh_if_due(&self, now: OffsetDateTime) -> AppResult<bool> {
        let Some(session) = self.auth_use_case.get_session().await? else {
            return Ok(false);
        };
        if !session.expires_within(now, self.margin) {
            return Ok(false);
        }

        debug!(user_id = %session.user.id, expires_at = %session.expires_at, "Refreshing session");
        let refreshed = self.auth_use_case.refresh_session().await?;
        Ok(refreshed.is_some())
    }
}

/// Periodically drops cache entries nobody has read within `gc_time`.
pub fn spawn_query_gc(client: Arc<QueryClient>) -> JoinHandle<()> {
    let period = client.options().gc_time.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = client.collect_garbage();
            if removed > 0 {
                info!(removed, "Collected expired query cache entries");
            }
        }
    })
}
