use petfinder_application::infrastructure_config::{Config, QueryConfig, SessionConfig};
use tracing::info;

pub fn print_startup_info(config: &Config) {
    print_backend_info(config);
    print_session_info(&config.session);
    print_query_info(&config.query);
}

fn print_backend_info(config: &Config) {
    info!("🔌 Supabase project: {}", config.supabase.url);
    info!("  🔑 Anon key: [REDACTED]");
    info!(
        "  🗂️  Profiles table: {}, avatar bucket: {}",
        config.supabase.profiles_table, config.supabase.avatar_bucket
    );
    match config.supabase.request_timeout_secs {
        Some(secs) => info!("  ⏱️  Request timeout: {}s", secs),
        None => info!("  ⏱️  Request timeout: client default"),
    }
    info!("  🔁 Redirects back to: {}", config.site.site_url);
}

fn print_session_info(session: &SessionConfig) {
    info!(
        "🔐 Session refresh: every {}s, {}s before expiry",
        session.refresh_tick_secs, session.refresh_margin_secs
    );
}

fn print_query_info(query: &QueryConfig) {
    info!(
        "📦 Query cache: stale after {}s, collected after {}s",
        query.stale_time_secs, query.gc_time_secs
    );
}
