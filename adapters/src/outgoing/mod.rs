pub mod auth_events;
pub mod supabase_reqwest;
pub mod tokio_spawn;
