pub mod auth_repository_supabase;
pub(crate) mod dto;
pub mod http;
