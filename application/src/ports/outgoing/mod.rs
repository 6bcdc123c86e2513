pub mod auth_repository;
pub mod task_spawn;
