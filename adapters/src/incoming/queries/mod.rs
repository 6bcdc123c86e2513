pub mod cache;
pub mod hooks;
pub mod keys;
pub mod mutation;
