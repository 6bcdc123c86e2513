pub mod service;
pub mod subscription;
