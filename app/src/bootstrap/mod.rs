pub mod background;
pub mod context;
