pub mod listener_registry;
