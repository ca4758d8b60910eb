pub mod editor_registry;
pub mod host;
pub mod launcher;
pub mod menu;
pub mod notify;
pub mod store;
pub mod validate;
