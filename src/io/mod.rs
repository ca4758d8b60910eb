pub mod config_io;
pub mod event_log;
pub mod kv_store;
pub mod persistence;
