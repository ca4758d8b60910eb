pub mod config;
pub mod editor;
pub mod project;

pub use config::*;
pub use editor::*;
pub use project::*;
