pub mod serve;
pub mod settings;
pub mod translate;

// Re-export command functions for convenience
pub use serve::serve;
pub use settings::{get_setting, init_db, set_setting};
pub use translate::translate;
