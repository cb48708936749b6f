// Public API - what other modules can use
pub use cleanup_task::{start_cleanup_task, CleanupConfig};
pub use code::{normalize_code, CodeGenerator, RandomCodeGenerator, CODE_ALPHABET, CODE_LENGTH};
pub use handlers::{get_stats, health};
pub use registry::{RegistryStats, RoomRegistry};

// Internal modules
mod cleanup_task;
mod code;
mod handlers;
mod registry;
