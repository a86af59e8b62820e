//! Server Module
//!
//! Server initialization, application state, and store selection.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs     - Module exports
//! ├── state.rs   - AppState and FromRef impls
//! ├── config.rs  - Entity store selection
//! └── init.rs    - Router assembly
//! ```

/// Application state management
pub mod state;

/// Store selection from configuration
pub mod config;

/// Server initialization
pub mod init;

pub use init::{create_app, create_app_with_store};
pub use state::AppState;
