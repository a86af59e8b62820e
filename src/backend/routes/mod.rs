//! Routes Module
//!
//! HTTP route configuration.
//!
//! - **`router`** - Router assembly and layers
//! - **`api_routes`** - JSON API route table

/// Router assembly
pub mod router;

/// API route table
pub mod api_routes;

pub use router::create_router;
