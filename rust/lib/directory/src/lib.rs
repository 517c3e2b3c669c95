//! User directory: the record store behind the account service.
//!
//! The service only depends on the [`Directory`] trait. Two backends:
//!
//! - [`MemoryDirectory`]: in-process map, used for development and tests.
//! - [`RestDirectory`]: a PostgREST-style table endpoint (e.g. Supabase).

pub mod error;
pub mod memory;
pub mod rest;
pub mod traits;

pub use error::DirectoryError;
pub use memory::MemoryDirectory;
pub use rest::RestDirectory;
pub use traits::{scalar_matches, Directory, Row};
