//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own validation and store orchestration so route handlers
//! stay focused on form parsing, rendering and redirects. Services only see
//! the store traits, never a concrete backend.

pub mod crud;
pub mod dashboard;
pub mod reviews;
pub mod session;
pub mod site;
pub mod upload;
