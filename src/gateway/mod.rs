//! Request Translation Module
//!
//! Turns HTTP requests into backend calls and normalizes whatever comes back
//! into one response shape.
//!
//! ## Flow
//! 1. **Validate**: Create and update require truthy `title` and `content`;
//!    a violation is answered with 400 before anything else runs.
//! 2. **Call**: The matching backend operation is attempted exactly once.
//! 3. **Reshape**: Backend records are projected onto `EntryView` (see `envelope`).
//! 4. **Fall back**: On any backend failure the equivalent fallback-store
//!    operation runs and is reshaped the same way. With fallback disabled the
//!    backend error becomes a 500.
//!
//! ## Submodules
//! - **`envelope`**: Response shape and the projection from backend records.
//! - **`error`**: Error taxonomy and its HTTP status mapping.
//! - **`handlers`**: Axum request handlers.
//! - **`protocol`**: Endpoints and HTTP DTOs.
//! - **`routes`**: Route table.
//! - **`service`**: The `Gateway` translator itself.

pub mod envelope;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod service;

#[cfg(test)]
mod tests;
