//! Object Gateway Library
//!
//! A REST front for a remote object service. HTTP requests are translated
//! into backend RPC calls; when a call fails the gateway serves the request
//! from an in-memory journal instead, so clients always see the same JSON shape.
//!
//! ## Architecture Modules
//! - **`config`**: Environment and command-line settings.
//! - **`rpc`**: The backend adapter. One shared connection handle and one typed
//!   wrapper per backend method, each a single request/response call.
//! - **`journal`**: The fallback store, an ordered in-process list of entries.
//! - **`gateway`**: Request translation, response projection, error mapping
//!   and the axum route table.

pub mod config;
pub mod gateway;
pub mod journal;
pub mod rpc;
