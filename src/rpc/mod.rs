//! Backend RPC Adapter
//!
//! Typed access to the remote object service the gateway fronts.
//!
//! ## Components
//! - **`pb`**: Messages and the gRPC client generated from
//!   `proto/anytype/client_commands.proto` at build time.
//! - **`protocol`**: Method names, the gateway-side object record and
//!   protobuf/JSON conversions.
//! - **`client`**: `RpcConnection`, the shared channel built once at
//!   startup, and `RpcClient`, which wraps each backend method in one typed call.
//! - **`backend`**: The `ObjectBackend` trait the gateway is written against.
//!
//! Calls are never retried or batched. Failures are classified as unreachable,
//! timeout, backend error or malformed response and handed back to the caller.

pub mod backend;
pub mod client;
pub mod protocol;

pub mod pb {
    tonic::include_proto!("anytype");
}
