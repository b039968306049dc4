//! Build script for generating the backend gRPC client from its Protocol
//! Buffer definition.
//!
//! The `.proto` is parsed with protox, so no system `protoc` is required.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tell Cargo to re-run if proto files change
    println!("cargo:rerun-if-changed=proto/anytype/client_commands.proto");

    let file_descriptors = protox::compile(["anytype/client_commands.proto"], ["proto"])?;

    // The server half is only used by the test suites, which stand up a
    // scripted backend.
    tonic_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_fds(file_descriptors)?;

    Ok(())
}
