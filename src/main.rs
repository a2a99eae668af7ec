use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    // Diagnostics go to stderr so they never mix with command output.
    // Enable with e.g. RUST_LOG=chroma_notes=debug.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    chroma_notes::entry()
}
