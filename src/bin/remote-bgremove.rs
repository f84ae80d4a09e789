//! Remote background removal CLI tool
//!
//! Sends an image to a remove.bg-compatible service and saves the cutout.

#[cfg(feature = "cli")]
use remote_bgremove::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
