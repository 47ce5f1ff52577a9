//! Binary entry point that wires environment bootstrap and launches the
//! hands-free voice assistant loop.

use anyhow::Result;

use jarvis::assistant;

#[tokio::main]
/// Bootstraps environment variables and logging, then launches the
/// asynchronous voice assistant loop.
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();
    assistant::run_assistant().await
}
