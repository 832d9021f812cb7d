use anyhow::Result;
use caltrack::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
