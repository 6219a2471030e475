use anyhow::Result;
use snippet_notes::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
