use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tanf_cli::main_entry().await
}
