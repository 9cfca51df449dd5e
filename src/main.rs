use anyhow::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let args = klara_sync::args::parse();
    klara_sync::cli::main(args).await
}
