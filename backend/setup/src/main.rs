use clap::Parser;

/// Check the document store connection and seed the starter catalog.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _args = Args::parse();

    setup::run().await
}
