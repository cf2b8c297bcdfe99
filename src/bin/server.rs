use anyhow::Result;
use argh::FromArgs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// Cloud storage server for cloudsh.
struct Args {
    #[argh(option, short = 'p', default = "8080")]
    /// TCP port to listen on
    port: u16,

    #[argh(option, short = 'd', default = "String::from(\"./server_files\")")]
    /// directory files are stored in
    dir: String,
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    cloudsh::server::run(args.port, PathBuf::from(args.dir))
}
