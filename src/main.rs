use clap::Parser as _;
use systemair_save_coordinator::commands;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(clap::Parser)]
#[clap(version, about, author)]
enum Commands {
    Registers(commands::registers::Args),
    Info(commands::info::Args),
    Read(commands::read::Args),
    Write(commands::write::Args),
    Poll(commands::poll::Args),
}

fn end<E: std::error::Error>(r: Result<(), E>) {
    std::process::exit(match r {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            let mut cause = e.source();
            while let Some(e) = cause {
                eprintln!("  because: {e}");
                cause = e.source();
            }
            1
        }
    });
}

#[tokio::main]
async fn main() {
    let filter_description =
        std::env::var("SYSTEMAIR_SAVE_LOG").unwrap_or_else(|_| String::from("warn"));
    let filter = match filter_description.parse::<tracing_subscriber::filter::targets::Targets>() {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("warning: SYSTEMAIR_SAVE_LOG is not a valid filter ({e}), using `warn`");
            tracing_subscriber::filter::targets::Targets::new()
                .with_default(tracing::Level::WARN)
        }
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    match Commands::parse() {
        Commands::Registers(args) => end(commands::registers::run(args)),
        Commands::Info(args) => end(commands::info::run(args).await),
        Commands::Read(args) => end(commands::read::run(args).await),
        Commands::Write(args) => end(commands::write::run(args).await),
        Commands::Poll(args) => end(commands::poll::run(args).await),
    }
}
