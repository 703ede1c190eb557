#[macro_use]
extern crate log;

use clap::Parser;

use yomu::{
    application::worker,
    infrastructure::{
        config::Config,
        cover::CoverRepositoryImpl,
        database,
        domain::repositories::{library::LibraryRepositoryImpl, source::SourceRepositoryImpl},
    },
};

#[derive(Parser)]
struct Opts {
    /// Path to config file
    #[clap(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        info!("rust_log: {rust_log}");
    } else if let Ok(yomu_log) = std::env::var("YOMU_LOG") {
        info!("yomu_log: {yomu_log}");
        unsafe {
            std::env::set_var("RUST_LOG", format!("yomu={yomu_log}"));
        }
    }

    env_logger::init();

    let opts: Opts = Opts::parse();
    let config = Config::open(opts.config)?;

    let pool = database::establish_connection(&config.database_path, config.create_database).await?;

    let library_repo = LibraryRepositoryImpl::new(pool.clone());
    let source_repo = SourceRepositoryImpl::new(&config.sources);
    let cover_repo = CoverRepositoryImpl::new(&config.thumbnail_path);

    let (_event_rx, command_tx, _reloading, worker_handle) = worker::imports::start(
        config.update_interval,
        config.chapter_languages.clone(),
        library_repo,
        source_repo,
        cover_repo,
    );

    tokio::select! {
        _ = worker_handle => {
            info!("import worker quit");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
        }
    }

    drop(command_tx);

    info!("closing database...");
    pool.close().await;

    Ok(())
}
