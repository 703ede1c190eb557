use std::{
    fmt::Display,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::{task::JoinHandle, time};

use crate::domain::{
    entities::series::Series,
    repositories::{cover::CoverRepository, library::LibraryRepository, source::SourceRepository},
    services::import::{ImportService, ReloadSummary},
};

/// A pending request to materialize a series into the library. `get_first`
/// re-fetches full metadata from the source before import; a preview series
/// passes `true` here since it only carries partial data.
#[derive(Debug, Clone)]
pub struct ImportTask {
    pub series: Series,
    pub get_first: bool,
}

pub enum ImportCommand {
    Import(Box<ImportTask>),
    ReloadSeries(i64, tokio::sync::oneshot::Sender<Result<(), anyhow::Error>>),
    ReloadLibrary(tokio::sync::oneshot::Sender<ReloadSummary>),
}

impl Display for ImportCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportCommand::Import(task) => {
                write!(f, "ImportCommand::Import({})", task.series.title)
            }
            ImportCommand::ReloadSeries(id, _) => write!(f, "ImportCommand::ReloadSeries({id})"),
            ImportCommand::ReloadLibrary(_) => write!(f, "ImportCommand::ReloadLibrary"),
        }
    }
}

pub type ImportCommandSender = flume::Sender<ImportCommand>;
pub type ImportCommandReceiver = flume::Receiver<ImportCommand>;

#[derive(Debug, Clone)]
pub enum LibraryEvent {
    SeriesImported(Series),
    ImportFailed { title: String, message: String },
    ReloadProgress { cur: usize, total: usize },
    ReloadCompleted { message: String },
    SeriesListUpdated(Vec<Series>),
}

pub type LibraryEventSender = tokio::sync::broadcast::Sender<LibraryEvent>;
pub type LibraryEventReceiver = tokio::sync::broadcast::Receiver<LibraryEvent>;

struct ImportWorker<L, S, C>
where
    L: LibraryRepository,
    S: SourceRepository,
    C: CoverRepository,
{
    period: u64,
    chapter_languages: Vec<String>,
    service: ImportService<L, S, C>,
    library_repo: L,
    reloading: Arc<AtomicBool>,
    broadcast_tx: LibraryEventSender,
    command_rx: ImportCommandReceiver,
}

impl<L, S, C> ImportWorker<L, S, C>
where
    L: LibraryRepository,
    S: SourceRepository,
    C: CoverRepository,
{
    fn new(
        period: u64,
        chapter_languages: Vec<String>,
        library_repo: L,
        source_repo: S,
        cover_repo: C,
        broadcast_tx: LibraryEventSender,
    ) -> (Self, ImportCommandSender, Arc<AtomicBool>) {
        info!("periodic library reload every {period} seconds");

        let (command_tx, command_rx) = flume::unbounded();
        let reloading = Arc::new(AtomicBool::new(false));

        (
            Self {
                period,
                chapter_languages,
                service: ImportService::new(library_repo.clone(), source_repo, cover_repo),
                library_repo,
                reloading: reloading.clone(),
                broadcast_tx,
                command_rx,
            },
            command_tx,
            reloading,
        )
    }

    async fn import_one(&self, task: ImportTask) {
        let title = task.series.title.clone();

        let result = self
            .service
            .import_series(&task.series, &self.chapter_languages, task.get_first)
            .await;
        match result {
            Ok(series) => {
                info!("imported {}", series.title);
                let _ = self
                    .broadcast_tx
                    .send(LibraryEvent::SeriesImported(series));
                self.refresh_series_list().await;
            }
            Err(e) => {
                error!("failed to import {title}: {e}");
                let _ = self.broadcast_tx.send(LibraryEvent::ImportFailed {
                    title,
                    message: e.to_string(),
                });
            }
        }
    }

    async fn reload_one(&self, series_id: i64) -> Result<(), anyhow::Error> {
        let series = self.library_repo.get_series_by_id(series_id).await?;

        self.service
            .reload_series(&series, &self.chapter_languages)
            .await?;
        self.refresh_series_list().await;

        Ok(())
    }

    async fn reload_library(&self) -> ReloadSummary {
        self.reloading.store(true, Ordering::SeqCst);

        let (summary, message) = match self.library_repo.get_series_list().await {
            Ok(series_list) => {
                let tx = self.broadcast_tx.clone();
                let summary = self
                    .service
                    .reload_series_list(series_list, &self.chapter_languages, |cur, total| {
                        let _ = tx.send(LibraryEvent::ReloadProgress { cur, total });
                    })
                    .await;
                let message = summary.message();
                (summary, message)
            }
            Err(e) => {
                error!("failed to read series list: {e}");
                (
                    ReloadSummary::default(),
                    "Failed to read the library".to_string(),
                )
            }
        };

        let _ = self
            .broadcast_tx
            .send(LibraryEvent::ReloadCompleted { message });
        self.refresh_series_list().await;

        self.reloading.store(false, Ordering::SeqCst);

        summary
    }

    async fn refresh_series_list(&self) {
        match self.library_repo.get_series_list().await {
            Ok(series_list) => {
                let _ = self
                    .broadcast_tx
                    .send(LibraryEvent::SeriesListUpdated(series_list));
            }
            Err(e) => {
                error!("failed to refresh series list: {e}");
            }
        }
    }

    async fn run(self) {
        let period = if self.period == 0 { 3600 } else { self.period };
        let mut reload_interval = time::interval(time::Duration::from_secs(period));
        // the first tick completes immediately
        reload_interval.tick().await;

        loop {
            tokio::select! {
                cmd = self.command_rx.recv_async() => {
                    let Ok(cmd) = cmd else {
                        break;
                    };

                    debug!("received command: {cmd}");
                    match cmd {
                        ImportCommand::Import(task) => {
                            self.import_one(*task).await;
                        }
                        ImportCommand::ReloadSeries(series_id, tx) => {
                            let res = self.reload_one(series_id).await;
                            if tx.send(res).is_err() {
                                info!("failed to send reload result");
                            }
                        }
                        ImportCommand::ReloadLibrary(tx) => {
                            let summary = self.reload_library().await;
                            if tx.send(summary).is_err() {
                                info!("failed to send reload summary");
                            }
                        }
                    }
                }
                _ = reload_interval.tick() => {
                    if self.period == 0 {
                        continue;
                    }

                    info!("start periodic library reload");
                    let summary = self.reload_library().await;
                    info!("{}", summary.message());
                }
            }
        }
    }
}

pub fn start<L, S, C>(
    period: u64,
    chapter_languages: Vec<String>,
    library_repo: L,
    source_repo: S,
    cover_repo: C,
) -> (
    LibraryEventReceiver,
    ImportCommandSender,
    Arc<AtomicBool>,
    JoinHandle<()>,
)
where
    L: LibraryRepository,
    S: SourceRepository,
    C: CoverRepository,
{
    let (broadcast_tx, broadcast_rx) = tokio::sync::broadcast::channel(10);
    let (worker, command_tx, reloading) = ImportWorker::new(
        period,
        chapter_languages,
        library_repo,
        source_repo,
        cover_repo,
        broadcast_tx,
    );

    let handle = tokio::spawn(worker.run());

    (broadcast_rx, command_tx, reloading, handle)
}
