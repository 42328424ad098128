use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use odufrn_client::{CkanClient, LocalStorage};
use odufrn_core::{
    AppError, BatchDownloadSummary, DownloadResult, DownloadService, DownloadStatus, EntityKind,
    SearchMode, TracingReporter, load_config,
};
use odufrn_cli::{Command, Config};

type Service = DownloadService<CkanClient, LocalStorage>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::parse();

    let level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    let file_config = load_config(config.config.clone())
        .map_err(user_error)?
        .unwrap_or_default();

    let base_url = config.base_url(&file_config);
    let client = CkanClient::with_config(&base_url, &config.http_config(&file_config))
        .map_err(user_error)?;

    info!("Connecting to {}", base_url);
    let reporter = TracingReporter;
    let service = DownloadService::connect_with_progress(client, LocalStorage, &reporter)
        .await
        .with_search_config(file_config.search_config());

    match config.command {
        Command::List { kind } => list(&service, kind.into()),
        Command::Search {
            keyword,
            groups,
            simple,
            tags,
        } => {
            let mode = if simple {
                SearchMode::Simple
            } else {
                SearchMode::Fuzzy
            };
            search(&service, &keyword, mode, groups, tags).await;
        }
        Command::Package { names, download } => {
            let summary = service
                .download_packages_with_progress(&names, &download.to_options(&file_config), &reporter)
                .await;
            print_summary(&summary);
        }
        Command::Group { names, download } => {
            let summary = service
                .download_groups_with_progress(&names, &download.to_options(&file_config), &reporter)
                .await;
            print_summary(&summary);
        }
        Command::All { download } => {
            let options = download.to_options(&file_config);
            info!(
                "Downloading all {} packages into {}",
                service.list(EntityKind::Package).len(),
                options.destination.display()
            );
            let summary = service.download_all_with_progress(&options, &reporter).await;
            print_summary(&summary);
        }
        Command::File { path, download } => {
            let summary = service
                .download_from_file_with_progress(&path, &download.to_options(&file_config), &reporter)
                .await
                .map_err(user_error)?;
            print_summary(&summary);
        }
    }

    Ok(())
}

fn user_error(e: AppError) -> anyhow::Error {
    anyhow::anyhow!(e.user_message())
}

fn list(service: &Service, kind: EntityKind) {
    let names = service.list(kind);
    if names.is_empty() {
        eprintln!("The {} catalog is empty.", kind);
        return;
    }
    for name in names {
        println!("{}", name);
    }
}

async fn search(service: &Service, keyword: &str, mode: SearchMode, groups: bool, tags: bool) {
    let reporter = TracingReporter;
    let results = if groups {
        service.search_related_groups(keyword, mode, &reporter)
    } else {
        service
            .search_related_packages(keyword, mode, tags, &reporter)
            .await
    };

    for name in &results {
        println!("{}", name);
    }
}

/// Print a summary of a download batch.
fn print_summary(summary: &BatchDownloadSummary) {
    info!("");
    info!("═══════════════════════════════════════════════════════");
    info!("DOWNLOAD COMPLETE");
    info!("═══════════════════════════════════════════════════════");
    info!("  Requested:           {}", summary.total());
    info!("  Downloaded:          {}", summary.downloaded_count());
    info!("  Not found:           {}", summary.not_found_count());
    info!("  Failed:              {}", summary.failed_count());
    info!("  Files written:       {}", summary.total_files());

    let failures = summary.failures();
    if !failures.is_empty() {
        info!("───────────────────────────────────────────────────────");
        info!("Failed downloads:");
        for result in failures {
            error!("  - {}", describe_failure(result));
        }
    }
    info!("═══════════════════════════════════════════════════════");
}

fn describe_failure(result: &DownloadResult) -> String {
    match &result.status {
        DownloadStatus::Failed(err) => {
            let kept = if result.files.is_empty() {
                String::new()
            } else {
                format!(" ({} files kept)", result.files.len())
            };
            format!("{} {}: {}{}", result.kind, result.name, err, kept)
        }
        DownloadStatus::Downloaded => format!("{} {}: downloaded", result.kind, result.name),
        DownloadStatus::NotFound => format!("{} {}: not found", result.kind, result.name),
    }
}
