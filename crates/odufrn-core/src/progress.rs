//! Progress reporting for catalog loads, searches and downloads.
//!
//! The service emits [`DownloadEvent`]s instead of printing, so the CLI can
//! log them and tests can stay silent.

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::models::EntityKind;

/// Events emitted by [`DownloadService`](crate::DownloadService).
#[derive(Debug, Clone, Copy)]
pub enum DownloadEvent<'a> {
    /// A catalog was (re)loaded from the portal.
    CatalogLoaded { kind: EntityKind, count: usize },
    /// A catalog could not be loaded; it stays empty or keeps its old names.
    CatalogLoadFailed {
        kind: EntityKind,
        error: &'a AppError,
    },
    /// The requested name is not in the cached catalog.
    NotFound { kind: EntityKind, name: &'a str },
    /// The name is cataloged but the portal answered 404 for it.
    StaleEntry {
        kind: EntityKind,
        name: &'a str,
        error: &'a AppError,
    },
    /// Download of an entity started.
    Started {
        kind: EntityKind,
        name: &'a str,
        destination: &'a Path,
    },
    /// Resource selection finished for a package.
    ResourcesSelected {
        package: &'a str,
        selected: usize,
        total: usize,
    },
    /// A resource is being fetched.
    ResourceDownloading { package: &'a str, resource: &'a str },
    /// A resource was written to disk.
    ResourceSaved { path: &'a Path, bytes: usize },
    /// Download of an entity finished.
    Completed {
        kind: EntityKind,
        name: &'a str,
        files: usize,
    },
    /// Download of an entity was aborted.
    Failed {
        kind: EntityKind,
        name: &'a str,
        error: &'a AppError,
    },
    /// A search returned nothing.
    NoMatches { kind: EntityKind, keyword: &'a str },
}

/// Trait for reporting download events.
pub trait ProgressReporter: Send + Sync {
    /// Called when an event occurs.
    ///
    /// The default implementation does nothing (silent mode).
    fn report(&self, event: DownloadEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that ignores all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Tracing-based reporter for CLI logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&self, event: DownloadEvent<'_>) {
        match event {
            DownloadEvent::CatalogLoaded { kind, count } => {
                debug!(%kind, count, "Catalog loaded");
            }
            DownloadEvent::CatalogLoadFailed { kind, error } => {
                warn!(%kind, error = %error, "Could not load catalog");
            }
            DownloadEvent::NotFound { kind, name } => {
                let error = AppError::NotInCatalog {
                    kind,
                    name: name.to_string(),
                };
                warn!("{}", error.user_message());
            }
            DownloadEvent::StaleEntry { kind, name, error } => {
                warn!(%kind, name, "{}", error.user_message());
            }
            DownloadEvent::Started {
                kind,
                name,
                destination,
            } => {
                info!(%kind, destination = %destination.display(), "Downloading {}", name);
            }
            DownloadEvent::ResourcesSelected {
                package,
                selected,
                total,
            } => {
                debug!(package, selected, total, "Resources selected");
            }
            DownloadEvent::ResourceDownloading { package, resource } => {
                info!(package, "Downloading {}...", resource);
            }
            DownloadEvent::ResourceSaved { path, bytes } => {
                debug!(path = %path.display(), bytes, "Resource saved");
            }
            DownloadEvent::Completed { kind, name, files } => {
                info!(%kind, files, "Finished {}", name);
            }
            DownloadEvent::Failed { kind, name, error } => {
                error!(%kind, "Download of \"{}\" failed: {}", name, error.user_message());
            }
            DownloadEvent::NoMatches { kind, keyword } => {
                info!("No {} similar to \"{}\".", kind, keyword);
            }
        }
    }
}
