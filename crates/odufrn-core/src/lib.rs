//! odufrn Core - Catalogs, search, resource selection and download orchestration.
//!
//! This crate provides the portal-independent logic of the odufrn downloader:
//!
//! - **Domain models**: [`Resource`], [`EntityKind`], [`Catalog`]
//! - **Search**: Levenshtein-based fuzzy search and substring search over catalog names
//! - **Selection**: [`ResourceSelector`] with year and dictionary filtering
//! - **Services**: [`DownloadService`] for listing, searching and downloading packages and groups
//! - **Traits**: [`PortalApi`], [`Storage`] for dependency injection
//! - **Progress reporting**: [`ProgressReporter`] trait for decoupled logging/UI
//!
//! # Architecture
//!
//! Network and filesystem access are injected through traits, so frontends
//! (the `odufrn` CLI) and tests plug in their own implementations:
//!
//! - [`PortalApi`] - portal HTTP calls (e.g., the CKAN API)
//! - [`Storage`] - directories and files (e.g., the local disk)
//!
//! # Example
//!
//! ```ignore
//! use odufrn_core::{DownloadOptions, DownloadService, SearchMode, TracingReporter};
//!
//! let service = DownloadService::connect_with_progress(api, storage, &TracingReporter).await;
//!
//! let related = service
//!     .search_related_packages("discentes", SearchMode::Fuzzy, true, &TracingReporter)
//!     .await;
//! let summary = service
//!     .download_packages_with_progress(&related, &DownloadOptions::new("data"), &TracingReporter)
//!     .await;
//! ```

pub mod catalog;
pub mod config;
pub mod download;
pub mod error;
pub mod models;
pub mod progress;
pub mod search;
pub mod selector;
pub mod traits;

// Catalogs
pub use catalog::Catalog;

// Configuration
pub use config::{
    DEFAULT_PORTAL_URL, DownloadOptions, FileConfig, HttpConfig, SearchConfig,
    default_config_path, load_config,
};

// Error handling
pub use error::{AppError, DOWNLOAD_FAILURE_HINT};

// Domain models
pub use models::{EntityKind, GroupMetadata, PackageMetadata, Resource};

// Search and selection
pub use search::SearchMode;
pub use selector::{DICTIONARY_MARKER, RemainingYears, ResourceSelector};

// Progress reporting
pub use progress::{DownloadEvent, ProgressReporter, SilentReporter, TracingReporter};

// Traits for dependency injection
pub use traits::{PortalApi, Storage};

// Services (generic over trait implementations)
pub use download::{BatchDownloadSummary, DownloadResult, DownloadService, DownloadStatus};
