//! Download service: catalogs, search and the per-name download state machine.
//!
//! # State machine
//!
//! Every requested name ends in exactly one [`DownloadStatus`]:
//!
//! ```text
//! name ──► in cached catalog? ──no──► NotFound   (no entity request is made)
//!                │ yes
//!                ▼
//!          fetch metadata ──404──► NotFound
//!                │
//!                ▼
//!          ensure base/name ──► select resources ──► fetch + write each
//!                │                                        │ any error
//!                ▼                                        ▼
//!           Downloaded                          Failed (files written so far stay)
//! ```
//!
//! Batch calls run names one after another and never stop on a failure: each
//! name's outcome is collected in a [`BatchDownloadSummary`].
//!
//! # Example
//!
//! ```ignore
//! use odufrn_client::{CkanClient, LocalStorage};
//! use odufrn_core::{DownloadOptions, DownloadService, TracingReporter};
//!
//! let api = CkanClient::new("http://dados.ufrn.br")?;
//! let service = DownloadService::connect_with_progress(api, LocalStorage, &TracingReporter).await;
//! let options = DownloadOptions::new("data").without_dictionary().with_years(vec![2019]);
//! let result = service
//!     .download_package_with_progress("discentes", &options, &TracingReporter)
//!     .await;
//! ```

use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::config::{DownloadOptions, SearchConfig};
use crate::error::AppError;
use crate::models::{EntityKind, GroupMetadata, PackageMetadata};
use crate::progress::{DownloadEvent, ProgressReporter, SilentReporter};
use crate::search::{SearchMode, merge_unique, search_related};
use crate::selector::ResourceSelector;
use crate::traits::{PortalApi, Storage};

/// Terminal state of one name's download.
#[derive(Debug)]
pub enum DownloadStatus {
    Downloaded,
    NotFound,
    Failed(AppError),
}

/// Outcome of downloading one package or group.
#[derive(Debug)]
pub struct DownloadResult {
    pub name: String,
    pub kind: EntityKind,
    /// `base/name`; `None` when the name was not found.
    pub destination: Option<PathBuf>,
    pub status: DownloadStatus,
    /// Files written for this entity, including those written before a failure.
    pub files: Vec<PathBuf>,
    /// Per-package results of a group download; empty for packages.
    pub members: Vec<DownloadResult>,
}

impl DownloadResult {
    fn not_found(kind: EntityKind, name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            destination: None,
            status: DownloadStatus::NotFound,
            files: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn is_downloaded(&self) -> bool {
        matches!(self.status, DownloadStatus::Downloaded)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.status, DownloadStatus::NotFound)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, DownloadStatus::Failed(_))
    }

    pub fn error(&self) -> Option<&AppError> {
        match &self.status {
            DownloadStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Files written by this entity and, for groups, by all member packages.
    pub fn total_files(&self) -> usize {
        self.files.len() + self.members.iter().map(Self::total_files).sum::<usize>()
    }
}

/// Results of a batch download, in request order.
#[derive(Debug, Default)]
pub struct BatchDownloadSummary {
    pub results: Vec<DownloadResult>,
}

impl BatchDownloadSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: DownloadResult) {
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn downloaded_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_downloaded()).count()
    }

    pub fn not_found_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_not_found()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }

    pub fn total_files(&self) -> usize {
        self.results.iter().map(DownloadResult::total_files).sum()
    }

    /// Failed results, including failed members of downloaded groups.
    pub fn failures(&self) -> Vec<&DownloadResult> {
        fn collect<'a>(results: &'a [DownloadResult], out: &mut Vec<&'a DownloadResult>) {
            for result in results {
                if result.is_failed() {
                    out.push(result);
                }
                collect(&result.members, out);
            }
        }
        let mut out = Vec::new();
        collect(&self.results, &mut out);
        out
    }
}

/// Lists, searches and downloads portal entities.
///
/// Holds an HTTP capability (`P`), a filesystem capability (`S`) and the
/// cached catalogs. Catalogs only change through the `reload*` methods.
pub struct DownloadService<P, S> {
    api: P,
    storage: S,
    packages: Catalog,
    groups: Catalog,
    tags: Catalog,
    search: SearchConfig,
}

impl<P, S> DownloadService<P, S>
where
    P: PortalApi,
    S: Storage,
{
    /// Creates a service with empty catalogs.
    ///
    /// Use [`connect`](Self::connect) to load the catalogs right away.
    pub fn new(api: P, storage: S) -> Self {
        Self {
            api,
            storage,
            packages: Catalog::new(EntityKind::Package),
            groups: Catalog::new(EntityKind::Group),
            tags: Catalog::new(EntityKind::Tag),
            search: SearchConfig::default(),
        }
    }

    pub fn with_search_config(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Creates a service and loads every catalog.
    ///
    /// A catalog that cannot be loaded stays empty; the failure is reported
    /// and every lookup in it ends as `NotFound` until it is reloaded.
    pub async fn connect(api: P, storage: S) -> Self {
        Self::connect_with_progress(api, storage, &SilentReporter).await
    }

    /// Same as [`connect`](Self::connect), with progress reporting.
    pub async fn connect_with_progress<R: ProgressReporter>(
        api: P,
        storage: S,
        reporter: &R,
    ) -> Self {
        let mut service = Self::new(api, storage);
        service.load_catalogs(reporter).await;
        service
    }

    /// Reloads the package, group and tag catalogs, reporting failures.
    pub async fn load_catalogs<R: ProgressReporter>(&mut self, reporter: &R) {
        for kind in [EntityKind::Package, EntityKind::Group, EntityKind::Tag] {
            match self.reload(kind).await {
                Ok(count) => reporter.report(DownloadEvent::CatalogLoaded { kind, count }),
                Err(error) => {
                    reporter.report(DownloadEvent::CatalogLoadFailed {
                        kind,
                        error: &error,
                    });
                }
            }
        }
    }

    /// Replaces one catalog with the portal's current list.
    ///
    /// On error the previous names are kept.
    pub async fn reload(&mut self, kind: EntityKind) -> Result<usize, AppError> {
        let names = self.api.fetch_list(kind.list_action()).await?;
        let catalog = self.catalog_mut(kind);
        catalog.replace(names);
        tracing::debug!(%kind, count = catalog.len(), "Catalog reloaded");
        Ok(catalog.len())
    }

    pub async fn reload_packages(&mut self) -> Result<usize, AppError> {
        self.reload(EntityKind::Package).await
    }

    pub async fn reload_groups(&mut self) -> Result<usize, AppError> {
        self.reload(EntityKind::Group).await
    }

    pub async fn reload_tags(&mut self) -> Result<usize, AppError> {
        self.reload(EntityKind::Tag).await
    }

    pub fn catalog(&self, kind: EntityKind) -> &Catalog {
        match kind {
            EntityKind::Package => &self.packages,
            EntityKind::Group => &self.groups,
            EntityKind::Tag => &self.tags,
        }
    }

    fn catalog_mut(&mut self, kind: EntityKind) -> &mut Catalog {
        match kind {
            EntityKind::Package => &mut self.packages,
            EntityKind::Group => &mut self.groups,
            EntityKind::Tag => &mut self.tags,
        }
    }

    /// Cached names of one kind, in portal order.
    pub fn list(&self, kind: EntityKind) -> &[String] {
        self.catalog(kind).names()
    }

    pub fn api(&self) -> &P {
        &self.api
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Packages whose names are related to `keyword`.
    ///
    /// With `search_tags`, packages carrying a tag related to the keyword are
    /// appended after the name matches, without duplicates. Tag lookups that
    /// fail are logged and skipped.
    pub async fn search_related_packages<R: ProgressReporter>(
        &self,
        keyword: &str,
        mode: SearchMode,
        search_tags: bool,
        reporter: &R,
    ) -> Vec<String> {
        let mut related = search_related(keyword, self.packages.names(), mode, &self.search);

        if search_tags {
            for tag in search_related(keyword, self.tags.names(), mode, &self.search) {
                match self.packages_with_tag(&tag).await {
                    Ok(packages) => merge_unique(&mut related, packages),
                    Err(e) => tracing::warn!(tag = %tag, error = %e, "Tag lookup failed"),
                }
            }
        }

        if related.is_empty() {
            reporter.report(DownloadEvent::NoMatches {
                kind: EntityKind::Package,
                keyword,
            });
        }
        related
    }

    /// Groups whose names are related to `keyword`.
    pub fn search_related_groups<R: ProgressReporter>(
        &self,
        keyword: &str,
        mode: SearchMode,
        reporter: &R,
    ) -> Vec<String> {
        let related = search_related(keyword, self.groups.names(), mode, &self.search);
        if related.is_empty() {
            reporter.report(DownloadEvent::NoMatches {
                kind: EntityKind::Group,
                keyword,
            });
        }
        related
    }

    /// Names of the packages tagged with `tag`.
    pub async fn packages_with_tag(&self, tag: &str) -> Result<Vec<String>, AppError> {
        let value = self
            .api
            .fetch_entity(EntityKind::Tag.rest_path(), tag)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    // =========================================================================
    // Packages
    // =========================================================================

    /// Downloads one package into `options.destination/name`.
    pub async fn download_package(&self, name: &str, options: &DownloadOptions) -> DownloadResult {
        self.download_package_with_progress(name, options, &SilentReporter)
            .await
    }

    /// Same as [`download_package`](Self::download_package), with progress reporting.
    pub async fn download_package_with_progress<R: ProgressReporter>(
        &self,
        name: &str,
        options: &DownloadOptions,
        reporter: &R,
    ) -> DownloadResult {
        let kind = EntityKind::Package;
        if !self.packages.contains(name) {
            reporter.report(DownloadEvent::NotFound { kind, name });
            return DownloadResult::not_found(kind, name);
        }

        let destination = options.destination.join(name);
        reporter.report(DownloadEvent::Started {
            kind,
            name,
            destination: &destination,
        });

        let mut files = Vec::new();
        let status = match self
            .write_package(name, &destination, options, &mut files, reporter)
            .await
        {
            Ok(()) => DownloadStatus::Downloaded,
            Err(error) => self.failure_status(kind, name, error, reporter),
        };

        if matches!(status, DownloadStatus::Downloaded) {
            reporter.report(DownloadEvent::Completed {
                kind,
                name,
                files: files.len(),
            });
        }

        DownloadResult {
            name: name.to_string(),
            kind,
            destination: Some(destination),
            status,
            files,
            members: Vec::new(),
        }
    }

    async fn write_package<R: ProgressReporter>(
        &self,
        name: &str,
        destination: &Path,
        options: &DownloadOptions,
        files: &mut Vec<PathBuf>,
        reporter: &R,
    ) -> Result<(), AppError> {
        let value = self
            .api
            .fetch_entity(EntityKind::Package.rest_path(), name)
            .await?;
        let package: PackageMetadata = serde_json::from_value(value)?;
        let destination = self.storage.ensure_directory(destination).await?;

        let selected = ResourceSelector::new(options.include_dictionary, options.years.clone())
            .select(&package.resources);
        reporter.report(DownloadEvent::ResourcesSelected {
            package: name,
            selected: selected.len(),
            total: package.resources.len(),
        });

        for resource in selected {
            reporter.report(DownloadEvent::ResourceDownloading {
                package: name,
                resource: &resource.name,
            });
            let bytes = self.api.fetch_bytes(&resource.url).await?;
            let path = destination.join(resource.file_name());
            self.storage.write_file(&path, &bytes).await?;
            reporter.report(DownloadEvent::ResourceSaved {
                path: &path,
                bytes: bytes.len(),
            });
            files.push(path);
        }

        Ok(())
    }

    /// Downloads packages one after another; a failure never stops the batch.
    pub async fn download_packages(
        &self,
        names: &[String],
        options: &DownloadOptions,
    ) -> BatchDownloadSummary {
        self.download_packages_with_progress(names, options, &SilentReporter)
            .await
    }

    /// Same as [`download_packages`](Self::download_packages), with progress reporting.
    pub async fn download_packages_with_progress<R: ProgressReporter>(
        &self,
        names: &[String],
        options: &DownloadOptions,
        reporter: &R,
    ) -> BatchDownloadSummary {
        let mut summary = BatchDownloadSummary::new();
        for name in names {
            summary.add(
                self.download_package_with_progress(name, options, reporter)
                    .await,
            );
        }
        summary
    }

    /// Downloads every package of the cached catalog.
    pub async fn download_all(&self, options: &DownloadOptions) -> BatchDownloadSummary {
        self.download_all_with_progress(options, &SilentReporter)
            .await
    }

    /// Same as [`download_all`](Self::download_all), with progress reporting.
    pub async fn download_all_with_progress<R: ProgressReporter>(
        &self,
        options: &DownloadOptions,
        reporter: &R,
    ) -> BatchDownloadSummary {
        self.download_packages_with_progress(self.packages.names(), options, reporter)
            .await
    }

    /// Downloads the packages listed in a text file, one name per line.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    ///
    /// # Errors
    ///
    /// Only reading the file can fail; per-package failures are in the summary.
    pub async fn download_from_file(
        &self,
        path: &Path,
        options: &DownloadOptions,
    ) -> Result<BatchDownloadSummary, AppError> {
        self.download_from_file_with_progress(path, options, &SilentReporter)
            .await
    }

    /// Same as [`download_from_file`](Self::download_from_file), with progress reporting.
    pub async fn download_from_file_with_progress<R: ProgressReporter>(
        &self,
        path: &Path,
        options: &DownloadOptions,
        reporter: &R,
    ) -> Result<BatchDownloadSummary, AppError> {
        let content = self.storage.read_to_string(path).await?;
        let names = parse_name_list(&content);
        tracing::debug!(path = %path.display(), count = names.len(), "Read package list");
        Ok(self
            .download_packages_with_progress(&names, options, reporter)
            .await)
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Downloads every member package of a group into `options.destination/group/`.
    pub async fn download_group(&self, name: &str, options: &DownloadOptions) -> DownloadResult {
        self.download_group_with_progress(name, options, &SilentReporter)
            .await
    }

    /// Same as [`download_group`](Self::download_group), with progress reporting.
    ///
    /// Member packages go through the package state machine, including the
    /// package catalog check, with the group directory as their destination.
    pub async fn download_group_with_progress<R: ProgressReporter>(
        &self,
        name: &str,
        options: &DownloadOptions,
        reporter: &R,
    ) -> DownloadResult {
        let kind = EntityKind::Group;
        if !self.groups.contains(name) {
            reporter.report(DownloadEvent::NotFound { kind, name });
            return DownloadResult::not_found(kind, name);
        }

        let destination = options.destination.join(name);
        reporter.report(DownloadEvent::Started {
            kind,
            name,
            destination: &destination,
        });

        let (packages, group_dir) = match self.prepare_group(name, &destination).await {
            Ok(prepared) => prepared,
            Err(error) => {
                let status = self.failure_status(kind, name, error, reporter);
                return DownloadResult {
                    name: name.to_string(),
                    kind,
                    destination: Some(destination),
                    status,
                    files: Vec::new(),
                    members: Vec::new(),
                };
            }
        };

        let member_options = options.with_destination(&group_dir);
        let mut members = Vec::with_capacity(packages.len());
        for package in &packages {
            members.push(
                self.download_package_with_progress(package, &member_options, reporter)
                    .await,
            );
        }

        let result = DownloadResult {
            name: name.to_string(),
            kind,
            destination: Some(group_dir),
            status: DownloadStatus::Downloaded,
            files: Vec::new(),
            members,
        };
        reporter.report(DownloadEvent::Completed {
            kind,
            name,
            files: result.total_files(),
        });
        result
    }

    async fn prepare_group(
        &self,
        name: &str,
        destination: &Path,
    ) -> Result<(Vec<String>, PathBuf), AppError> {
        let value = self
            .api
            .fetch_entity(EntityKind::Group.rest_path(), name)
            .await?;
        let group: GroupMetadata = serde_json::from_value(value)?;
        let dir = self.storage.ensure_directory(destination).await?;
        Ok((group.packages, dir))
    }

    /// Downloads groups one after another; a failure never stops the batch.
    pub async fn download_groups(
        &self,
        names: &[String],
        options: &DownloadOptions,
    ) -> BatchDownloadSummary {
        self.download_groups_with_progress(names, options, &SilentReporter)
            .await
    }

    /// Same as [`download_groups`](Self::download_groups), with progress reporting.
    pub async fn download_groups_with_progress<R: ProgressReporter>(
        &self,
        names: &[String],
        options: &DownloadOptions,
        reporter: &R,
    ) -> BatchDownloadSummary {
        let mut summary = BatchDownloadSummary::new();
        for name in names {
            summary.add(
                self.download_group_with_progress(name, options, reporter)
                    .await,
            );
        }
        summary
    }

    /// A 404 from the portal means the catalog is stale: report it as not found.
    fn failure_status<R: ProgressReporter>(
        &self,
        kind: EntityKind,
        name: &str,
        error: AppError,
        reporter: &R,
    ) -> DownloadStatus {
        if error.is_not_found() {
            reporter.report(DownloadEvent::StaleEntry {
                kind,
                name,
                error: &error,
            });
            DownloadStatus::NotFound
        } else {
            reporter.report(DownloadEvent::Failed {
                kind,
                name,
                error: &error,
            });
            DownloadStatus::Failed(error)
        }
    }
}

/// Package names from a list file: trimmed, without blanks and `#` comments.
pub fn parse_name_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
