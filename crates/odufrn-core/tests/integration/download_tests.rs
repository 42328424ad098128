//! Integration tests for DownloadService downloads.

use std::path::PathBuf;

use crate::integration::common::{MemoryStorage, MockPortal, RecordingReporter, resource};
use odufrn_core::{AppError, DownloadOptions, DownloadService, DownloadStatus, EntityKind};
use serde_json::json;

fn options() -> DownloadOptions {
    DownloadOptions::new("data")
}

/// A name missing from the cached catalog ends as NotFound without any
/// entity request.
#[tokio::test]
async fn test_package_not_in_catalog_makes_no_requests() {
    let portal = MockPortal::new().with_package("discentes", vec![resource("Discentes 2019", "CSV")]);
    let storage = MemoryStorage::new();
    let service = DownloadService::connect(portal.clone(), storage.clone()).await;
    let reporter = RecordingReporter::default();

    let result = service
        .download_package_with_progress("docentes", &options(), &reporter)
        .await;

    assert!(result.is_not_found());
    assert!(result.destination.is_none());
    assert!(portal.entity_calls().is_empty(), "No entity should be fetched");
    assert!(portal.byte_calls().is_empty());
    assert!(storage.file_paths().is_empty());
    assert_eq!(reporter.count("NotFound"), 1);
}

#[tokio::test]
async fn test_package_downloads_every_resource() {
    let portal = MockPortal::new().with_package(
        "discentes",
        vec![
            resource("Discentes 2019", "CSV"),
            resource("Dicionario de dados", "PDF"),
        ],
    );
    let storage = MemoryStorage::new();
    let service = DownloadService::connect(portal.clone(), storage.clone()).await;

    let result = service.download_package("discentes", &options()).await;

    assert!(result.is_downloaded());
    assert_eq!(result.destination, Some(PathBuf::from("data/discentes")));
    assert!(storage.has_dir("data/discentes"));
    assert_eq!(
        result.files,
        vec![
            PathBuf::from("data/discentes/Discentes 2019.csv"),
            PathBuf::from("data/discentes/Dicionario de dados.pdf"),
        ]
    );
    assert_eq!(
        storage.file("data/discentes/Discentes 2019.csv"),
        Some(b"http://files.test/Discentes_2019.csv".to_vec())
    );
    assert_eq!(portal.entity_calls(), vec![("dataset".to_string(), "discentes".to_string())]);
}

#[tokio::test]
async fn test_package_applies_years_and_dictionary_filters() {
    let portal = MockPortal::new().with_package(
        "discentes",
        vec![
            resource("Dicionario de dados", "PDF"),
            resource("Discentes 2009", "CSV"),
            resource("Discentes 2010", "CSV"),
            resource("Discentes 2011", "CSV"),
            resource("Discentes 2012", "CSV"),
        ],
    );
    let storage = MemoryStorage::new();
    let service = DownloadService::connect(portal.clone(), storage.clone()).await;
    let opts = options().without_dictionary().with_years(vec![2009, 2011]);

    let result = service.download_package("discentes", &opts).await;

    assert!(result.is_downloaded());
    assert_eq!(
        storage.file_paths(),
        vec![
            PathBuf::from("data/discentes/Discentes 2009.csv"),
            PathBuf::from("data/discentes/Discentes 2011.csv"),
        ]
    );
    // Selection stops after 2011, so 2012 is never requested.
    assert_eq!(portal.byte_calls().len(), 2);
}

/// A failure in the middle of the resource loop keeps the files already
/// written and skips the rest.
#[tokio::test]
async fn test_failure_mid_loop_keeps_earlier_files() {
    let failing = resource("Notas 2010", "CSV").url;
    let portal = MockPortal::new()
        .with_package(
            "notas",
            vec![
                resource("Notas 2009", "CSV"),
                resource("Notas 2010", "CSV"),
                resource("Notas 2011", "CSV"),
            ],
        )
        .failing_url(&failing);
    let storage = MemoryStorage::new();
    let service = DownloadService::connect(portal.clone(), storage.clone()).await;
    let reporter = RecordingReporter::default();

    let result = service
        .download_package_with_progress("notas", &options(), &reporter)
        .await;

    assert!(result.is_failed());
    assert!(matches!(result.error(), Some(AppError::NetworkError(_))));
    assert_eq!(result.files, vec![PathBuf::from("data/notas/Notas 2009.csv")]);
    assert_eq!(storage.file_paths(), vec![PathBuf::from("data/notas/Notas 2009.csv")]);
    assert_eq!(portal.byte_calls().len(), 2);
    assert_eq!(reporter.count("Failed"), 1);
    assert_eq!(reporter.count("Completed"), 0);
}

/// A listed package whose metadata answers 404 is reported as not found.
#[tokio::test]
async fn test_stale_catalog_entry_is_not_found() {
    let portal = MockPortal::new().with_stale_package("removido");
    let service = DownloadService::connect(portal.clone(), MemoryStorage::new()).await;

    let result = service.download_package("removido", &options()).await;

    assert!(matches!(result.status, DownloadStatus::NotFound));
    assert_eq!(portal.entity_calls().len(), 1);
}

/// The 404 after a catalog hit is reported apart from a catalog miss.
#[tokio::test]
async fn test_stale_catalog_entry_reports_stale_event() {
    let portal = MockPortal::new().with_stale_package("removido");
    let service = DownloadService::connect(portal, MemoryStorage::new()).await;
    let reporter = RecordingReporter::default();

    let result = service
        .download_package_with_progress("removido", &options(), &reporter)
        .await;

    assert!(result.is_not_found());
    assert_eq!(reporter.count("StaleEntry"), 1);
    assert_eq!(reporter.count("NotFound"), 0);
    assert_eq!(reporter.count("Failed"), 0);
}

#[tokio::test]
async fn test_metadata_without_resources_fails() {
    let portal = MockPortal::new().with_package_metadata("quebrado", json!({ "name": "quebrado" }));
    let storage = MemoryStorage::new();
    let service = DownloadService::connect(portal, storage.clone()).await;

    let result = service.download_package("quebrado", &options()).await;

    assert!(matches!(result.error(), Some(AppError::SerializationError(_))));
    assert!(!storage.has_dir("data/quebrado"), "Directory is created after parsing");
}

/// Batches never stop early: every name gets its own outcome.
#[tokio::test]
async fn test_batch_continues_after_failures() {
    let failing = resource("Cursos 2019", "CSV").url;
    let portal = MockPortal::new()
        .with_package("cursos", vec![resource("Cursos 2019", "CSV")])
        .with_package("discentes", vec![resource("Discentes 2019", "CSV")])
        .failing_url(&failing);
    let storage = MemoryStorage::new();
    let service = DownloadService::connect(portal, storage.clone()).await;
    let names = vec![
        "cursos".to_string(),
        "inexistente".to_string(),
        "discentes".to_string(),
    ];

    let summary = service.download_packages(&names, &options()).await;

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.failed_count(), 1);
    assert_eq!(summary.not_found_count(), 1);
    assert_eq!(summary.downloaded_count(), 1);
    assert_eq!(summary.results[2].name, "discentes");
    assert!(storage.file("data/discentes/Discentes 2019.csv").is_some());
}

/// Requested years are tracked per package, not across the batch.
#[tokio::test]
async fn test_years_reset_for_each_package() {
    let portal = MockPortal::new()
        .with_package("cursos", vec![resource("Cursos 2019", "CSV")])
        .with_package("discentes", vec![resource("Discentes 2019", "CSV")]);
    let storage = MemoryStorage::new();
    let service = DownloadService::connect(portal, storage.clone()).await;
    let names = vec!["cursos".to_string(), "discentes".to_string()];

    let summary = service
        .download_packages(&names, &options().with_years(vec![2019]))
        .await;

    assert_eq!(summary.total_files(), 2);
}

#[tokio::test]
async fn test_group_downloads_members_under_group_dir() {
    let portal = MockPortal::new()
        .with_package("servidores", vec![resource("Servidores", "CSV")])
        .with_package("docentes", vec![resource("Docentes", "CSV")])
        .with_group("pessoas", &["servidores", "fantasma", "docentes"]);
    let storage = MemoryStorage::new();
    let service = DownloadService::connect(portal.clone(), storage.clone()).await;

    let result = service.download_group("pessoas", &options()).await;

    assert!(result.is_downloaded());
    assert_eq!(result.kind, EntityKind::Group);
    assert_eq!(result.destination, Some(PathBuf::from("data/pessoas")));
    assert!(storage.has_dir("data/pessoas"));
    assert_eq!(result.members.len(), 3);
    assert!(result.members[1].is_not_found());
    assert_eq!(result.total_files(), 2);
    assert!(storage.file("data/pessoas/servidores/Servidores.csv").is_some());
    assert!(storage.file("data/pessoas/docentes/Docentes.csv").is_some());
    // The unknown member is filtered by the package catalog.
    assert!(!portal
        .entity_calls()
        .contains(&("dataset".to_string(), "fantasma".to_string())));
}

#[tokio::test]
async fn test_group_not_in_catalog() {
    let portal = MockPortal::new().with_group("pessoas", &[]);
    let service = DownloadService::connect(portal.clone(), MemoryStorage::new()).await;

    let result = service.download_group("ensino", &options()).await;

    assert!(result.is_not_found());
    assert!(portal.entity_calls().is_empty());
}

#[tokio::test]
async fn test_stale_group_is_not_found() {
    let portal = MockPortal::new().with_stale_group("extinto");
    let storage = MemoryStorage::new();
    let service = DownloadService::connect(portal.clone(), storage.clone()).await;
    let reporter = RecordingReporter::default();

    let result = service
        .download_group_with_progress("extinto", &options(), &reporter)
        .await;

    assert!(result.is_not_found());
    assert!(result.members.is_empty());
    assert!(!storage.has_dir("data/extinto"));
    assert_eq!(
        portal.entity_calls(),
        vec![("group".to_string(), "extinto".to_string())]
    );
    assert_eq!(reporter.count("StaleEntry"), 1);
}

#[tokio::test]
async fn test_group_metadata_network_error_fails() {
    let portal = MockPortal::new()
        .with_group("pessoas", &["docentes"])
        .failing_entity("group", "pessoas");
    let storage = MemoryStorage::new();
    let service = DownloadService::connect(portal, storage.clone()).await;
    let reporter = RecordingReporter::default();

    let result = service
        .download_group_with_progress("pessoas", &options(), &reporter)
        .await;

    assert!(matches!(result.error(), Some(AppError::NetworkError(_))));
    assert!(result.members.is_empty());
    assert!(!storage.has_dir("data/pessoas"));
    assert_eq!(reporter.count("Failed"), 1);
    assert_eq!(reporter.count("StaleEntry"), 0);
}

#[tokio::test]
async fn test_group_metadata_without_packages_fails() {
    let portal = MockPortal::new().with_group_metadata("vazio", json!({ "name": "vazio" }));
    let storage = MemoryStorage::new();
    let service = DownloadService::connect(portal, storage.clone()).await;

    let result = service.download_group("vazio", &options()).await;

    assert!(matches!(result.error(), Some(AppError::SerializationError(_))));
    assert!(!storage.has_dir("data/vazio"), "Directory is created after parsing");
}

#[tokio::test]
async fn test_groups_batch_summary() {
    let portal = MockPortal::new()
        .with_package("cursos", vec![resource("Cursos", "CSV")])
        .with_group("ensino", &["cursos"])
        .with_group("vazio", &[]);
    let service = DownloadService::connect(portal, MemoryStorage::new()).await;
    let names = vec!["ensino".to_string(), "vazio".to_string(), "nada".to_string()];

    let summary = service.download_groups(&names, &options()).await;

    assert_eq!(summary.downloaded_count(), 2);
    assert_eq!(summary.not_found_count(), 1);
    assert_eq!(summary.total_files(), 1);
}

#[tokio::test]
async fn test_download_all_follows_catalog_order() {
    let portal = MockPortal::new()
        .with_package("b-pacote", vec![resource("B", "CSV")])
        .with_package("a-pacote", vec![resource("A", "CSV")]);
    let service = DownloadService::connect(portal, MemoryStorage::new()).await;

    let summary = service.download_all(&options()).await;

    let names: Vec<&str> = summary.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["b-pacote", "a-pacote"]);
    assert_eq!(summary.downloaded_count(), 2);
}

#[tokio::test]
async fn test_download_from_file() {
    let portal = MockPortal::new()
        .with_package("cursos", vec![resource("Cursos", "CSV")])
        .with_package("discentes", vec![resource("Discentes", "CSV")]);
    let storage = MemoryStorage::new().with_text_file(
        "pacotes.txt",
        "# pacotes\ncursos\n\n  discentes  \ninexistente\n",
    );
    let service = DownloadService::connect(portal, storage).await;

    let summary = service
        .download_from_file("pacotes.txt".as_ref(), &options())
        .await
        .unwrap();

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.downloaded_count(), 2);
    assert_eq!(summary.not_found_count(), 1);
}

#[tokio::test]
async fn test_download_from_missing_file() {
    let service = DownloadService::connect(MockPortal::new(), MemoryStorage::new()).await;

    let result = service
        .download_from_file("nope.txt".as_ref(), &options())
        .await;

    assert!(matches!(result, Err(AppError::FilesystemError { .. })));
}

/// A catalog that fails to load stays empty until it is reloaded.
#[tokio::test]
async fn test_catalog_load_failure_and_reload() {
    let portal = MockPortal::new()
        .with_package("cursos", vec![resource("Cursos", "CSV")])
        .failing_list("package_list");
    let reporter = RecordingReporter::default();
    let mut service =
        DownloadService::connect_with_progress(portal.clone(), MemoryStorage::new(), &reporter)
            .await;

    assert_eq!(reporter.count("CatalogLoadFailed"), 1);
    assert_eq!(reporter.count("CatalogLoaded"), 2);
    assert!(service.list(EntityKind::Package).is_empty());
    assert!(service.download_package("cursos", &options()).await.is_not_found());

    assert!(service.reload_packages().await.is_err());
    portal.heal_list("package_list");
    assert_eq!(service.reload_packages().await.unwrap(), 1);
    assert!(service.download_package("cursos", &options()).await.is_downloaded());
}

#[tokio::test]
async fn test_list_returns_cached_names() {
    let portal = MockPortal::new()
        .with_package("cursos", vec![])
        .with_group("ensino", &["cursos"])
        .with_tag("graduacao", &["cursos"]);
    let service = DownloadService::connect(portal, MemoryStorage::new()).await;

    assert_eq!(service.list(EntityKind::Package), ["cursos"]);
    assert_eq!(service.list(EntityKind::Group), ["ensino"]);
    assert_eq!(service.list(EntityKind::Tag), ["graduacao"]);
    assert!(service.catalog(EntityKind::Group).contains("ensino"));
}
