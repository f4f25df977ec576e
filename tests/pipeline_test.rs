//! End-to-end pipeline tests with an in-memory catalog and a fake ffmpeg.
#![cfg(unix)]

mod common;

use std::path::Path;
use std::sync::Arc;

use common::{dune_details, failing_ffmpeg, fake_ffmpeg, series_details, slow_ffmpeg, MockCatalog};
use reeltag::{Embedder, MetadataCache, Pipeline, Resolver};
use reeltag_av::ToolConfig;
use reeltag_core::config::LibraryConfig;
use reeltag_core::MediaKind;

const DUNE_POSTER: &str = "/d5NXSklXo0qyIYkgV94XAgMIckC.jpg";

fn catalog() -> Arc<MockCatalog> {
    Arc::new(
        MockCatalog::new()
            .with_entry(MediaKind::Movie, "Dune", dune_details())
            .with_entry(MediaKind::Series, "Breaking Bad", series_details())
            .with_image(DUNE_POSTER, b"poster"),
    )
}

fn library(root: &Path) {
    std::fs::create_dir_all(root.join("Movies")).unwrap();
    std::fs::create_dir_all(root.join("Shows")).unwrap();
    std::fs::write(root.join("Movies/Dune (2021).mkv"), b"dune").unwrap();
    std::fs::write(root.join("Shows/Breaking.Bad.S01E01.720p.mp4"), b"bb").unwrap();
    std::fs::write(root.join("Movies/Unknown.Home.Video.m4v"), b"home").unwrap();
    std::fs::write(root.join("Movies/readme.txt"), b"skip").unwrap();
}

fn pipeline(catalog: Arc<MockCatalog>, cache: &MetadataCache, ffmpeg: &Path) -> Pipeline {
    let resolver = Resolver::new(catalog, cache.posters().clone());
    let embedder = Embedder::new(ToolConfig::at("ffmpeg", ffmpeg));
    Pipeline::new(resolver, embedder, 2)
}

#[tokio::test]
async fn scan_resolves_embeds_and_persists() {
    let root = tempfile::tempdir().unwrap();
    let tools = tempfile::tempdir().unwrap();
    library(root.path());
    let (ffmpeg, log) = fake_ffmpeg(tools.path());

    let library_cfg = LibraryConfig::default();
    let mut cache = MetadataCache::open(root.path(), &library_cfg).unwrap();
    let summary = pipeline(catalog(), &cache, &ffmpeg)
        .run(root.path(), &mut cache)
        .await
        .unwrap();

    assert_eq!(summary.files_found, 3);
    assert_eq!(summary.resolved, 2);
    assert_eq!(summary.unresolved, 1);
    assert_eq!(summary.cache_hits, 0);
    assert_eq!(summary.embedded, 2);
    assert_eq!(summary.embed_failures, 0);

    // Resolved files were rewritten; the unresolved one was not touched.
    assert_eq!(
        std::fs::read_to_string(root.path().join("Movies/Dune (2021).mkv")).unwrap(),
        "dunetagged\n"
    );
    assert_eq!(
        std::fs::read(root.path().join("Movies/Unknown.Home.Video.m4v")).unwrap(),
        b"home"
    );

    let reloaded = MetadataCache::open(root.path(), &library_cfg).unwrap();
    assert_eq!(reloaded.len(), 2);
    let dune = reloaded.get("Movies/Dune (2021).mkv").unwrap();
    assert_eq!(dune.catalog_id, 438631);
    assert!(reloaded.get("Shows/Breaking.Bad.S01E01.720p.mp4").is_some());

    // Dune's poster was attached as cover art.
    let invocations = std::fs::read_to_string(log).unwrap();
    assert!(invocations.contains("attached_pic"));
    assert!(invocations.contains("title=Dune"));
    assert!(root.path().join(".metadata/posters/438631.jpg").is_file());
}

#[tokio::test]
async fn second_scan_is_served_from_cache() {
    let root = tempfile::tempdir().unwrap();
    let tools = tempfile::tempdir().unwrap();
    library(root.path());
    let (ffmpeg, _log) = fake_ffmpeg(tools.path());
    let library_cfg = LibraryConfig::default();

    let first = catalog();
    let mut cache = MetadataCache::open(root.path(), &library_cfg).unwrap();
    pipeline(first.clone(), &cache, &ffmpeg)
        .run(root.path(), &mut cache)
        .await
        .unwrap();
    let index = library_cfg.index_path(root.path());
    let after_first = std::fs::read(&index).unwrap();

    // Only the file that could not be resolved is looked up again.
    let second = catalog();
    let mut cache = MetadataCache::open(root.path(), &library_cfg).unwrap();
    let summary = pipeline(second.clone(), &cache, &ffmpeg)
        .run(root.path(), &mut cache)
        .await
        .unwrap();

    assert_eq!(summary.cache_hits, 2);
    assert_eq!(summary.resolved, 0);
    assert_eq!(second.detail_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(second.image_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(std::fs::read(&index).unwrap(), after_first);
}

#[tokio::test]
async fn fully_cached_scan_makes_no_remote_calls() {
    let root = tempfile::tempdir().unwrap();
    let tools = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("Dune (2021).mkv"), b"dune").unwrap();
    let (ffmpeg, _log) = fake_ffmpeg(tools.path());
    let library_cfg = LibraryConfig::default();

    let mut cache = MetadataCache::open(root.path(), &library_cfg).unwrap();
    pipeline(catalog(), &cache, &ffmpeg)
        .run(root.path(), &mut cache)
        .await
        .unwrap();
    let index = library_cfg.index_path(root.path());
    let after_first = std::fs::read(&index).unwrap();

    let second = catalog();
    let mut cache = MetadataCache::open(root.path(), &library_cfg).unwrap();
    let summary = pipeline(second.clone(), &cache, &ffmpeg)
        .run(root.path(), &mut cache)
        .await
        .unwrap();

    assert_eq!(summary.cache_hits, 1);
    assert_eq!(second.calls(), 0);
    assert_eq!(std::fs::read(&index).unwrap(), after_first);
}

#[tokio::test]
async fn failed_remux_leaves_file_unchanged() {
    let root = tempfile::tempdir().unwrap();
    let tools = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("Dune (2021).mkv"), b"original bytes").unwrap();
    let ffmpeg = failing_ffmpeg(tools.path());

    let mut cache = MetadataCache::open(root.path(), &LibraryConfig::default()).unwrap();
    let summary = pipeline(catalog(), &cache, &ffmpeg)
        .run(root.path(), &mut cache)
        .await
        .unwrap();

    assert_eq!(summary.resolved, 1);
    assert_eq!(summary.embedded, 0);
    assert_eq!(summary.embed_failures, 1);
    assert_eq!(
        std::fs::read(root.path().join("Dune (2021).mkv")).unwrap(),
        b"original bytes"
    );
    // The record is still cached so the next run only retries the embed.
    assert_eq!(cache.len(), 1);

    // No scratch directories are left behind.
    let leftovers: Vec<_> = std::fs::read_dir(root.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|n| n.starts_with(".reeltag-"))
        .collect();
    assert!(leftovers.is_empty(), "leftover scratch dirs: {leftovers:?}");
}

#[tokio::test]
async fn embedder_writes_through_scratch_dir() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let tools = tempfile::tempdir().unwrap();
    let file = root.path().join("Dune (2021).mkv");
    std::fs::write(&file, b"dune").unwrap();
    let (ffmpeg, _log) = fake_ffmpeg(tools.path());

    let embedder = Embedder::new(ToolConfig::at("ffmpeg", &ffmpeg))
        .with_scratch_dir(Some(scratch.path().to_path_buf()));
    embedder
        .try_embed(&file, &common::sample_record())
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&file).unwrap(), "dunetagged\n");
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn lookups_progress_while_a_remux_runs() {
    use reeltag::metadata::providers::TmdbProvider;
    use reeltag_core::config::CatalogConfig;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    for (id, title) in [(1, "Alpha"), (2, "Beta")] {
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .and(query_param("query", title))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"results": [{"id": id}]}))
                    .set_delay(Duration::from_millis(400)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/movie/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": id, "title": title})))
            .mount(&server)
            .await;
    }

    let root = tempfile::tempdir().unwrap();
    let tools = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("Alpha.mkv"), b"a").unwrap();
    std::fs::write(root.path().join("Beta.mkv"), b"b").unwrap();
    // Each remux outlasts the catalog timeout.
    let (ffmpeg, _log) = slow_ffmpeg(tools.path(), 2.5);

    let catalog = CatalogConfig {
        api_key: "test-key".into(),
        language: "en-US".into(),
        base_url: server.uri(),
        image_base_url: format!("{}/t/p/w500", server.uri()),
        timeout_secs: 1,
        requests_per_second: 50,
    };
    let mut cache = MetadataCache::open(root.path(), &LibraryConfig::default()).unwrap();
    let resolver = Resolver::new(
        Arc::new(TmdbProvider::new(&catalog).unwrap()),
        cache.posters().clone(),
    );
    let embedder = Embedder::new(ToolConfig::at("ffmpeg", &ffmpeg));
    let summary = Pipeline::new(resolver, embedder, 4)
        .run(root.path(), &mut cache)
        .await
        .unwrap();

    assert_eq!(summary.unresolved, 0);
    assert_eq!(summary.resolved, 2);
    assert_eq!(summary.embedded, 2);
    assert!(cache.get("Alpha.mkv").is_some());
    assert!(cache.get("Beta.mkv").is_some());
}
