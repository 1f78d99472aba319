use chrono::{TimeZone, Utc};
use image_manifest_core::contract::{ListPage, MockObjectLister, ObjectEntry};
use image_manifest_core::generate::{generate, GenerateConfig, DEFAULT_PREFIX};
use image_manifest_core::persist::read_manifest;
use image_manifest_core::ManifestError;
use mockall::Sequence;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn config(root: &Path, with_module: bool) -> GenerateConfig {
    GenerateConfig {
        prefix: DEFAULT_PREFIX.to_string(),
        public_base_url: "https://images.example.dev".to_string(),
        manifest_path: root.join("public").join("image-manifest.json"),
        module_path: with_module.then(|| root.join("src").join("data").join("image_manifest.rs")),
    }
}

/// An object as the provider reports it, with size and modification time.
fn entry(key: &str) -> ObjectEntry {
    ObjectEntry {
        key: key.to_string(),
        size: Some(2048),
        last_modified: Some(Utc.with_ymd_and_hms(2024, 5, 20, 14, 0, 0).unwrap()),
    }
}

fn two_page_lister() -> MockObjectLister {
    let mut lister = MockObjectLister::new();
    let mut seq = Sequence::new();
    lister
        .expect_list_page()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| {
            Ok(ListPage {
                objects: vec![
                    entry("products/schoppel/"),
                    entry("products/schoppel/Zauberball 2136 Gruene-Wiese.jpg"),
                    entry("products/schoppel/info.pdf"),
                ],
                next_continuation_token: Some("page-2".to_string()),
            })
        });
    lister
        .expect_list_page()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| {
            Ok(ListPage {
                objects: vec![
                    entry("products/atelier-zitron/echt/feature/echt-2.jpg"),
                    entry("products/atelier-zitron/echt/feature/echt-1.jpg"),
                ],
                next_continuation_token: None,
            })
        });
    lister
}

#[tokio::test]
async fn generates_manifest_and_module() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), true);
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let report = generate(&two_page_lister(), &config, now)
        .await
        .expect("pipeline should succeed");

    assert_eq!(report.stats.entries_seen, 5);
    assert_eq!(report.stats.images, 3);
    assert_eq!(report.stats.skipped(), 2);
    assert!(report.summary().contains("1 product categories and 1 feature categories"));

    let on_disk = read_manifest(&config.manifest_path).unwrap();
    assert_eq!(on_disk, report.manifest);
    let feature = &on_disk.features["atelier-zitron/echt/feature"];
    assert_eq!(feature[0].filename, "echt-1.jpg");
    assert_eq!(feature[1].filename, "echt-2.jpg");

    let module = report.module.expect("module should be emitted");
    assert_eq!(module.feature_categories, 1);
    assert!(config.module_path.as_ref().unwrap().exists());
}

#[tokio::test]
async fn rerun_on_same_objects_differs_only_in_timestamp() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), false);

    let first = generate(
        &two_page_lister(),
        &config,
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    )
    .await
    .unwrap();
    let second = generate(
        &two_page_lister(),
        &config,
        Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap(),
    )
    .await
    .unwrap();

    assert_ne!(first.manifest.generated, second.manifest.generated);
    assert_eq!(
        first.manifest.features["atelier-zitron/echt/feature"][0].last_modified,
        "2024-05-20T14:00:00.000Z"
    );
    assert_eq!(first.manifest.products, second.manifest.products);
    assert_eq!(first.manifest.features, second.manifest.features);
    assert!(second.module.is_none());
}

#[tokio::test]
async fn listing_failure_leaves_previous_artifact_untouched() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), true);
    fs::create_dir_all(config.manifest_path.parent().unwrap()).unwrap();
    fs::write(&config.manifest_path, "previous artifact").unwrap();

    let mut lister = MockObjectLister::new();
    lister
        .expect_list_page()
        .times(1)
        .returning(|_| Err(ManifestError::Transport("403 Forbidden".to_string())));

    let err = generate(&lister, &config, Utc::now()).await.unwrap_err();
    assert!(matches!(err, ManifestError::Transport(_)));
    assert_eq!(
        fs::read_to_string(&config.manifest_path).unwrap(),
        "previous artifact"
    );
    assert!(!config.module_path.as_ref().unwrap().exists());
}
