use chrono::{TimeZone, Utc};
use image_manifest_core::codegen::render_module;
use image_manifest_core::manifest::Manifest;

// Checked-in output of `render_module`, compiled here as a module.
#[path = "fixtures/image_manifest.rs"]
mod image_manifest;

const FIXTURE: &str = include_str!("fixtures/image_manifest.rs");

#[test]
fn generated_module_answers_lookups() {
    let images = image_manifest::find_feature_images("/atelier-zitron/echt/feature");
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].filename, "echt \"#2\".jpg");

    let mut images = images.to_vec();
    assert_eq!(
        image_manifest::get_primary_image_url(&mut images),
        "https://images.example.dev/products/atelier-zitron/echt/feature/echt-1.jpg"
    );

    assert_eq!(
        image_manifest::available_feature_paths(),
        vec!["atelier-zitron/echt/feature"]
    );
    assert_eq!(image_manifest::available_product_paths(), vec!["schoppel"]);
    assert_eq!(image_manifest::IMAGE_MANIFEST.image_count(), 3);
}

#[test]
fn template_still_renders_the_checked_in_module() {
    let manifest: Manifest =
        serde_json::from_str(image_manifest::IMAGE_MANIFEST_JSON).expect("embedded JSON parses");
    let generated_at = Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap();

    let rendered = render_module(&manifest, generated_at).unwrap();

    assert_eq!(rendered, FIXTURE);
}
