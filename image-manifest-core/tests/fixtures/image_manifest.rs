// This file is auto-generated. Do not edit manually.
// Generated from image-manifest.json at: 2024-06-02T09:00:00.000Z

use std::sync::LazyLock;

use image_manifest_core::manifest::{ImageFile, Manifest};
use image_manifest_core::resolve;

pub const IMAGE_MANIFEST_JSON: &str = r##"{
  "generated": "2024-06-01T00:00:00.000Z",
  "products": {
    "schoppel": [
      {
        "filename": "Zauberball 2136 Gruene-Wiese.jpg",
        "url": "https://images.example.dev/products/schoppel/Zauberball 2136 Gruene-Wiese.jpg",
        "size": 2048,
        "lastModified": "2024-05-20T14:00:00.000Z",
        "colorInfo": "2136 Gruene Wiese"
      }
    ]
  },
  "features": {
    "atelier-zitron/echt/feature": [
      {
        "filename": "echt \"#2\".jpg",
        "url": "https://images.example.dev/products/atelier-zitron/echt/feature/echt \"#2\".jpg",
        "size": 1024,
        "lastModified": "2024-05-20T14:00:00.000Z",
        "colorInfo": "Echt 2"
      },
      {
        "filename": "echt-1.jpg",
        "url": "https://images.example.dev/products/atelier-zitron/echt/feature/echt-1.jpg",
        "size": 4096,
        "lastModified": "2024-05-20T14:00:00.000Z",
        "colorInfo": "Echt 1"
      }
    ]
  }
}"##;

pub static IMAGE_MANIFEST: LazyLock<Manifest> =
    LazyLock::new(|| resolve::parse_embedded(IMAGE_MANIFEST_JSON));

pub fn find_feature_images(sub_directory: &str) -> &'static [ImageFile] {
    resolve::find_feature_images(&IMAGE_MANIFEST, sub_directory)
}

pub fn get_primary_image_url(images: &mut [ImageFile]) -> String {
    resolve::get_primary_image_url(images)
}

pub fn available_feature_paths() -> Vec<&'static str> {
    IMAGE_MANIFEST.feature_paths().collect()
}

pub fn available_product_paths() -> Vec<&'static str> {
    IMAGE_MANIFEST.product_paths().collect()
}
