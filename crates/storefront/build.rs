//! Build script for storefront crate.
//!
//! Fingerprints static assets so they can be served with immutable caching.
//! Each asset is copied to `static/derived/<name>.<hash>.<ext>` and its hash
//! exposed to the crate as a compile-time environment variable.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// (path under `static/`, environment variable receiving the hash)
const ASSETS: &[(&str, &str)] = &[("css/main.css", "CSS_HASH"), ("js/app.js", "JS_HASH")];

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let static_dir = Path::new(&manifest_dir).join("static");

    for (asset, var) in ASSETS {
        fingerprint(&static_dir, asset, var);
    }
}

/// Hash one asset and copy it next to its siblings under `derived/`.
fn fingerprint(static_dir: &Path, asset: &str, var: &str) {
    let source = static_dir.join(asset);
    println!("cargo:rerun-if-changed={}", source.display());

    let content = match fs::read(&source) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {asset}: {e}");
            println!("cargo:rustc-env={var}=");
            return;
        }
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let short_hash = digest.get(..8).unwrap_or(&digest);
    println!("cargo:rustc-env={var}={short_hash}");

    let asset_path = Path::new(asset);
    let stem = asset_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("asset");
    let ext = asset_path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("bin");

    let derived_dir = static_dir.join("derived");
    fs::create_dir_all(&derived_dir).expect("Failed to create derived asset directory");
    fs::copy(&source, derived_dir.join(format!("{stem}.{short_hash}.{ext}")))
        .expect("Failed to copy asset to derived directory");
}
