//! Generates `$OUT_DIR/version.rs` with the adapter API version, build time
//! and git hash, included by `src/core/version.rs`.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::{env, fs};

const UNKNOWN: &str = "unknown";

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR");
    let out_dir = env::var_os("OUT_DIR").expect("cargo sets OUT_DIR");
    let manifest = Path::new(&manifest_dir).join("Cargo.toml");

    let source = format!(
        "pub const ADAPTER_API_VERSION: &str = {:?};\n\
         pub const BUILD_TIME: &str = {:?};\n\
         pub const GIT_HASH: &str = {:?};\n",
        adapter_api_version(&manifest),
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        git_short_hash(),
    );
    fs::write(PathBuf::from(out_dir).join("version.rs"), source).expect("write version.rs");

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=.git/HEAD");
}

/// `[package.metadata] adapter_api_version`
fn adapter_api_version(manifest: &Path) -> String {
    fs::read_to_string(manifest)
        .ok()
        .and_then(|text| text.parse::<toml::Table>().ok())
        .and_then(|doc| {
            doc.get("package")?
                .get("metadata")?
                .get("adapter_api_version")?
                .as_integer()
        })
        .map_or_else(|| UNKNOWN.to_string(), |version| version.to_string())
}

fn git_short_hash() -> String {
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
