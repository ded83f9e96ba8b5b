//! Stamps the binary with `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE`
//! for the startup log line. Builds outside a git checkout get `unknown`.

use std::path::Path;
use std::process::Command;

const UNKNOWN: &str = "unknown";

/// Short commit id, suffixed with `-dirty` when the tree has local edits
fn revision() -> Option<String> {
    let git = |args: &[&str]| {
        Command::new("git")
            .args(args)
            .output()
            .ok()
            .filter(|out| out.status.success())
            .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
    };

    let hash = git(&["rev-parse", "--short=10", "HEAD"]).filter(|h| !h.is_empty())?;
    let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
        .map(|status| !status.is_empty())
        .unwrap_or(false);

    Some(if dirty { format!("{}-dirty", hash) } else { hash })
}

fn set_env(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}

fn main() {
    // Re-stamp when HEAD moves, not on every source edit
    for marker in ["../.git/HEAD", "../.git/index"] {
        if Path::new(marker).exists() {
            println!("cargo:rerun-if-changed={}", marker);
        }
    }
    println!("cargo:rerun-if-changed=build.rs");

    set_env("GIT_HASH", &revision().unwrap_or_else(|| UNKNOWN.to_string()));
    set_env(
        "BUILD_TIMESTAMP",
        &chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );
    set_env(
        "BUILD_PROFILE",
        &std::env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string()),
    );
}
