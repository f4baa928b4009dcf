// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-env-changed=QR_SCANNER_VERSION");

    // Packagers can pin the version when building outside a git checkout
    let version = std::env::var("QR_SCANNER_VERSION").unwrap_or_else(|_| {
        let pkg_version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
        match short_commit_hash() {
            Some(hash) => format!("{}-{}", pkg_version, hash),
            None => pkg_version,
        }
    });

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

fn short_commit_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!hash.is_empty()).then_some(hash)
}
