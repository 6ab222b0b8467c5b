use std::path::Path;
use std::process::Command;

/// Short commit hash of the workspace, or "unknown" outside a git checkout.
fn git_short_sha(repo_root: &Path) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(["rev-parse", "--short", "HEAD"])
        .output();

    match output {
        Ok(o) if o.status.success() => {
            let sha = String::from_utf8_lossy(&o.stdout).trim().to_string();
            if sha.is_empty() { "unknown".into() } else { sha }
        }
        _ => "unknown".into(),
    }
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let repo_root = Path::new(&manifest_dir).join("..");

    println!("cargo:rustc-env=CADENCE_BUILD_SHA={}", git_short_sha(&repo_root));
    println!("cargo:rerun-if-changed=../.git/HEAD");
}
