use std::process::Command;
use vergen::EmitBuilder;

fn main() {
    // Git metadata is optional; /api/version falls back to "unknown" without it
    let is_git_available = Command::new("git")
        .args(["rev-parse", "--git-dir"])
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);

    let result = if is_git_available {
        EmitBuilder::builder()
            .build_timestamp()
            .git_sha(true)
            .emit()
    } else {
        EmitBuilder::builder().build_timestamp().emit()
    };

    if let Err(e) = result {
        println!("cargo:warning=unable to generate build metadata: {e}");
    }
}
