use std::process::Command;

fn main() {
    if let Ok(target) = std::env::var("TARGET") {
        println!("cargo:rustc-env=TARGET={target}");
    }

    let rev = match std::env::var("BUILD_REV") {
        Ok(rev) => Some(rev),
        Err(_) => git_rev(),
    };
    if let Some(rev) = rev {
        println!("cargo:rustc-env=BUILD_REV={}", rev.trim());
    }
    println!("cargo:rerun-if-env-changed=BUILD_REV");
}

fn git_rev() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}
