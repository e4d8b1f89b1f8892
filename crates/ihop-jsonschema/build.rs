use std::{
    env, fs,
    path::{Path, PathBuf},
    process::Command,
};

const UNKNOWN: &str = "unknown";

/// Exposes the locked `jsonschema` version and the compiler version to the crate.
fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    println!("cargo:rerun-if-changed=build.rs");

    let jsonschema_version = match find_lockfile(&manifest_dir) {
        Some(lockfile) => {
            println!("cargo:rerun-if-changed={}", lockfile.display());
            let version = fs::read_to_string(&lockfile)
                .ok()
                .and_then(|raw| locked_package_version(&raw, "jsonschema"));
            if version.is_none() {
                println!(
                    "cargo:warning=jsonschema is not listed in {}; reporting version '{UNKNOWN}'",
                    lockfile.display()
                );
            }
            version
        }
        None => {
            println!(
                "cargo:warning=no Cargo.lock found above {}; reporting jsonschema version '{UNKNOWN}'",
                manifest_dir.display()
            );
            None
        }
    }
    .unwrap_or_else(|| UNKNOWN.to_string());
    println!("cargo:rustc-env=IHOP_JSONSCHEMA_VERSION={jsonschema_version}");

    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let rustc_version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .and_then(|text| text.split_whitespace().nth(1).map(str::to_string))
        .unwrap_or_else(|| UNKNOWN.to_string());
    println!("cargo:rustc-env=IHOP_RUSTC_VERSION={rustc_version}");
}

/// Nearest `Cargo.lock` in the manifest directory or any ancestor.
fn find_lockfile(manifest_dir: &Path) -> Option<PathBuf> {
    manifest_dir
        .ancestors()
        .map(|dir| dir.join("Cargo.lock"))
        .find(|candidate| candidate.is_file())
}

fn locked_package_version(raw: &str, name: &str) -> Option<String> {
    let lock = raw.parse::<toml::Table>().ok()?;
    lock.get("package")?
        .as_array()?
        .iter()
        .filter_map(toml::Value::as_table)
        .find(|package| package.get("name").and_then(toml::Value::as_str) == Some(name))?
        .get("version")?
        .as_str()
        .map(str::to_string)
}
