use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("arch-check") => arch_check(),
        Some(cmd) => anyhow::bail!("Unknown xtask command: {cmd}"),
        None => anyhow::bail!("Usage: cargo xtask <command>\n\nCommands:\n  arch-check"),
    }
}

#[derive(Debug, Deserialize)]
struct Metadata {
    packages: Vec<Package>,
}

#[derive(Debug, Deserialize)]
struct Package {
    name: String,
    manifest_path: PathBuf,
    dependencies: Vec<Dependency>,
}

#[derive(Debug, Deserialize)]
struct Dependency {
    name: String,
    kind: Option<String>,
}

/// Workspace crates each crate may depend on (normal dependencies only).
fn allowed_internal_deps() -> BTreeMap<&'static str, &'static [&'static str]> {
    BTreeMap::from([
        ("gangbook-domain", &[][..]),
        ("gangbook-shared", &["gangbook-domain"][..]),
        ("gangbook-engine", &["gangbook-domain", "gangbook-shared"][..]),
        ("gangbook-client", &["gangbook-domain", "gangbook-shared"][..]),
        ("xtask", &[][..]),
    ])
}

/// Crates that must stay free of I/O.
const PURE_CRATES: &[&str] = &["gangbook-domain", "gangbook-shared"];
const IO_CRATES: &[&str] = &["tokio", "sqlx", "axum", "reqwest", "tower", "tower-http"];

fn arch_check() -> anyhow::Result<()> {
    let output = std::process::Command::new("cargo")
        .args(["metadata", "--format-version", "1", "--no-deps"])
        .output()
        .context("running cargo metadata")?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed")
    }

    let metadata: Metadata =
        serde_json::from_slice(&output.stdout).context("parsing cargo metadata")?;
    let allowed = allowed_internal_deps();
    let mut violations = Vec::new();

    for package in &metadata.packages {
        let Some(permitted) = allowed.get(package.name.as_str()) else {
            violations.push(format!("{}: not a known workspace crate", package.name));
            continue;
        };

        for dep in package.dependencies.iter().filter(|d| d.kind.is_none()) {
            let internal = allowed.contains_key(dep.name.as_str());
            if internal && !permitted.contains(&dep.name.as_str()) {
                violations.push(format!("{} must not depend on {}", package.name, dep.name));
            }
            if PURE_CRATES.contains(&package.name.as_str()) && IO_CRATES.contains(&dep.name.as_str())
            {
                violations.push(format!("{} must stay free of I/O ({})", package.name, dep.name));
            }
        }

        if let Some(src) = package.manifest_path.parent().map(|dir| dir.join("src")) {
            violations.extend(check_sources(&package.name, &src)?);
        }
    }

    if violations.is_empty() {
        println!("arch-check: {} crates OK", metadata.packages.len());
        return Ok(());
    }

    for violation in &violations {
        eprintln!("arch-check: {violation}");
    }
    anyhow::bail!("{} architecture violation(s)", violations.len())
}

/// Source-level checks the manifest cannot express.
fn check_sources(package: &str, src: &Path) -> anyhow::Result<Vec<String>> {
    let cross_import = regex_lite::Regex::new(r"\bgangbook_(engine|client)::")
        .context("compiling import pattern")?;
    let mut violations = Vec::new();

    for file in rust_files(src)? {
        let text = std::fs::read_to_string(&file)
            .with_context(|| format!("reading {}", file.display()))?;
        for (line_no, line) in text.lines().enumerate() {
            if let Some(found) = cross_import.captures(line) {
                let target = format!("gangbook-{}", &found[1]);
                if target != package {
                    violations.push(format!(
                        "{}:{}: {package} reaches into {target}",
                        file.display(),
                        line_no + 1
                    ));
                }
            }
        }
    }

    Ok(violations)
}

fn rust_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            files.extend(rust_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
    Ok(files)
}
