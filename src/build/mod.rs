//! Building the implementation source trees.
//!
//! Each implementation is an independent cdylib crate. `cargo build` runs as
//! a blocking subprocess; its JSON compiler-artifact messages tell us where
//! the produced dynamic library landed, so no assumptions are made about the
//! target directory layout.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkshopError};

/// Build profile for an implementation source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }
}

/// Build and install one implementation, returning the path to its cdylib.
///
/// A non-zero cargo exit is fatal; the captured stderr is surfaced in the
/// error so the developer sees the compiler diagnostics.
pub fn install_package(path: &Path, profile: BuildProfile) -> Result<PathBuf> {
    let name = package_name(path);
    print!(
        "Building and installing {}",
        format!("{:<20}", format!("{name} ({})...", profile.as_str())).dimmed()
    );
    let _ = io::stdout().flush();

    let manifest = path.join("Cargo.toml");
    let mut cmd = Command::new("cargo");
    cmd.arg("build")
        .arg("--manifest-path")
        .arg(&manifest)
        .args(["--message-format", "json-render-diagnostics"]);
    if profile == BuildProfile::Release {
        cmd.arg("--release");
    }

    let output = match cmd.output() {
        Ok(output) => output,
        Err(e) => {
            println!(" {}", "FAILED".red());
            return Err(WorkshopError::Build {
                name,
                details: format!("could not run cargo: {e}"),
            });
        }
    };

    if !output.status.success() {
        println!(" {}", "FAILED".red());
        return Err(WorkshopError::Build {
            name,
            details: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    match find_cdylib_artifact(&output.stdout) {
        Some(artifact) => {
            println!(" {}", "DONE".green());
            Ok(artifact)
        }
        None => {
            println!(" {}", "FAILED".red());
            Err(WorkshopError::Build {
                name,
                details: "the build produced no cdylib artifact; set \
                          `crate-type = [\"cdylib\"]` in the implementation's [lib] section"
                    .into(),
            })
        }
    }
}

/// The subset of a cargo JSON message we care about.
#[derive(Debug, Deserialize)]
struct CargoMessage {
    reason: String,
    #[serde(default)]
    filenames: Vec<PathBuf>,
}

/// Scan cargo's JSON output for the last compiler-artifact that produced a
/// dynamic library.
fn find_cdylib_artifact(stdout: &[u8]) -> Option<PathBuf> {
    let mut artifact = None;
    for line in String::from_utf8_lossy(stdout).lines() {
        let Ok(message) = serde_json::from_str::<CargoMessage>(line) else {
            continue;
        };
        if message.reason != "compiler-artifact" {
            continue;
        }
        for file in message.filenames {
            if matches!(
                file.extension().and_then(|e| e.to_str()),
                Some("so" | "dylib" | "dll")
            ) {
                artifact = Some(file);
            }
        }
    }
    artifact
}

fn package_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
