//! End-to-end pipeline tests: build real cdylib crates in a temp directory,
//! load them, and run them through verification and benchmarking.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use workshop_bench::bench::{run_benchmark, BenchmarkOptions};
use workshop_bench::build::{install_package, BuildProfile};
use workshop_bench::core::{cross_check, self_check, speedup_ratio};
use workshop_bench::workload::{Implementation, WorkloadConfig};
use workshop_bench::{Result, WorkshopError};

/// Entry point signature shared by all fixture crates.
type EntryFn = unsafe extern "C" fn(u32) -> u64;

const WORKLOAD_INPUT: u32 = 180;

struct FixtureWorkload;

impl WorkloadConfig for FixtureWorkload {
    type Output = u64;

    fn do_work(&self, implementation: &Implementation) -> Result<u64> {
        let entry = implementation.entry_point::<EntryFn>()?;
        Ok(unsafe { entry(WORKLOAD_INPUT) })
    }

    fn compare_results(&self, a: &u64, b: &u64) -> bool {
        a == b
    }

    fn print_result(&self, result: &u64) -> String {
        result.to_string()
    }
}

/// Write a minimal cdylib crate whose `implementation` body is `body`.
fn write_impl_crate(root: &Path, name: &str, body: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(dir.join("src")).unwrap();
    fs::write(
        dir.join("Cargo.toml"),
        format!(
            "[package]\nname = \"{name}\"\nversion = \"0.1.0\"\nedition = \"2021\"\n\n\
             [lib]\ncrate-type = [\"cdylib\"]\n\n[workspace]\n"
        ),
    )
    .unwrap();
    fs::write(
        dir.join("src/lib.rs"),
        format!("#[no_mangle]\npub extern \"C\" fn implementation(n: u32) -> u64 {{ {body} }}\n"),
    )
    .unwrap();
    dir
}

#[test]
fn matching_implementations_verify_and_benchmark() {
    let tmp = TempDir::new().unwrap();
    let reference_dir = write_impl_crate(tmp.path(), "pipeline_ref", "n as u64 * 3");
    let accelerated_dir = write_impl_crate(tmp.path(), "pipeline_acc", "((n as u64) << 1) + n as u64");

    let reference_artifact = install_package(&reference_dir, BuildProfile::Debug).unwrap();
    let accelerated_artifact = install_package(&accelerated_dir, BuildProfile::Debug).unwrap();

    let reference = Implementation::load(&reference_artifact).unwrap();
    let accelerated = Implementation::load(&accelerated_artifact).unwrap();

    let config = FixtureWorkload;
    let reference_result = config.do_work(&reference).unwrap();
    self_check(&config, &reference_result).unwrap();
    let accelerated_result = config.do_work(&accelerated).unwrap();
    cross_check(&config, &reference_result, &accelerated_result).unwrap();

    let options = BenchmarkOptions {
        target_duration_secs: 0.05,
        forced_scale: None,
    };
    let accelerated_measurement = run_benchmark(
        "accelerated fixture",
        &mut || config.do_work(&accelerated).map(drop),
        &options,
    )
    .unwrap();
    let reference_measurement = run_benchmark(
        "reference fixture",
        &mut || config.do_work(&reference).map(drop),
        &BenchmarkOptions {
            target_duration_secs: 0.05,
            forced_scale: Some(accelerated_measurement.scale),
        },
    )
    .unwrap();

    // Both runs report on the shared scale, and the ratio is a positive
    // finite number either way.
    assert_eq!(reference_measurement.scale, accelerated_measurement.scale);
    let ratio = speedup_ratio(
        reference_measurement.mean_secs,
        accelerated_measurement.mean_secs,
    );
    assert!(ratio.is_finite());
    assert!(ratio > 0.0);
}

#[test]
fn diverging_implementations_fail_verification() {
    let tmp = TempDir::new().unwrap();
    let reference_dir = write_impl_crate(tmp.path(), "mismatch_ref", "n as u64");
    let accelerated_dir = write_impl_crate(tmp.path(), "mismatch_acc", "n as u64 + 1");

    let reference_artifact = install_package(&reference_dir, BuildProfile::Debug).unwrap();
    let accelerated_artifact = install_package(&accelerated_dir, BuildProfile::Debug).unwrap();

    let reference = Implementation::load(&reference_artifact).unwrap();
    let accelerated = Implementation::load(&accelerated_artifact).unwrap();

    let config = FixtureWorkload;
    let reference_result = config.do_work(&reference).unwrap();
    self_check(&config, &reference_result).unwrap();
    let accelerated_result = config.do_work(&accelerated).unwrap();

    let err = cross_check(&config, &reference_result, &accelerated_result).unwrap_err();
    match err {
        WorkshopError::ResultMismatch {
            reference,
            accelerated,
        } => {
            assert_eq!(reference, "180");
            assert_eq!(accelerated, "181");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn build_failure_halts_before_verification() {
    let tmp = TempDir::new().unwrap();
    // A source tree with no manifest cannot build.
    let broken = tmp.path().join("broken_impl");
    fs::create_dir_all(&broken).unwrap();

    let err = install_package(&broken, BuildProfile::Release).unwrap_err();
    assert!(matches!(err, WorkshopError::Build { .. }));
}

#[test]
fn missing_entry_point_is_reported_as_such() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("no_entry");
    fs::create_dir_all(dir.join("src")).unwrap();
    fs::write(
        dir.join("Cargo.toml"),
        "[package]\nname = \"no_entry\"\nversion = \"0.1.0\"\nedition = \"2021\"\n\n\
         [lib]\ncrate-type = [\"cdylib\"]\n\n[workspace]\n",
    )
    .unwrap();
    fs::write(
        dir.join("src/lib.rs"),
        "#[no_mangle]\npub extern \"C\" fn something_else(n: u32) -> u64 { n as u64 }\n",
    )
    .unwrap();

    let artifact = install_package(&dir, BuildProfile::Debug).unwrap();
    let err = Implementation::load(&artifact).unwrap_err();
    assert!(matches!(err, WorkshopError::EntryPoint { .. }));
}
