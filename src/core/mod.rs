//! Workshop orchestration: install, verify, benchmark, report.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use serde::{Deserialize, Serialize};

use crate::bench::{run_benchmark, BenchmarkOptions, Measurement, DEFAULT_TARGET_DURATION_SECS};
use crate::build::{install_package, BuildProfile};
use crate::error::{Result, WorkshopError};
use crate::workload::{Implementation, WorkloadConfig};

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Harness settings, read from a JSON file next to the binary.
#[derive(Debug, Deserialize, Serialize)]
pub struct WorkshopSettings {
    #[serde(rename = "ReferencePath", default = "default_reference_path")]
    pub reference_path: PathBuf,
    #[serde(rename = "AcceleratedPath", default = "default_accelerated_path")]
    pub accelerated_path: PathBuf,
    #[serde(rename = "ReferenceProfile", default = "default_reference_profile")]
    pub reference_profile: BuildProfile,
    #[serde(rename = "AcceleratedProfile", default = "default_accelerated_profile")]
    pub accelerated_profile: BuildProfile,
    #[serde(
        rename = "TargetDurationSecs",
        default = "default_target_duration",
        deserialize_with = "validate_positive_f64"
    )]
    pub target_duration_secs: f64,
}

fn default_reference_path() -> PathBuf {
    PathBuf::from("./reference_lib")
}

fn default_accelerated_path() -> PathBuf {
    PathBuf::from("./accelerated_lib")
}

fn default_reference_profile() -> BuildProfile {
    BuildProfile::Debug
}

fn default_accelerated_profile() -> BuildProfile {
    BuildProfile::Release
}

fn default_target_duration() -> f64 {
    DEFAULT_TARGET_DURATION_SECS
}

fn validate_positive_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(serde::de::Error::custom("Value must be positive"))
    }
}

/// Load the settings file. A missing file is a distinct, clearly reported
/// failure; a malformed one surfaces the parse error.
pub fn load_settings(path: &Path) -> Result<WorkshopSettings> {
    let contents = fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            WorkshopError::MissingSettings {
                path: path.to_path_buf(),
            }
        } else {
            WorkshopError::Io(e)
        }
    })?;
    serde_json::from_str(&contents).map_err(|source| WorkshopError::InvalidSettings { source })
}

// ============================================================================
// VERIFICATION
// ============================================================================

/// Check the comparison predicate against the reference result itself.
///
/// A failure here is a harness-configuration error, never an implementation
/// defect, and aborts before any cross-implementation verdict is trusted.
pub fn self_check<C: WorkloadConfig>(config: &C, reference: &C::Output) -> Result<()> {
    if config.compare_results(reference, reference) {
        Ok(())
    } else {
        eprintln!(
            "{}",
            "The reference result does not match itself! Check your `compare_results` \
             implementation"
                .red()
        );
        Err(WorkshopError::SelfComparison {
            result: config.print_result(reference),
        })
    }
}

/// Compare the reference and accelerated results; mismatch is a hard failure
/// with both results surfaced.
pub fn cross_check<C: WorkloadConfig>(
    config: &C,
    reference: &C::Output,
    accelerated: &C::Output,
) -> Result<()> {
    if config.compare_results(reference, accelerated) {
        println!("Results {}", "MATCH".green());
        Ok(())
    } else {
        println!("Results {}", "DO NOT MATCH".red());
        let reference = config.print_result(reference);
        let accelerated = config.print_result(accelerated);
        println!("  Reference result: {reference}");
        println!("Accelerated result: {accelerated}");
        Err(WorkshopError::ResultMismatch {
            reference,
            accelerated,
        })
    }
}

// ============================================================================
// REPORTING
// ============================================================================

/// reference mean time / accelerated mean time.
pub fn speedup_ratio(reference_mean_secs: f64, accelerated_mean_secs: f64) -> f64 {
    reference_mean_secs / accelerated_mean_secs
}

/// Human-readable verdict for a speedup ratio.
pub fn speedup_label(ratio: f64) -> String {
    if ratio > 1.0 {
        format!("{ratio:.2}x faster")
    } else {
        format!("{:.2}x slower", 1.0 / ratio)
    }
}

fn print_report(reference: &Measurement, accelerated: &Measurement) {
    let scale = accelerated.scale;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Implementation".to_string(),
        format!("Mean ({})", scale.unit),
        format!("Std dev ({})", scale.unit),
        "Iterations".to_string(),
        "Chunk size".to_string(),
        "Overhead".to_string(),
    ]);
    for (name, m) in [("reference", reference), ("accelerated", accelerated)] {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{:.3}", scale.apply(m.stats.mean_secs))),
            Cell::new(format!("{:.3}", scale.apply(m.stats.std_dev_secs))),
            Cell::new(crate::bench::group_thousands(m.stats.total_iterations)),
            Cell::new(crate::bench::group_thousands(m.chunk_size as u64)),
            Cell::new(format!("{:.1}%", m.stats.overhead_pct)),
        ]);
    }
    println!("\n{table}");

    let ratio = speedup_ratio(reference.mean_secs, accelerated.mean_secs);
    let label = speedup_label(ratio);
    let styled = if ratio > 1.0 {
        label.green().bold()
    } else {
        label.red().bold()
    };
    println!("\nThe accelerated implementation ran {styled} than the reference!");
}

fn print_system_info() {
    println!("{}", "System Information".bold().yellow());
    println!("━━━━━━━━━━━━━━━━━━━");
    println!("▸ OS:  {}", os_info::get());

    let mut sys = sysinfo::System::new();
    sys.refresh_cpu_all();
    if let Some(cpu) = sys.cpus().first() {
        println!("▸ CPU: {}", cpu.brand().trim());
    }
    println!();
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

/// Run the whole workshop pipeline. No phase is skippable.
pub fn run_workshop<C: WorkloadConfig>(config: &C, settings_path: &Path) -> Result<()> {
    let separator = "=".repeat(60);
    println!("\n{separator}");
    println!("{:^60}", "Workshop Benchmark Harness".bold().cyan());
    println!("{separator}\n");

    print_system_info();

    let settings = load_settings(settings_path)?;

    println!("{}", "=== Install Phase ===".bold().cyan());
    let reference_artifact = install_package(&settings.reference_path, settings.reference_profile)?;
    let accelerated_artifact =
        install_package(&settings.accelerated_path, settings.accelerated_profile)?;

    let reference = Implementation::load(&reference_artifact)?;
    let accelerated = Implementation::load(&accelerated_artifact)?;

    println!("\n{}", "=== Verification Phase ===".bold().cyan());
    let reference_result = config.do_work(&reference)?;
    self_check(config, &reference_result)?;
    let accelerated_result = config.do_work(&accelerated)?;
    cross_check(config, &reference_result, &accelerated_result)?;

    println!("\n{}", "=== Benchmark Phase ===".bold().cyan());
    // Benchmark the accelerated implementation first and reuse its scale for
    // the reference run, so both rows read on the same unit.
    let accelerated_measurement = run_benchmark(
        &accelerated.name(),
        &mut || config.do_work(&accelerated).map(drop),
        &BenchmarkOptions {
            target_duration_secs: settings.target_duration_secs,
            forced_scale: None,
        },
    )?;
    let reference_measurement = run_benchmark(
        &reference.name(),
        &mut || config.do_work(&reference).map(drop),
        &BenchmarkOptions {
            target_duration_secs: settings.target_duration_secs,
            forced_scale: Some(accelerated_measurement.scale),
        },
    )?;

    print_report(&reference_measurement, &accelerated_measurement);
    Ok(())
}
