//! The workload contract and the loaded-implementation handle.
//!
//! The harness never inspects workload semantics: the driver decides how the
//! implementation entry point is invoked and with what input, and the
//! comparison predicate decides what "identical results" means.

use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use crate::error::{Result, WorkshopError};

/// Name of the exported symbol every implementation must provide.
pub const ENTRY_POINT: &[u8] = b"implementation";

/// A built implementation, loaded as a dynamic library.
pub struct Implementation {
    library: Library,
    artifact: PathBuf,
}

impl Implementation {
    /// Load a built artifact and eagerly check that it exports the
    /// `implementation` entry point, so a misbuilt library fails here rather
    /// than mid-verification.
    pub fn load(artifact: &Path) -> Result<Self> {
        let library = unsafe { Library::new(artifact) }.map_err(|source| WorkshopError::Import {
            artifact: artifact.to_path_buf(),
            source,
        })?;

        let implementation = Self {
            library,
            artifact: artifact.to_path_buf(),
        };
        implementation.resolve::<*const ()>()?;
        Ok(implementation)
    }

    /// Resolve the entry point with the signature the workload expects.
    ///
    /// The signature is chosen by the workload driver; the harness only knows
    /// the symbol name. Calling the resolved function is unsafe and is the
    /// driver's responsibility.
    pub fn entry_point<T>(&self) -> Result<Symbol<'_, T>> {
        self.resolve::<T>()
    }

    /// File stem of the loaded artifact, for console messages.
    pub fn name(&self) -> String {
        self.artifact
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.artifact.display().to_string())
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    fn resolve<T>(&self) -> Result<Symbol<'_, T>> {
        unsafe { self.library.get::<T>(ENTRY_POINT) }.map_err(|source| {
            WorkshopError::EntryPoint {
                artifact: self.artifact.clone(),
                source,
            }
        })
    }
}

impl std::fmt::Debug for Implementation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Implementation")
            .field("artifact", &self.artifact)
            .finish_non_exhaustive()
    }
}

/// The typed workload configuration contract: three named operations that
/// together define the workload.
///
/// The binary registers one implementation of this trait (see
/// `src/workshop_config.rs`) and the orchestrator threads it through
/// verification and benchmarking.
pub trait WorkloadConfig {
    /// Whatever the workload produces. The harness only ever passes values of
    /// this type back into `compare_results` and `print_result`.
    type Output;

    /// Invoke the implementation with the workload's fixed input.
    fn do_work(&self, implementation: &Implementation) -> Result<Self::Output>;

    /// Decide whether two results are equivalent.
    fn compare_results(&self, a: &Self::Output, b: &Self::Output) -> bool;

    /// Render a result for mismatch diagnostics.
    fn print_result(&self, result: &Self::Output) -> String;
}
