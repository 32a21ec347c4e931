//! The workload definition. Edit this file to change what gets benchmarked.
//!
//! The shipped workload asks each implementation for the 180th fibonacci
//! number. `do_work` owns the entry-point signature and the fixed input; the
//! harness never looks at either.

use crate::error::Result;
use crate::workload::{Implementation, WorkloadConfig};

/// Entry-point signature both implementation crates export.
type FibonacciFn = unsafe extern "C" fn(u32) -> u128;

/// Fixed input for the workload. fibonacci(180) still fits into a u128.
const WORKLOAD_INPUT: u32 = 180;

pub struct FibonacciWorkload;

impl WorkloadConfig for FibonacciWorkload {
    type Output = u128;

    fn do_work(&self, implementation: &Implementation) -> Result<u128> {
        let entry = implementation.entry_point::<FibonacciFn>()?;
        // The entry point is a pure function of its argument in both shipped
        // implementation crates.
        Ok(unsafe { entry(WORKLOAD_INPUT) })
    }

    fn compare_results(&self, a: &u128, b: &u128) -> bool {
        a == b
    }

    fn print_result(&self, result: &u128) -> String {
        result.to_string()
    }
}
