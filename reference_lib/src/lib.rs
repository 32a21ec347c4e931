//! Reference implementation: straightforward iterative fibonacci.
//!
//! The output of this crate defines correctness for the workshop run.

/// Compute the `n`th fibonacci number. Wrapping arithmetic keeps the function
/// total; the shipped workload input (180) stays well inside u128 range.
#[no_mangle]
pub extern "C" fn implementation(n: u32) -> u128 {
    let mut a: u128 = 0;
    let mut b: u128 = 1;

    for _ in 0..n {
        (a, b) = (b, a.wrapping_add(b));
    }

    a
}
