//! Accelerated implementation: fast-doubling fibonacci.
//!
//! Must produce exactly the same values as `reference_lib` for every input;
//! the harness verifies that before benchmarking.

/// Compute the `n`th fibonacci number in O(log n) multiplications using the
/// fast-doubling identities:
///   F(2k)   = F(k) * (2*F(k+1) - F(k))
///   F(2k+1) = F(k)^2 + F(k+1)^2
#[no_mangle]
pub extern "C" fn implementation(n: u32) -> u128 {
    fast_doubling(n).0
}

/// Returns (F(n), F(n+1)). Wrapping arithmetic keeps the function total;
/// results are exact for every n where F(n+1) fits u128, which covers the
/// shipped workload input.
fn fast_doubling(n: u32) -> (u128, u128) {
    if n == 0 {
        return (0, 1);
    }

    let (a, b) = fast_doubling(n / 2);
    let c = a.wrapping_mul(b.wrapping_mul(2).wrapping_sub(a));
    let d = a.wrapping_mul(a).wrapping_add(b.wrapping_mul(b));

    if n % 2 == 0 {
        (c, d)
    } else {
        (d, c.wrapping_add(d))
    }
}
