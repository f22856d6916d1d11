//! Digit permutation engine.
//!
//! Counts and generates the distinct digit permutations of a number, used by
//! "đảo" style bet types where every rearrangement of the chosen number is
//! covered by one stake. Pure functions over their input; callers that accept
//! untrusted input should check [`count_permutations`] against their own
//! bound before calling [`generate_permutations`].

use std::collections::BTreeSet;

/// Count the distinct permutations of a digit string: `n! / Π(count(d)!)`
/// over each distinct digit `d`. Repeated digits collapse, so `"112"` counts
/// 3, not 6. Empty and single-character inputs count 1.
///
/// Saturates at `usize::MAX` for inputs too long to count exactly; such
/// inputs are far beyond any expansion bound anyway.
pub fn count_permutations(digits: &str) -> usize {
    let n = digits.chars().count();
    if n <= 1 {
        return 1;
    }
    if n > 20 {
        return usize::MAX;
    }

    let mut counts = [0u32; 10];
    for c in digits.chars() {
        if let Some(d) = c.to_digit(10) {
            counts[d as usize] += 1;
        }
    }

    let mut result = factorial(n as u128);
    for &count in &counts {
        if count > 1 {
            result /= factorial(count as u128);
        }
    }
    usize::try_from(result).unwrap_or(usize::MAX)
}

/// Generate every distinct permutation of a digit string.
///
/// Uses Heap's algorithm (in-place swaps) over the digit list, collecting
/// into a `BTreeSet` so duplicate emissions from repeated digits dedupe.
/// The result length always equals [`count_permutations`] of the input.
pub fn generate_permutations(digits: &str) -> BTreeSet<String> {
    let mut result = BTreeSet::new();
    let mut chars: Vec<char> = digits.chars().collect();

    if chars.len() <= 1 {
        result.insert(digits.to_string());
        return result;
    }

    let k = chars.len();
    heap(k, &mut chars, &mut result);
    result
}

/// Heap's algorithm: permute the first `k` elements of `arr` in place,
/// recording each full arrangement.
fn heap(k: usize, arr: &mut Vec<char>, out: &mut BTreeSet<String>) {
    if k == 1 {
        out.insert(arr.iter().collect());
        return;
    }
    for i in 0..k {
        heap(k - 1, arr, out);
        if k % 2 == 0 {
            arr.swap(i, k - 1);
        } else {
            arr.swap(0, k - 1);
        }
    }
}

fn factorial(n: u128) -> u128 {
    (1..=n).product()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
