#![forbid(unsafe_code)]

//! Two independent in-process solvers for the points problem.
//!
//! Each sub-instance pairs `first[i]` with `second[i]` as a point; the answer
//! is the number of point pairs whose order by `first` disagrees with their
//! order by `second`. These stand in for the external executables in tests.

use std::fmt::Write as _;

use crate::generator::{SubInstance, parse_instance};
use crate::solver::FnSolver;

pub type ReferenceSolver = FnSolver<fn(&str) -> Result<String, String>>;

/// Quadratic scan over every pair of points.
#[must_use]
pub fn brute_force_solver() -> ReferenceSolver {
    FnSolver::new(
        "reference-brute-force",
        solve_brute_force as fn(&str) -> Result<String, String>,
    )
}

/// Sort by `first`, then count inversions of `second` with a merge sort.
#[must_use]
pub fn merge_count_solver() -> ReferenceSolver {
    FnSolver::new(
        "reference-merge-count",
        solve_merge_count as fn(&str) -> Result<String, String>,
    )
}

fn solve_brute_force(input: &str) -> Result<String, String> {
    solve_with(input, count_discordant_pairs)
}

fn solve_merge_count(input: &str) -> Result<String, String> {
    solve_with(input, count_inversions_merge)
}

fn solve_with(input: &str, count: fn(&SubInstance) -> u64) -> Result<String, String> {
    let instance = parse_instance(input).map_err(|err| err.to_string())?;
    let mut out = String::new();
    for case in &instance.cases {
        let _ = writeln!(out, "{}", count(case));
    }
    Ok(out)
}

#[must_use]
pub fn count_discordant_pairs(case: &SubInstance) -> u64 {
    let n = case.size();
    let mut total = 0u64;
    for i in 0..n {
        for j in (i + 1)..n {
            let by_first = case.first[i] < case.first[j];
            let by_second = case.second[i] < case.second[j];
            if by_first != by_second {
                total += 1;
            }
        }
    }
    total
}

#[must_use]
pub fn count_inversions_merge(case: &SubInstance) -> u64 {
    let mut points: Vec<(i64, i64)> = case
        .first
        .iter()
        .copied()
        .zip(case.second.iter().copied())
        .collect();
    points.sort_unstable_by_key(|&(x, _)| x);
    let mut ys: Vec<i64> = points.into_iter().map(|(_, y)| y).collect();
    let mut scratch = vec![0i64; ys.len()];
    merge_sort_count(&mut ys, &mut scratch)
}

fn merge_sort_count(values: &mut [i64], scratch: &mut [i64]) -> u64 {
    let len = values.len();
    if len < 2 {
        return 0;
    }
    let mid = len / 2;
    let mut inversions = {
        let (left, right) = values.split_at_mut(mid);
        let (left_scratch, right_scratch) = scratch.split_at_mut(mid);
        merge_sort_count(left, left_scratch) + merge_sort_count(right, right_scratch)
    };

    let (mut i, mut j, mut k) = (0, mid, 0);
    while i < mid && j < len {
        if values[i] <= values[j] {
            scratch[k] = values[i];
            i += 1;
        } else {
            scratch[k] = values[j];
            inversions += (mid - i) as u64;
            j += 1;
        }
        k += 1;
    }
    scratch[k..k + (mid - i)].copy_from_slice(&values[i..mid]);
    k += mid - i;
    scratch[k..len].copy_from_slice(&values[j..len]);
    values.copy_from_slice(&scratch[..len]);
    inversions
}
