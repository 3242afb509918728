//! Static row partitioning over OS threads.
//!
//! Rows of `C` are split into one contiguous run per worker before any work
//! starts. Each worker owns its run exclusively, so there is no locking and no
//! shared mutable state.

use std::ops::Range;
use std::thread;

use log::debug;

use super::assert_shapes;
use super::loop_order::loop_order_rows;
use crate::config::ParallelConfig;
use crate::DEFAULT_THREADS;

/// Accumulates `C += A * B` with one scoped thread per row range, using every
/// available core.
///
/// # Panics
///
/// Panics if the buffer lengths do not match `m`, `n`, `p`.
pub fn matmul_threaded(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, p: usize) {
    matmul_threaded_with(&ParallelConfig::default(), a, b, c, m, n, p);
}

/// [`matmul_threaded`] with an explicit worker count from `config.threads`.
pub fn matmul_threaded_with(
    config: &ParallelConfig,
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
    m: usize,
    n: usize,
    p: usize,
) {
    assert_shapes(a, b, c, m, n, p);
    if m == 0 || p == 0 {
        return;
    }

    let threads = config.threads.unwrap_or_else(default_threads);
    let ranges = partition_rows(m, threads);
    debug!("static kernel: {} workers over {m} rows", ranges.len());

    thread::scope(|scope| {
        let mut rest = c;
        for range in ranges {
            let (rows, tail) = std::mem::take(&mut rest).split_at_mut(range.len() * p);
            rest = tail;
            scope.spawn(move || loop_order_rows(a, b, rows, range.start, n, p));
        }
    });
}

/// Splits `0..m` into at most `threads` contiguous, non-empty ranges.
///
/// Every range gets `m / threads` rows; the first `m % threads` ranges get
/// one more. With more threads than rows, the surplus workers are dropped.
pub fn partition_rows(m: usize, threads: usize) -> Vec<Range<usize>> {
    let threads = threads.max(1);
    let base = m / threads;
    let extra = m % threads;

    let mut ranges = Vec::with_capacity(threads);
    let mut start = 0;
    for t in 0..threads {
        let len = base + usize::from(t < extra);
        if len == 0 {
            break;
        }
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// Hardware thread count, or [`DEFAULT_THREADS`] if it cannot be queried.
pub fn default_threads() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(DEFAULT_THREADS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matmul::reference::matmul_reference;
    use crate::utils::{random_vec, seeded_rng, verify};

    #[test]
    fn test_partition_rows() {
        assert_eq!(partition_rows(10, 3), vec![0..4, 4..7, 7..10]);
        assert_eq!(partition_rows(8, 4), vec![0..2, 2..4, 4..6, 6..8]);
        assert_eq!(partition_rows(2, 5), vec![0..1, 1..2]);
        assert_eq!(partition_rows(7, 1), vec![0..7]);
        assert!(partition_rows(0, 4).is_empty());
    }

    #[test]
    fn test_partition_covers_rows_once() {
        for m in 0..40 {
            for threads in 1..9 {
                let ranges = partition_rows(m, threads);
                let mut next = 0;
                for range in &ranges {
                    assert_eq!(range.start, next);
                    assert!(!range.is_empty());
                    next = range.end;
                }
                assert_eq!(next, m);
                assert!(ranges.len() <= threads);
            }
        }
    }

    #[test]
    fn test_matches_reference_for_thread_counts() {
        let (m, n, p) = (23, 14, 9);
        let mut rng = seeded_rng(21);
        let a = random_vec(m * n, &mut rng);
        let b = random_vec(n * p, &mut rng);
        let mut expected = vec![0.0; m * p];
        matmul_reference(&a, &b, &mut expected, m, n, p);

        for threads in [1, 2, 3, 8, 64] {
            let config = ParallelConfig {
                threads: Some(threads),
                ..Default::default()
            };
            let mut c = vec![0.0; m * p];
            matmul_threaded_with(&config, &a, &b, &mut c, m, n, p);
            assert!(verify(&expected, &c, 1e-4), "{threads} threads");
        }
    }

    #[test]
    fn test_empty_output() {
        let mut c: Vec<f32> = Vec::new();
        matmul_threaded(&[1.0; 6], &[], &mut c, 2, 3, 0);
        assert!(c.is_empty());
    }
}
