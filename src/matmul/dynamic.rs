//! Dynamically scheduled rows on a rayon pool.
//!
//! Output rows are cut into small chunks and handed to whichever worker is
//! idle, so uneven progress between cores evens out.

use std::ops::Range;

use log::{debug, warn};
use rayon::prelude::*;

use super::assert_shapes;
use super::loop_order::loop_order_rows;
use crate::config::ParallelConfig;

/// Accumulates `C += A * B`, `DYNAMIC_CHUNK_ROWS` rows per task, on the
/// global rayon pool.
///
/// # Panics
///
/// Panics if the buffer lengths do not match `m`, `n`, `p`.
pub fn matmul_dynamic(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, p: usize) {
    matmul_dynamic_with(&ParallelConfig::default(), a, b, c, m, n, p);
}

/// [`matmul_dynamic`] with explicit chunk size and pool size.
///
/// `config.threads` set to `Some(t)` runs on a dedicated pool of `t` workers;
/// `None` uses the global pool.
pub fn matmul_dynamic_with(
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

    let chunk = config.chunk_rows.max(1);
    let run = |c: &mut [f32]| {
        let chunks = row_chunks(m, chunk);
        c.par_chunks_mut(chunk * p)
            .zip(chunks)
            .for_each(|(rows, range)| loop_order_rows(a, b, rows, range.start, n, p));
    };

    match config.threads {
        Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => {
                debug!("dynamic kernel: dedicated pool of {threads}, {chunk} rows per task");
                pool.install(|| run(c))
            }
            Err(err) => {
                warn!("failed to build {threads}-thread pool ({err}), using global pool");
                run(c)
            }
        },
        None => {
            debug!(
                "dynamic kernel: global pool of {}, {chunk} rows per task",
                rayon::current_num_threads()
            );
            run(c)
        }
    }
}

/// Splits `0..m` into consecutive ranges of `chunk` rows; the last may be
/// shorter.
pub fn row_chunks(m: usize, chunk: usize) -> Vec<Range<usize>> {
    let chunk = chunk.max(1);
    (0..m)
        .step_by(chunk)
        .map(|start| start..(start + chunk).min(m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matmul::reference::matmul_reference;
    use crate::utils::{random_vec, seeded_rng, verify};

    #[test]
    fn test_row_chunks() {
        assert_eq!(row_chunks(10, 4), vec![0..4, 4..8, 8..10]);
        assert_eq!(row_chunks(8, 4), vec![0..4, 4..8]);
        assert_eq!(row_chunks(3, 16), vec![0..3]);
        assert!(row_chunks(0, 4).is_empty());
    }

    #[test]
    fn test_matches_reference() {
        let (m, n, p) = (37, 12, 21);
        let mut rng = seeded_rng(13);
        let a = random_vec(m * n, &mut rng);
        let b = random_vec(n * p, &mut rng);
        let mut expected = vec![0.0; m * p];
        matmul_reference(&a, &b, &mut expected, m, n, p);

        for (threads, chunk_rows) in [(None, 4), (Some(1), 1), (Some(3), 5), (Some(2), 100)] {
            let config = ParallelConfig {
                threads,
                chunk_rows,
            };
            let mut c = vec![0.0; m * p];
            matmul_dynamic_with(&config, &a, &b, &mut c, m, n, p);
            assert!(
                verify(&expected, &c, 1e-4),
                "threads {threads:?}, chunk {chunk_rows}"
            );
        }
    }

    #[test]
    fn test_empty_output() {
        let mut c: Vec<f32> = Vec::new();
        matmul_dynamic(&[], &[1.0; 4], &mut c, 0, 2, 2);
        assert!(c.is_empty());
    }
}
