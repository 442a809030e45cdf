//! Parallel quicksort built on [`forkjoin_core`], ported from the original
//! benchmark's `partition`/`quicksort` pair.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use forkjoin_core::{Error, SchedulerBuilder, Spawner};

use crate::spawn_or_inline;

/// Below this span, a partition is sorted serially rather than spawned
/// again — matches the original benchmark's cutoff.
const SERIAL_THRESHOLD: usize = 128;

fn partition(a: &[AtomicI32], lo: usize, hi: usize) -> usize {
    let pivot = a[lo].load(Ordering::Relaxed);
    let mut i = lo as isize - 1;
    let mut j = hi as isize + 1;
    loop {
        loop {
            i += 1;
            if a[i as usize].load(Ordering::Relaxed) >= pivot {
                break;
            }
        }
        loop {
            j -= 1;
            if a[j as usize].load(Ordering::Relaxed) <= pivot {
                break;
            }
        }
        if i >= j {
            return j as usize;
        }
        let ai = a[i as usize].load(Ordering::Relaxed);
        let aj = a[j as usize].load(Ordering::Relaxed);
        a[i as usize].store(aj, Ordering::Relaxed);
        a[j as usize].store(ai, Ordering::Relaxed);
    }
}

fn quicksort_serial(a: &[AtomicI32], lo: usize, hi: usize) {
    if lo >= hi {
        return;
    }
    let p = partition(a, lo, hi);
    quicksort_serial(a, lo, p);
    quicksort_serial(a, p + 1, hi);
}

fn quicksort_task(a: Arc<[AtomicI32]>, lo: usize, hi: usize, spawner: &Spawner) {
    if lo >= hi {
        return;
    }
    if hi - lo <= SERIAL_THRESHOLD {
        quicksort_serial(&a, lo, hi);
        return;
    }
    let p = partition(&a, lo, hi);
    let left = a.clone();
    spawn_or_inline(spawner, move |spawner: &Spawner| {
        quicksort_task(left, lo, p, spawner)
    });
    spawn_or_inline(spawner, move |spawner: &Spawner| {
        quicksort_task(a, p + 1, hi, spawner)
    });
}

/// Sorts `data` in place using a forkjoin pool.
///
/// `nthreads == 0` uses [`std::thread::available_parallelism`]; a good
/// default for `qlen` is `(data.len() + SERIAL_THRESHOLD - 1) /
/// SERIAL_THRESHOLD`, matching the original benchmark's sizing, though any
/// `qlen` works since a full deque just falls back to an inline partition.
pub fn sort(nthreads: i32, qlen: i32, data: &mut [i32]) -> Result<(), Error> {
    if data.len() < 2 {
        return Ok(());
    }
    if nthreads < 0 {
        return Err(Error::ConfigInvalid {
            reason: "nthreads must be >= 0",
        });
    }
    if qlen <= 0 {
        return Err(Error::ConfigInvalid {
            reason: "qlen must be > 0",
        });
    }

    let shared: Arc<[AtomicI32]> = data.iter().map(|&v| AtomicI32::new(v)).collect::<Vec<_>>().into();
    let hi = shared.len() - 1;

    let seed = shared.clone();
    let mut builder = SchedulerBuilder::new().queue_len(qlen as usize);
    if nthreads > 0 {
        builder = builder.thread_num(nthreads as usize);
    }
    builder.run(move |spawner: &Spawner| quicksort_task(seed, 0, hi, spawner))?;

    for (slot, cell) in data.iter_mut().zip(shared.iter()) {
        *slot = cell.load(Ordering::Relaxed);
    }
    Ok(())
}

/// Sorts `data` in place on the calling thread, with no scheduler involved.
pub fn sort_serial(data: &mut [i32]) {
    if data.len() < 2 {
        return;
    }
    let shared: Vec<AtomicI32> = data.iter().map(|&v| AtomicI32::new(v)).collect();
    quicksort_serial(&shared, 0, shared.len() - 1);
    for (slot, cell) in data.iter_mut().zip(shared.iter()) {
        *slot = cell.load(Ordering::Relaxed);
    }
}

/// Generates `n` pseudo-random `i32`s with the same LCG the original
/// benchmark used to build its 10-million-element stress input, so that
/// `-s`/non-`-s` runs (and repeated runs) are reproducible.
pub fn generate_input(n: usize) -> Vec<i32> {
    let mut s: u64 = 0;
    (0..n)
        .map(|_| {
            s = s
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((s >> 33) & 0x7FFF_FFFF) as i32
        })
        .collect()
}

/// Default stress-test size from the original benchmark (10 million ints).
pub const DEFAULT_LEN: usize = 10 * 1024 * 1024;

/// Recommended `qlen` for sorting `len` elements: enough partitions for the
/// whole tree to fit without ever needing the inline fallback in practice.
pub fn recommended_qlen(len: usize) -> usize {
    len.div_ceil(SERIAL_THRESHOLD).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_a_small_randomized_array() {
        let mut data = generate_input(5_000);
        let qlen = recommended_qlen(data.len());
        sort(4, qlen as i32, &mut data).unwrap();
        assert!(data.is_sorted());
    }

    #[test]
    fn empty_and_singleton_inputs_are_no_ops() {
        let mut empty: Vec<i32> = Vec::new();
        sort(2, 16, &mut empty).unwrap();
        assert!(empty.is_empty());

        let mut one = vec![42];
        sort(2, 16, &mut one).unwrap();
        assert_eq!(one, vec![42]);
    }

    #[test]
    fn parallel_result_matches_serial_result() {
        let input = generate_input(20_000);
        let mut parallel = input.clone();
        let mut serial = input;
        sort(4, recommended_qlen(parallel.len()) as i32, &mut parallel).unwrap();
        sort_serial(&mut serial);
        assert_eq!(parallel, serial);
    }

    #[test]
    fn tiny_qlen_still_sorts_correctly_via_inline_fallback() {
        let mut data = generate_input(4_000);
        sort(4, 1, &mut data).unwrap();
        assert!(data.is_sorted());
    }

    #[test]
    fn already_sorted_input_stays_sorted() {
        let mut data: Vec<i32> = (0..10_000).collect();
        sort(4, recommended_qlen(data.len()) as i32, &mut data).unwrap();
        assert!(data.is_sorted());
    }
}
