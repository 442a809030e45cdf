//! A small, structured stand-in for the original benchmark's
//! `printf("Done in %lf seconds.\n", delay)`.

use std::fmt;
use std::time::Duration;

/// Describes one completed benchmark run.
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkReport {
    /// Which workload ran (`"mandelbrot"` or `"quicksort"`).
    pub workload: &'static str,
    /// `"parallel"` or `"serial"`.
    pub mode: &'static str,
    /// Worker thread count used (meaningless for `mode == "serial"`).
    pub threads: usize,
    /// Wall-clock time for the run.
    pub elapsed: Duration,
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            "serial" => write!(
                f,
                "{} (serial): done in {:.6} seconds.",
                self.workload,
                self.elapsed.as_secs_f64()
            ),
            _ => write!(
                f,
                "{} ({} threads): done in {:.6} seconds.",
                self.workload,
                self.threads,
                self.elapsed.as_secs_f64()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_report_omits_thread_count() {
        let report = BenchmarkReport {
            workload: "quicksort",
            mode: "serial",
            threads: 0,
            elapsed: Duration::from_secs_f64(1.5),
        };
        assert_eq!(report.to_string(), "quicksort (serial): done in 1.500000 seconds.");
    }

    #[test]
    fn parallel_report_includes_thread_count() {
        let report = BenchmarkReport {
            workload: "mandelbrot",
            mode: "parallel",
            threads: 8,
            elapsed: Duration::from_millis(250),
        };
        assert_eq!(report.to_string(), "mandelbrot (8 threads): done in 0.250000 seconds.");
    }
}
