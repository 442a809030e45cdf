//! `forkjoin-bench`: the command-line entry point tying the scheduler to
//! its two workloads. Mirrors the original benchmark's `-q|-m [-t N] [-s]`
//! surface; this binary is the only crate in the workspace that installs a
//! concrete logger.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use forkjoin_core::Error;
use forkjoin_workloads::report::BenchmarkReport;
use forkjoin_workloads::{bmp, mandelbrot, quicksort};

/// Benchmark the forkjoin work-stealing scheduler against two workloads.
#[derive(Parser)]
#[command(name = "forkjoin-bench", version, about)]
struct Cli {
    /// Run the parallel quicksort workload.
    #[arg(short = 'q', long, conflicts_with = "mandelbrot")]
    quicksort: bool,

    /// Run the Mandelbrot renderer workload.
    #[arg(short = 'm', long)]
    mandelbrot: bool,

    /// Run the serial baseline instead of the scheduler.
    #[arg(short = 's', long)]
    serial: bool,

    /// Worker thread count (0 = available_parallelism). Required unless `-s`.
    #[arg(short = 't', long)]
    threads: Option<i32>,

    /// Output path for the rendered Mandelbrot image.
    #[arg(short = 'o', long, default_value = "mandelbrot.bmp")]
    output: PathBuf,

    /// Number of elements to sort.
    #[arg(short = 'n', long, default_value_t = quicksort::DEFAULT_LEN)]
    len: usize,
}

fn resolved_thread_count(requested: Option<i32>) -> usize {
    match requested {
        Some(n) if n > 0 => n as usize,
        _ => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
    }
}

fn run_quicksort(cli: &Cli) -> Result<BenchmarkReport, Error> {
    let mut data = quicksort::generate_input(cli.len);
    log::info!("generated {} elements to sort", data.len());

    let start = Instant::now();
    if cli.serial {
        quicksort::sort_serial(&mut data);
    } else {
        let qlen = quicksort::recommended_qlen(data.len());
        quicksort::sort(cli.threads.unwrap_or(0), qlen as i32, &mut data)?;
    }
    let elapsed = start.elapsed();

    Ok(BenchmarkReport {
        workload: "quicksort",
        mode: if cli.serial { "serial" } else { "parallel" },
        threads: resolved_thread_count(cli.threads),
        elapsed,
    })
}

fn run_mandelbrot(cli: &Cli) -> Result<BenchmarkReport, Error> {
    let (width, height) = (mandelbrot::WIDTH, mandelbrot::HEIGHT);

    let start = Instant::now();
    let image = if cli.serial {
        mandelbrot::render_serial(width, height)
    } else {
        // The recursive tile split keeps the spawn tree shallow; a full deque
        // falls back to running inline, so a generous-but-small bound is all
        // that's needed (not width*height, which would allocate gigabytes).
        mandelbrot::render(cli.threads.unwrap_or(0), 1024, width, height)?
    };
    let elapsed = start.elapsed();

    if let Err(e) = bmp::write_bmp(&cli.output, width as u32, height as u32, &image.to_vec()) {
        log::error!("failed to write {}: {e}", cli.output.display());
    } else {
        log::info!("wrote {}", cli.output.display());
    }

    Ok(BenchmarkReport {
        workload: "mandelbrot",
        mode: if cli.serial { "serial" } else { "parallel" },
        threads: resolved_thread_count(cli.threads),
        elapsed,
    })
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if !cli.quicksort && !cli.mandelbrot {
        eprintln!("Usage: forkjoin-bench -q|-m [-t threads] [-s]");
        std::process::exit(1);
    }
    if cli.threads.is_none() && !cli.serial {
        eprintln!("Usage: forkjoin-bench -q|-m [-t threads] [-s]");
        std::process::exit(1);
    }

    let result = if cli.quicksort {
        run_quicksort(&cli)
    } else {
        run_mandelbrot(&cli)
    };

    match result {
        Ok(report) => println!("{report}"),
        Err(e) => {
            eprintln!("forkjoin-bench: {e}");
            std::process::exit(1);
        }
    }
}
