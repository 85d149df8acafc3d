//! Benchmark: tiled SYMV / SYR, sequential vs parallel dispatch, single and batched.

use std::time::Instant;

use symblas_kernels::{symv, symv_strided_batched, syr, Fill, Handle};

fn handle(parallel: bool) -> Handle {
    let mut handle = Handle::new();
    handle.set_parallel_threshold(if parallel { 0 } else { usize::MAX });
    handle
}

fn bench_symv(handle: &Handle, n: usize, a: &[f32], x: &[f32], y: &mut [f32], iters: usize) -> f64 {
    let start = Instant::now();
    for _ in 0..iters {
        symv(handle, Fill::Lower, n as i64, &1.0, a, n as i64, x, 1, &0.5, y, 1).unwrap();
    }
    start.elapsed().as_secs_f64() / iters as f64
}

fn bench_symv_batched(
    handle: &Handle,
    n: usize,
    batch: usize,
    a: &[f32],
    x: &[f32],
    y: &mut [f32],
    iters: usize,
) -> f64 {
    let start = Instant::now();
    for _ in 0..iters {
        symv_strided_batched(
            handle,
            Fill::Upper,
            n as i64,
            &1.0,
            a,
            n as i64,
            (n * n) as i64,
            x,
            1,
            n as i64,
            &0.5,
            y,
            1,
            n as i64,
            batch as i64,
        )
        .unwrap();
    }
    start.elapsed().as_secs_f64() / iters as f64
}

fn bench_syr(handle: &Handle, n: usize, x: &[f32], a: &mut [f32], iters: usize) -> f64 {
    let start = Instant::now();
    for _ in 0..iters {
        syr(handle, Fill::Lower, n as i64, &1e-6, x, 1, a, n as i64).unwrap();
    }
    start.elapsed().as_secs_f64() / iters as f64
}

/// 2 n^2 flops per SYMV.
fn gflops(n: usize, batch: usize, secs: f64) -> f64 {
    (2.0 * n as f64 * n as f64 * batch as f64) / secs / 1e9
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let seq = handle(false);
    let par = handle(true);
    println!("=== symblas SYMV / SYR Benchmark ===");
    println!("Threads: {}\n", par.num_threads());

    let sizes: &[usize] = &[64, 128, 256, 512, 1024, 2048];

    println!(
        "{:<8} {:>12} {:>12} {:>10} {:>10} {:>12} {:>12}",
        "n", "SYMV seq", "SYMV par", "Speedup", "GF/s", "SYR seq", "SYR par"
    );
    println!("{}", "-".repeat(84));

    for &n in sizes {
        let a: Vec<f32> = (0..n * n).map(|i| ((i * 7 + 3) % 13) as f32 * 0.1 - 0.6).collect();
        let x: Vec<f32> = (0..n).map(|i| ((i * 11 + 5) % 17) as f32 * 0.1 - 0.8).collect();
        let mut y = vec![0.0f32; n];
        let mut a_syr = a.clone();

        let iters = if n <= 128 { 1000 } else if n <= 512 { 100 } else { 10 };

        let symv_seq = bench_symv(&seq, n, &a, &x, &mut y, iters);
        let symv_par = bench_symv(&par, n, &a, &x, &mut y, iters);
        let syr_seq = bench_syr(&seq, n, &x, &mut a_syr, iters);
        let syr_par = bench_syr(&par, n, &x, &mut a_syr, iters);

        println!(
            "{:<8} {:>10.3}ms {:>10.3}ms {:>9.1}x {:>10.2} {:>10.3}ms {:>10.3}ms",
            n,
            symv_seq * 1000.0,
            symv_par * 1000.0,
            symv_seq / symv_par,
            gflops(n, 1, symv_par),
            syr_seq * 1000.0,
            syr_par * 1000.0,
        );
    }

    println!("\n=== Strided batched SYMV ===");
    println!("{:<8} {:>8} {:>12} {:>12} {:>10}", "n", "batch", "seq", "par", "GF/s");
    println!("{}", "-".repeat(54));

    for &(n, batch) in &[(32usize, 256usize), (64, 128), (128, 64), (256, 16)] {
        let a: Vec<f32> = (0..n * n * batch).map(|i| ((i * 5 + 1) % 11) as f32 * 0.1 - 0.5).collect();
        let x: Vec<f32> = (0..n * batch).map(|i| ((i * 3 + 2) % 7) as f32 * 0.1 - 0.3).collect();
        let mut y = vec![0.0f32; n * batch];
        let iters = 20;

        let t_seq = bench_symv_batched(&seq, n, batch, &a, &x, &mut y, iters);
        let t_par = bench_symv_batched(&par, n, batch, &a, &x, &mut y, iters);

        println!(
            "{:<8} {:>8} {:>10.3}ms {:>10.3}ms {:>10.2}",
            n,
            batch,
            t_seq * 1000.0,
            t_par * 1000.0,
            gflops(n, batch, t_par),
        );
    }
}
