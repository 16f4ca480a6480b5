use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use thrd::thread;

static WORK: AtomicU64 = AtomicU64::new(0);

fn worker(rounds: u64) -> u64 {
	let mut acc = 1u64;
	for i in 0..rounds {
		acc = black_box(acc.wrapping_mul(31).wrapping_add(i));
	}
	WORK.fetch_add(1, Ordering::Relaxed);
	acc
}

fn run_thrd(nthreads: usize, niterations: usize, rounds: u64) {
	let sink = Arc::new(AtomicU64::new(0));
	for _ in 0..niterations {
		let handles: Vec<_> = (0..nthreads)
			.map(|_| {
				thread::create(
					move |sink: Arc<AtomicU64>| {
						sink.fetch_xor(worker(rounds), Ordering::Relaxed);
						0
					},
					sink.clone(),
				)
				.expect("thread creation failed")
			})
			.collect();
		for handle in handles {
			handle.join().expect("join failed");
		}
	}
	black_box(sink.load(Ordering::Relaxed));
}

fn run_std(nthreads: usize, niterations: usize, rounds: u64) {
	let sink = Arc::new(AtomicU64::new(0));
	for _ in 0..niterations {
		let handles: Vec<_> = (0..nthreads)
			.map(|_| {
				let sink = sink.clone();
				std::thread::spawn(move || {
					sink.fetch_xor(worker(rounds), Ordering::Relaxed);
				})
			})
			.collect();
		for handle in handles {
			handle.join().expect("join failed");
		}
	}
	black_box(sink.load(Ordering::Relaxed));
}

fn main() {
	let mut argv = std::env::args().skip(1);
	let backend = argv.next().unwrap_or_else(|| "thrd".into());
	let nthreads = argv.next().and_then(|arg| arg.parse().ok()).unwrap_or(thread::hardware_concurrency().get());
	let niterations = argv.next().and_then(|arg| arg.parse().ok()).unwrap_or(1000);
	let rounds = argv.next().and_then(|arg| arg.parse().ok()).unwrap_or(0);

	let start = Instant::now();
	match backend.as_str() {
		"thrd" => run_thrd(nthreads, niterations, rounds),
		"std" => run_std(nthreads, niterations, rounds),
		other => {
			eprintln!("unknown backend {other:?}, expected `thrd` or `std`");
			std::process::exit(2);
		}
	}
	let elapsed = start.elapsed();

	println!(
		"{backend}: {} threads in {:.3}s ({:.1} us per create+join)",
		WORK.load(Ordering::Relaxed),
		elapsed.as_secs_f64(),
		elapsed.as_secs_f64() * 1e6 / (nthreads * niterations).max(1) as f64
	);
}
