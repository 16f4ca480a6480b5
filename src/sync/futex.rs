use core::sync::atomic::{AtomicU32, Ordering};

use lock_api::{GuardSend, RawMutex};

use super::syscalls::{futex_wait, futex_wake, FutexFlags};

const UNLOCKED: u32 = 0;
const LOCKED: u32 = 1;
/// Locked, and at least one thread may be sleeping in the kernel.
const CONTENDED: u32 = 2;

#[derive(Debug)]
pub struct RawFutex {
	state: AtomicU32,
}

impl RawFutex {
	#[cold]
	fn lock_contended(&self) {
		while self.state.swap(CONTENDED, Ordering::Acquire) != UNLOCKED {
			let res = unsafe { futex_wait(&self.state, FutexFlags::PRIVATE, CONTENDED, None) };
			debug_assert!(matches!(
				res,
				Ok(()) | Err(syscalls::Errno::EAGAIN) | Err(syscalls::Errno::EINTR)
			));
		}
	}
}

unsafe impl RawMutex for RawFutex {
	#[allow(clippy::declare_interior_mutable_const)]
	const INIT: RawFutex = RawFutex {
		state: AtomicU32::new(UNLOCKED),
	};

	type GuardMarker = GuardSend;

	#[inline]
	fn lock(&self) {
		if !self.try_lock() {
			self.lock_contended();
		}
	}

	#[inline]
	fn try_lock(&self) -> bool {
		self
			.state
			.compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
			.is_ok()
	}

	#[inline]
	unsafe fn unlock(&self) {
		let previous = self.state.swap(UNLOCKED, Ordering::Release);
		debug_assert_ne!(previous, UNLOCKED);
		if previous == CONTENDED {
			let res = unsafe { futex_wake(&self.state, FutexFlags::PRIVATE, 1) };
			debug_assert!(matches!(res, Ok(0 | 1)));
		}
	}

	fn is_locked(&self) -> bool {
		self.state.load(Ordering::Acquire) != UNLOCKED
	}
}

/// Mutual exclusion lock that sleeps in the kernel while contended.
pub type Futex<T> = lock_api::Mutex<RawFutex, T>;
pub type FutexGuard<'a, T> = lock_api::MutexGuard<'a, RawFutex, T>;

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use super::*;

	#[test]
	fn lock_unlock() {
		let f = Futex::new(42);
		assert!(!f.is_locked());
		{
			let mut guard = f.lock();
			assert!(f.is_locked());
			assert_eq!(*guard, 42);
			*guard = 65535;
			assert_eq!(*guard, 65535);
		}
		assert!(!f.is_locked());
		{
			let guard = f.lock();
			assert!(f.is_locked());
			assert!(f.try_lock().is_none());
			assert_eq!(*guard, 65535);
		}
		assert!(!f.is_locked());
	}

	#[test]
	fn contended_increments() {
		const THREADS: usize = 8;
		const ROUNDS: usize = 10_000;

		let counter = Arc::new(Futex::new(0usize));
		let threads: Vec<_> = (0..THREADS)
			.map(|_| {
				let counter = counter.clone();
				std::thread::spawn(move || {
					for _ in 0..ROUNDS {
						*counter.lock() += 1;
					}
				})
			})
			.collect();

		for thread in threads {
			thread.join().unwrap();
		}
		assert_eq!(*counter.lock(), THREADS * ROUNDS);
		assert!(!counter.is_locked());
	}
}
