use core::sync::atomic::{AtomicU32, Ordering};

use super::futex::FutexGuard;
use super::syscalls::{futex_wait, futex_wake, FutexFlags};

/// Condition variable for use with [`Futex`](super::Futex).
///
/// Every notification bumps a sequence counter. A waiter samples the counter
/// while still holding the lock and only sleeps if it is unchanged after the
/// lock is released, so a notification sent after the sample can never be
/// lost. Wakeups may be spurious; callers re-check their predicate.
#[derive(Debug)]
pub struct Condvar {
	seq: AtomicU32,
}

impl Condvar {
	pub const fn new() -> Self {
		Self {
			seq: AtomicU32::new(0),
		}
	}

	/// Atomically releases the lock held by `guard`, sleeps until notified and
	/// reacquires the lock before returning.
	pub fn wait<T: ?Sized>(&self, guard: &mut FutexGuard<'_, T>) {
		let seq = self.seq.load(Ordering::Relaxed);
		FutexGuard::unlocked(guard, || {
			let res = unsafe { futex_wait(&self.seq, FutexFlags::PRIVATE, seq, None) };
			debug_assert!(matches!(
				res,
				Ok(()) | Err(syscalls::Errno::EAGAIN) | Err(syscalls::Errno::EINTR)
			));
		});
	}

	/// Waits until `condition` returns `false`.
	pub fn wait_while<T: ?Sized>(&self, guard: &mut FutexGuard<'_, T>, mut condition: impl FnMut(&mut T) -> bool) {
		while condition(&mut **guard) {
			self.wait(guard);
		}
	}

	pub fn notify_one(&self) {
		self.seq.fetch_add(1, Ordering::Relaxed);
		let res = unsafe { futex_wake(&self.seq, FutexFlags::PRIVATE, 1) };
		debug_assert!(matches!(res, Ok(0 | 1)));
	}

	pub fn notify_all(&self) {
		self.seq.fetch_add(1, Ordering::Relaxed);
		let res = unsafe { futex_wake(&self.seq, FutexFlags::PRIVATE, i32::MAX as u32) };
		debug_assert!(res.is_ok());
	}
}

impl Default for Condvar {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use super::super::Futex;
	use super::*;

	#[test]
	fn notify_one_wakes_waiter() {
		let pair = Arc::new((Futex::new(false), Condvar::new()));
		let waiter = {
			let pair = pair.clone();
			std::thread::spawn(move || {
				let (flag, cond) = &*pair;
				let mut guard = flag.lock();
				cond.wait_while(&mut guard, |ready| !*ready);
				assert!(*guard);
			})
		};

		{
			let (flag, cond) = &*pair;
			*flag.lock() = true;
			cond.notify_one();
		}
		waiter.join().unwrap();
	}

	#[test]
	fn notify_all_wakes_every_waiter() {
		const WAITERS: usize = 6;

		let state = Arc::new((Futex::new((false, 0usize)), Condvar::new()));
		let waiters: Vec<_> = (0..WAITERS)
			.map(|_| {
				let state = state.clone();
				std::thread::spawn(move || {
					let (lock, cond) = &*state;
					let mut guard = lock.lock();
					cond.wait_while(&mut guard, |(go, _)| !*go);
					guard.1 += 1;
				})
			})
			.collect();

		{
			let (lock, cond) = &*state;
			lock.lock().0 = true;
			cond.notify_all();
		}
		for waiter in waiters {
			waiter.join().unwrap();
		}
		assert_eq!(state.0.lock().1, WAITERS);
	}
}
