//! Waiters woken when a particular thread finishes.
//!
//! Only threads started through [`create`](super::create) have an entry here.
//! The trampoline adds it during the startup handshake and the thread itself
//! removes it once its entry function has returned (or it calls
//! [`exit`](super::exit)), which is before its kernel id can be reused.

use alloc::vec::Vec;

use super::{current_id, ThreadId};
use crate::sync::{Condvar, Futex};

struct Waiter {
	cond: &'static Condvar,
	flag: &'static Futex<bool>,
}

struct Live {
	thread: ThreadId,
	waiters: Vec<Waiter>,
}

static LIVE: Futex<Vec<Live>> = Futex::new(Vec::new());

/// Arranges for `flag` to be set and `cond` to be notified once the calling
/// thread finishes.
///
/// The notification happens after the thread's entry function returned, so
/// anything it wrote before returning is visible to a waiter that observes
/// `*flag == true` under the lock.
///
/// Returns `false` and registers nothing if the calling thread was not
/// started by [`create`](super::create), as nothing would ever wake the waiter.
#[must_use]
pub fn notify_all_at_thread_exit(cond: &'static Condvar, flag: &'static Futex<bool>) -> bool {
	let thread = current_id();
	match LIVE.lock().iter_mut().find(|live| live.thread == thread) {
		Some(live) => {
			live.waiters.push(Waiter { cond, flag });
			true
		}
		None => false,
	}
}

pub(super) fn enter(thread: ThreadId) {
	let mut live = LIVE.lock();
	debug_assert!(live.iter().all(|live| live.thread != thread));
	live.push(Live {
		thread,
		waiters: Vec::new(),
	});
}

pub(super) fn leave(thread: ThreadId) {
	let waiters = {
		let mut live = LIVE.lock();
		match live.iter().position(|live| live.thread == thread) {
			Some(i) => live.swap_remove(i).waiters,
			None => return,
		}
	};

	for waiter in waiters {
		*waiter.flag.lock() = true;
		waiter.cond.notify_all();
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn is_live(thread: ThreadId) -> bool {
		LIVE.lock().iter().any(|live| live.thread == thread)
	}

	#[test]
	fn foreign_thread_cannot_register() {
		static COND: Condvar = Condvar::new();
		static DONE: Futex<bool> = Futex::new(false);

		let registered = std::thread::spawn(|| notify_all_at_thread_exit(&COND, &DONE))
			.join()
			.unwrap();
		assert!(!registered);
		assert!(!notify_all_at_thread_exit(&COND, &DONE));
		assert!(!*DONE.lock());
	}

	#[test]
	fn leave_only_wakes_own_entries() {
		static COND: Condvar = Condvar::new();
		static MINE: Futex<bool> = Futex::new(false);
		static OTHER: Futex<bool> = Futex::new(false);

		let me = current_id();
		let other = ThreadId::from_raw(-1);
		enter(me);
		enter(other);
		assert!(notify_all_at_thread_exit(&COND, &MINE));
		LIVE.lock()
			.iter_mut()
			.find(|live| live.thread == other)
			.unwrap()
			.waiters
			.push(Waiter { cond: &COND, flag: &OTHER });

		leave(me);
		assert!(*MINE.lock());
		assert!(!*OTHER.lock());
		assert!(!is_live(me));
		assert!(!notify_all_at_thread_exit(&COND, &MINE));

		leave(other);
		assert!(*OTHER.lock());
		assert!(!is_live(other));

		// leaving twice is harmless
		leave(other);
	}
}
