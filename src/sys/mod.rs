mod syscalls;

pub type Tid = core::ffi::c_int;

/// Kernel id of the calling thread.
#[cfg(not(feature = "tls"))]
#[inline]
pub fn gettid() -> Tid {
	self::syscalls::gettid()
}

/// Kernel id of the calling thread, cached after the first call.
#[cfg(feature = "tls")]
#[inline]
pub fn gettid() -> Tid {
	use core::cell::Cell;

	#[thread_local]
	static TID: Cell<Tid> = Cell::new(0);

	match TID.get() {
		0 => {
			let tid = self::syscalls::gettid();
			TID.set(tid);
			tid
		}
		tid => tid,
	}
}

pub use self::syscalls::{sched_getaffinity, sched_yield};

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn tid_is_stable_and_positive() {
		let tid = gettid();
		assert!(tid > 0);
		assert_eq!(tid, gettid());
	}

	#[test]
	fn tid_differs_between_threads() {
		let here = gettid();
		let there = std::thread::spawn(gettid).join().unwrap();
		assert_ne!(here, there);
	}
}
