//! Thread lifecycle: creation with a startup handshake, join, detach, exit,
//! and the small set of queries around the calling thread.

use alloc::vec;
use core::ffi::{c_int, c_void};
use core::mem::size_of;
use core::num::NonZero;
use core::time::Duration;

use crate::sys::{self, Tid};
use crate::time::{self, Timestamp};

mod at_exit;
mod binder;
mod error;
mod handle;

pub use at_exit::notify_all_at_thread_exit;
pub use binder::create;
pub use error::{ThreadError, ThreadResult};
use handle::encode_exit_code;
pub use handle::ThreadHandle;

/// Value a thread's entry function returns, and that [`ThreadHandle::join`] reports.
pub type ExitCode = c_int;

/// Kernel id of a thread. Stable for the lifetime of the thread and unique
/// among live threads of the process.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ThreadId(Tid);

impl ThreadId {
	pub(crate) const fn from_raw(tid: Tid) -> Self {
		Self(tid)
	}

	pub const fn as_raw(self) -> c_int {
		self.0
	}
}

/// Non-owning descriptor of a thread. Unlike [`ThreadHandle`], it cannot be
/// joined or detached.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Thread {
	id: ThreadId,
}

impl Thread {
	pub(crate) const fn from_id(id: ThreadId) -> Self {
		Self { id }
	}

	pub fn id(&self) -> ThreadId {
		self.id
	}
}

pub fn current_id() -> ThreadId {
	ThreadId(sys::gettid())
}

pub fn current() -> Thread {
	Thread::from_id(current_id())
}

#[inline]
pub fn equal(a: ThreadId, b: ThreadId) -> bool {
	a == b
}

/// Terminates the calling thread with `code`, after waking everything
/// registered through [`notify_all_at_thread_exit`].
///
/// # Safety
/// No destructors run for the frames of the calling thread. Every frame
/// between this call and the thread's entry point must be free of values that
/// need dropping. Calling this on the main thread leaves the process running
/// until all other threads have exited.
pub unsafe fn exit(code: ExitCode) -> ! {
	extern "C-unwind" {
		// `libc` declares this `extern "C"`, which does not admit the forced
		// unwind it performs.
		fn pthread_exit(value: *mut c_void) -> !;
	}

	at_exit::leave(current_id());
	unsafe { pthread_exit(encode_exit_code(code)) }
}

/// Suspends the calling thread until at least `until`.
///
/// The kernel may wake the thread early (signals, clock adjustments), so the
/// remaining time is recomputed after every wakeup.
pub fn sleep(until: Timestamp) {
	let mut now = Timestamp::now();
	while now < until {
		let res = time::nanosleep(&time::to_timespec(until.saturating_duration_since(now)));
		debug_assert!(matches!(res, Ok(()) | Err(syscalls::Errno::EINTR)));
		now = Timestamp::now();
	}
}

pub fn sleep_for(duration: Duration) {
	sleep(Timestamp::now().checked_add(duration).unwrap_or(Timestamp::MAX));
}

/// Offers the rest of the current time slice to another runnable thread.
pub fn yield_now() {
	sys::sched_yield();
}

/// Number of logical processors this process may run on. Always at least one.
pub fn hardware_concurrency() -> NonZero<usize> {
	NonZero::new(count_cpus(sys::sched_getaffinity)).unwrap_or(NonZero::<usize>::MIN)
}

/// Mask words to start with: 1024 processors.
const INITIAL_MASK_WORDS: usize = 1024 / usize::BITS as usize;
/// Largest mask tried: 1 << 22 processors.
const MAX_MASK_WORDS: usize = (1 << 22) / usize::BITS as usize;

/// Counts the processors in the affinity mask reported by `query`. The kernel
/// rejects masks smaller than its own with `EINVAL`, in which case the mask is
/// doubled and the query repeated.
fn count_cpus(mut query: impl FnMut(&mut [usize]) -> Result<usize, syscalls::Errno>) -> usize {
	let mut mask = vec![0usize; INITIAL_MASK_WORDS];
	loop {
		match query(&mut mask) {
			Ok(len) => {
				let words = len.div_ceil(size_of::<usize>()).min(mask.len());
				return mask[..words].iter().map(|word| word.count_ones() as usize).sum();
			}
			Err(syscalls::Errno::EINVAL) if mask.len() < MAX_MASK_WORDS => {
				mask = vec![0usize; mask.len() * 2];
			}
			Err(_) => return 0,
		}
	}
}
