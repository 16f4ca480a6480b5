use core::ffi::{c_int, c_void};
use core::mem::ManuallyDrop;
use core::ptr;

use static_assertions::const_assert;

use super::binder::NativeThread;
use super::{ExitCode, Thread, ThreadError, ThreadId, ThreadResult};

// Exit codes are carried in the pthread return value, zero-extended from 32
// bits. Anything wider, such as `PTHREAD_CANCELED`, is not an exit code.
const_assert!(usize::BITS > c_int::BITS);

pub(super) fn encode_exit_code(code: ExitCode) -> *mut c_void {
	code as u32 as usize as *mut c_void
}

fn decode_exit_code(value: *mut c_void) -> Option<ExitCode> {
	u32::try_from(value as usize).ok().map(|code| code as ExitCode)
}

/// Owning handle to a thread started by [`create`](super::create).
///
/// Exactly one of [`join`](Self::join), [`join_discarding`](Self::join_discarding)
/// and [`detach`](Self::detach) consumes the handle. Dropping the handle
/// detaches the thread.
#[derive(Debug)]
#[must_use = "dropping a thread handle detaches the thread"]
pub struct ThreadHandle {
	native: NativeThread,
	id: ThreadId,
}

impl ThreadHandle {
	pub(super) fn from_raw(native: NativeThread, id: ThreadId) -> Self {
		Self { native, id }
	}

	/// Id of the thread, as reported by [`current_id`](super::current_id) on that thread.
	pub fn id(&self) -> ThreadId {
		self.id
	}

	pub fn thread(&self) -> Thread {
		Thread::from_id(self.id)
	}

	/// Blocks until the thread terminates and returns its exit code.
	///
	/// Everything the thread did happens-before this returns. On error, the
	/// native handle is in an unspecified state and must not be used again.
	pub fn join(self) -> ThreadResult<ExitCode> {
		let native = self.into_native();
		let mut value = ptr::null_mut();
		match unsafe { libc::pthread_join(native, &mut value) } {
			0 => decode_exit_code(value).ok_or(ThreadError::QueryFailed),
			errno => Err(ThreadError::WaitFailed(syscalls::Errno::new(errno))),
		}
	}

	/// Like [`join`](Self::join), but does not retrieve the exit code.
	pub fn join_discarding(self) -> ThreadResult<()> {
		let native = self.into_native();
		match unsafe { libc::pthread_join(native, ptr::null_mut()) } {
			0 => Ok(()),
			errno => Err(ThreadError::WaitFailed(syscalls::Errno::new(errno))),
		}
	}

	/// Releases the handle; the OS reclaims the thread's resources once it terminates.
	pub fn detach(self) -> ThreadResult<()> {
		let native = self.into_native();
		match unsafe { libc::pthread_detach(native) } {
			0 => Ok(()),
			errno => Err(ThreadError::ReleaseFailed(syscalls::Errno::new(errno))),
		}
	}

	fn into_native(self) -> NativeThread {
		ManuallyDrop::new(self).native
	}
}

impl Drop for ThreadHandle {
	fn drop(&mut self) {
		let res = unsafe { libc::pthread_detach(self.native) };
		debug_assert_eq!(res, 0);
	}
}
