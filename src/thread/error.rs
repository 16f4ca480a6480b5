use core::fmt;

use syscalls::Errno;

pub type ThreadResult<T> = Result<T, ThreadError>;

/// Failure of one of the thread lifecycle operations.
///
/// None of these are retried internally.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ThreadError {
	/// The OS refused to create the thread, typically due to resource exhaustion.
	CreationFailed(Errno),
	/// Waiting for the thread to terminate failed.
	WaitFailed(Errno),
	/// The thread terminated, but did not leave an exit code behind (e.g. it was cancelled).
	QueryFailed,
	/// The native handle could not be released.
	ReleaseFailed(Errno),
}

impl ThreadError {
	/// The OS error code behind this error, if there is one.
	pub fn errno(&self) -> Option<Errno> {
		match *self {
			ThreadError::CreationFailed(errno) | ThreadError::WaitFailed(errno) | ThreadError::ReleaseFailed(errno) => {
				Some(errno)
			}
			ThreadError::QueryFailed => None,
		}
	}
}

impl fmt::Display for ThreadError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ThreadError::CreationFailed(errno) => write!(f, "failed to create thread ({errno:?})"),
			ThreadError::WaitFailed(errno) => write!(f, "failed to wait for thread ({errno:?})"),
			ThreadError::QueryFailed => f.write_str("thread terminated without an exit code"),
			ThreadError::ReleaseFailed(errno) => write!(f, "failed to release thread handle ({errno:?})"),
		}
	}
}

impl core::error::Error for ThreadError {}
