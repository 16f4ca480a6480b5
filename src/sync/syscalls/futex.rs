use core::ffi::c_uint;
use core::ptr;
use core::sync::atomic::AtomicU32;

pub type Timespec = linux_raw_sys::general::__kernel_timespec;

bitflags::bitflags! {
		#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
		pub struct FutexFlags: u32 {
				const PRIVATE = linux_raw_sys::general::FUTEX_PRIVATE_FLAG;
		}
}

#[inline]
unsafe fn futex<const OP: c_uint>(
	uaddr: *const AtomicU32,
	flags: FutexFlags,
	val: u32,
	timeout: Option<&Timespec>,
) -> Result<usize, syscalls::Errno> {
	debug_assert!(FutexFlags::all().contains(flags));

	syscalls::syscall!(
		syscalls::Sysno::futex,
		uaddr,
		OP | flags.bits(),
		val,
		timeout.map(|timeout| timeout as *const Timespec).unwrap_or(ptr::null()),
		ptr::null::<AtomicU32>(),
		0
	)
}

/// Equivalent to `syscall(SYS_futex, uaddr, FUTEX_WAIT, val, timeout, NULL, 0)`
///
/// Fails with `EAGAIN` if `*uaddr != val` at the time of the call.
#[inline]
pub unsafe fn futex_wait(
	uaddr: &AtomicU32,
	flags: FutexFlags,
	val: u32,
	timeout: Option<&Timespec>,
) -> Result<(), syscalls::Errno> {
	futex::<{ linux_raw_sys::general::FUTEX_WAIT }>(uaddr, flags, val, timeout).map(|ret| {
		debug_assert_eq!(ret, 0);
	})
}

/// Equivalent to `syscall(SYS_futex, uaddr, FUTEX_WAKE, val, NULL, NULL, 0)`
///
/// Returns the number of woken waiters.
#[inline]
pub unsafe fn futex_wake(uaddr: &AtomicU32, flags: FutexFlags, val: u32) -> Result<usize, syscalls::Errno> {
	futex::<{ linux_raw_sys::general::FUTEX_WAKE }>(uaddr, flags, val, None)
}

#[cfg(test)]
mod test {
	use core::sync::atomic::Ordering;

	use super::*;

	#[test]
	fn wait_on_changed_value_returns_eagain() {
		let word = AtomicU32::new(7);
		let res = unsafe { futex_wait(&word, FutexFlags::PRIVATE, 8, None) };
		assert_eq!(res, Err(syscalls::Errno::EAGAIN));
	}

	#[test]
	fn wait_times_out() {
		let word = AtomicU32::new(0);
		let timeout = Timespec {
			tv_sec: 0,
			tv_nsec: 1_000_000,
		};
		let res = unsafe { futex_wait(&word, FutexFlags::PRIVATE, 0, Some(&timeout)) };
		assert_eq!(res, Err(syscalls::Errno::ETIMEDOUT));
		assert_eq!(word.load(Ordering::Relaxed), 0);
	}

	#[test]
	fn wake_without_waiters() {
		let word = AtomicU32::new(0);
		assert_eq!(unsafe { futex_wake(&word, FutexFlags::PRIVATE, i32::MAX as u32) }, Ok(0));
	}
}
