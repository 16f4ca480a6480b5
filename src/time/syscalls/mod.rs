use core::mem::MaybeUninit;
use core::ptr;

pub type Timespec = linux_raw_sys::general::__kernel_timespec;

/// `int clock_gettime(CLOCK_REALTIME, &ts);`
#[inline]
pub fn clock_gettime_realtime() -> Timespec {
	let mut ts = MaybeUninit::<Timespec>::uninit();
	unsafe {
		let res = syscalls::syscall!(
			syscalls::Sysno::clock_gettime,
			linux_raw_sys::general::CLOCK_REALTIME,
			ts.as_mut_ptr()
		);
		debug_assert_eq!(res, Ok(0));
		ts.assume_init()
	}
}

/// `int nanosleep(&req, NULL);`
///
/// May return early with `EINTR`.
#[inline]
pub fn nanosleep(req: &Timespec) -> Result<(), syscalls::Errno> {
	let res = unsafe {
		syscalls::syscall!(
			syscalls::Sysno::nanosleep,
			req as *const Timespec,
			ptr::null_mut::<Timespec>()
		)
	};
	res.map(|ret| {
		debug_assert_eq!(ret, 0);
	})
}
