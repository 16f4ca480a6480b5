use core::mem::size_of_val;

#[inline]
pub fn sched_yield() {
	let res = unsafe { syscalls::syscall!(syscalls::Sysno::sched_yield) };
	debug_assert_eq!(res, Ok(0));
}

/// `int sched_getaffinity(0, sizeof(mask), mask);`
///
/// Returns the number of bytes of `mask` the kernel filled in. Fails with
/// `EINVAL` if `mask` is smaller than the kernel's own affinity mask.
#[inline]
pub fn sched_getaffinity(mask: &mut [usize]) -> Result<usize, syscalls::Errno> {
	let len = size_of_val(mask);
	let res = unsafe { syscalls::syscall!(syscalls::Sysno::sched_getaffinity, 0, len, mask.as_mut_ptr()) };
	res.map(|written| {
		debug_assert!(written <= len);
		written
	})
}
