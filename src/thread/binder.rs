//! Thread creation and the startup handshake.
//!
//! The creator keeps a [`StartupBinder`] on its own stack and holds the
//! binder's lock while asking the OS for a new thread. The new thread takes
//! the entry function out of the binder, records its id and flips `started`
//! under that same lock, and only then runs the entry function. The creator
//! does not return (and so does not drop the binder) before it has observed
//! `started`.

use core::ffi::c_void;
use core::mem::{self, MaybeUninit};
use core::ptr;

use super::{at_exit, encode_exit_code, ExitCode, ThreadError, ThreadHandle, ThreadId, ThreadResult};
use crate::sync::{Condvar, Futex};
use crate::sys::{self, Tid};

pub(super) type NativeThread = libc::pthread_t;
/// Entry point handed to `pthread_create`. It must be allowed to unwind, since
/// [`exit`](super::exit) ends the thread with a forced unwind through it.
pub(super) type Trampoline = extern "C-unwind" fn(*mut c_void) -> *mut c_void;

struct Startup<T, F> {
	started: bool,
	id: Tid,
	entry: Option<(F, T)>,
}

pub(super) struct StartupBinder<T, F> {
	startup: Futex<Startup<T, F>>,
	cond: Condvar,
}

/// Starts `entry(arg)` on a new OS thread.
///
/// Returns only after the new thread has finished its startup bookkeeping, so
/// the returned handle's [`id`](ThreadHandle::id) is the id the new thread
/// sees from [`current_id`](super::current_id). Everything the caller did
/// before this call happens-before `entry` runs.
///
/// A panic escaping `entry` aborts the process: no frame above the trampoline
/// catches it, so the unwinder finds no handler and the panic runtime aborts
/// before any frame is unwound.
pub fn create<T, F>(entry: F, arg: T) -> ThreadResult<ThreadHandle>
where
	T: Send + 'static,
	F: FnOnce(T) -> ExitCode + Send + 'static,
{
	create_with(entry, arg, spawn_native)
}

pub(super) fn create_with<T, F, S>(entry: F, arg: T, spawn: S) -> ThreadResult<ThreadHandle>
where
	T: Send + 'static,
	F: FnOnce(T) -> ExitCode + Send + 'static,
	S: FnOnce(Trampoline, *mut c_void) -> Result<NativeThread, syscalls::Errno>,
{
	let binder = StartupBinder {
		startup: Futex::new(Startup {
			started: false,
			id: 0,
			entry: Some((entry, arg)),
		}),
		cond: Condvar::new(),
	};

	let mut startup = binder.startup.lock();
	let native = spawn(
		trampoline::<T, F>,
		ptr::from_ref(&binder).cast_mut().cast::<c_void>(),
	)
	.map_err(ThreadError::CreationFailed)?;

	binder.cond.wait_while(&mut startup, |startup| !startup.started);
	let id = ThreadId::from_raw(startup.id);
	drop(startup);

	Ok(ThreadHandle::from_raw(native, id))
}

fn spawn_native(start: Trampoline, binder: *mut c_void) -> Result<NativeThread, syscalls::Errno> {
	// SAFETY: "C-unwind" and "C" share the calling convention and only differ in
	// whether unwinding out of the callee is allowed. The only unwind leaving the
	// trampoline is the forced unwind of `pthread_exit`, which glibc's thread
	// start routine is built to receive.
	let start = unsafe { mem::transmute::<Trampoline, extern "C" fn(*mut c_void) -> *mut c_void>(start) };
	let mut native = MaybeUninit::<NativeThread>::uninit();
	match unsafe { libc::pthread_create(native.as_mut_ptr(), ptr::null(), start, binder) } {
		0 => Ok(unsafe { native.assume_init() }),
		errno => Err(syscalls::Errno::new(errno)),
	}
}

extern "C-unwind" fn trampoline<T, F>(binder: *mut c_void) -> *mut c_void
where
	T: Send + 'static,
	F: FnOnce(T) -> ExitCode + Send + 'static,
{
	let (id, entry) = {
		// The creator keeps the binder alive until it observes `started`, which
		// cannot happen before this guard is released.
		let binder = unsafe { &*binder.cast_const().cast::<StartupBinder<T, F>>() };
		let mut startup = binder.startup.lock();
		let entry = startup.entry.take();
		startup.id = sys::gettid();
		let id = ThreadId::from_raw(startup.id);
		at_exit::enter(id);
		startup.started = true;
		binder.cond.notify_one();
		(id, entry)
	};

	let Some((entry, arg)) = entry else {
		unreachable!("thread entry was taken twice");
	};
	let code = entry(arg);

	at_exit::leave(id);
	encode_exit_code(code)
}
