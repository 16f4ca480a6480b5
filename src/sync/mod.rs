mod syscalls;

mod futex;
pub use futex::{Futex, FutexGuard, RawFutex};

mod condvar;
pub use condvar::Condvar;
