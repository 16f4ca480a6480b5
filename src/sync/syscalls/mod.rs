mod futex;
pub use self::futex::{futex_wait, futex_wake, FutexFlags};
