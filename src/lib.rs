#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "tls", feature(thread_local))]

extern crate alloc;

mod sys;

pub mod sync;
pub mod thread;
pub mod time;

pub use thread::{create, ExitCode, ThreadError, ThreadHandle, ThreadId};
pub use time::Timestamp;
