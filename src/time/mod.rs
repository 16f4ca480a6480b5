//! Wall-clock time points used as absolute sleep targets.

use core::time::Duration;

mod syscalls;
pub(crate) use self::syscalls::{nanosleep, Timespec};

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// An absolute point in time, measured against `CLOCK_REALTIME`.
///
/// Ordering compares seconds first and nanoseconds second.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timestamp {
	secs: i64,
	nanos: u32,
}

impl Timestamp {
	pub const UNIX_EPOCH: Timestamp = Timestamp { secs: 0, nanos: 0 };
	pub const MAX: Timestamp = Timestamp {
		secs: i64::MAX,
		nanos: NANOS_PER_SEC - 1,
	};

	pub fn now() -> Self {
		let ts = self::syscalls::clock_gettime_realtime();
		debug_assert!((0..NANOS_PER_SEC as i64).contains(&(ts.tv_nsec as i64)));
		Self {
			secs: ts.tv_sec as i64,
			nanos: ts.tv_nsec as u32,
		}
	}

	/// Returns `None` if `nanos` is not below one second.
	pub const fn from_unix(secs: i64, nanos: u32) -> Option<Self> {
		if nanos < NANOS_PER_SEC {
			Some(Self { secs, nanos })
		} else {
			None
		}
	}

	/// Seconds and nanoseconds since the unix epoch.
	pub const fn as_unix(&self) -> (i64, u32) {
		(self.secs, self.nanos)
	}

	pub fn checked_add(self, duration: Duration) -> Option<Self> {
		let mut secs = self.secs.checked_add(i64::try_from(duration.as_secs()).ok()?)?;
		let mut nanos = self.nanos + duration.subsec_nanos();
		if nanos >= NANOS_PER_SEC {
			nanos -= NANOS_PER_SEC;
			secs = secs.checked_add(1)?;
		}
		Some(Self { secs, nanos })
	}

	/// Time elapsed from `earlier` to `self`, or zero if `earlier` is not before `self`.
	pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
		if self <= earlier {
			return Duration::ZERO;
		}

		let secs = self.secs.abs_diff(earlier.secs);
		if self.nanos >= earlier.nanos {
			Duration::new(secs, self.nanos - earlier.nanos)
		} else {
			Duration::new(secs - 1, self.nanos + NANOS_PER_SEC - earlier.nanos)
		}
	}
}

pub(crate) fn to_timespec(duration: Duration) -> Timespec {
	Timespec {
		tv_sec: i64::try_from(duration.as_secs()).unwrap_or(i64::MAX) as _,
		tv_nsec: duration.subsec_nanos() as _,
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn now_is_after_epoch_and_monotone_enough() {
		let a = Timestamp::now();
		assert!(a > Timestamp::UNIX_EPOCH);
		let b = Timestamp::now();
		assert!(b.as_unix().0 >= a.as_unix().0 - 1);
	}

	#[test]
	fn rejects_overlong_nanos() {
		assert_eq!(Timestamp::from_unix(1, NANOS_PER_SEC), None);
		assert_eq!(Timestamp::from_unix(1, NANOS_PER_SEC - 1).unwrap().as_unix(), (1, NANOS_PER_SEC - 1));
	}

	#[test]
	fn add_carries_into_seconds() {
		let t = Timestamp::from_unix(10, 900_000_000).unwrap();
		let later = t.checked_add(Duration::from_millis(250)).unwrap();
		assert_eq!(later.as_unix(), (11, 150_000_000));
		assert!(later > t);
		assert_eq!(Timestamp::from_unix(i64::MAX, 0).unwrap().checked_add(Duration::from_secs(1)), None);
	}

	#[test]
	fn duration_since_borrows_and_saturates() {
		let a = Timestamp::from_unix(10, 900_000_000).unwrap();
		let b = Timestamp::from_unix(12, 100_000_000).unwrap();
		assert_eq!(b.saturating_duration_since(a), Duration::from_millis(1200));
		assert_eq!(a.saturating_duration_since(b), Duration::ZERO);
		assert_eq!(a.saturating_duration_since(a), Duration::ZERO);
		assert_eq!(
			Timestamp::from_unix(-1, 0).unwrap().saturating_duration_since(Timestamp::from_unix(-3, 5).unwrap()),
			Duration::new(1, NANOS_PER_SEC - 5)
		);
	}

	#[test]
	fn timespec_conversion() {
		let ts = to_timespec(Duration::new(3, 42));
		assert_eq!(ts.tv_sec as i64, 3);
		assert_eq!(ts.tv_nsec as i64, 42);
	}
}
