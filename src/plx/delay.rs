use std::thread;
use std::time::{
	Duration,
	Instant,
};

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// How the protocol engine waits between busy polls
pub trait Delay {
	fn sleep(&mut self, duration: Duration);
}

impl<'a, D: ?Sized + Delay> Delay for &'a mut D {
	fn sleep(&mut self, duration: Duration) {
		D::sleep(*self, duration)
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
	fn sleep(&mut self, duration: Duration) {
		reliable_sleep(duration);
	}
}

// records the requested sleeps instead of sleeping
#[cfg(test)]
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct CountingDelay {
	pub sleeps: usize,
	pub total: Duration,
}

#[cfg(test)]
impl Delay for CountingDelay {
	fn sleep(&mut self, duration: Duration) {
		self.sleeps += 1;
		self.total += duration;
	}
}
