//! Browser timer for bounding role lookups.

#![cfg(feature = "hydrate")]

use std::time::Duration;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use session::Sleeper;

pub struct GlooSleeper;

impl Sleeper for GlooSleeper {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        gloo_timers::future::sleep(duration).boxed_local()
    }
}
