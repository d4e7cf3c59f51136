//! Periodic tick driver. Sleeps for the configured period, then feeds the
//! strand the wall-clock time actually elapsed, so positions reflect real
//! time even when the scheduler lags behind the nominal period.

use std::time::Duration;

use log::error;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

use crate::app::{Strand, StrandClosed};

pub struct Ticker {
    strand: Strand,
    period: Duration,
}

impl Ticker {
    pub fn new(strand: Strand, period: Duration) -> Self {
        Self { strand, period }
    }

    /// Arms the timer loop. A failing tick is logged and the timer re-arms;
    /// the loop only ends when the strand's mailbox is gone, which is the
    /// shutdown signal.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut last_tick = Instant::now();
            loop {
                sleep(self.period).await;
                let now = Instant::now();
                let delta = now - last_tick;
                last_tick = now;
                match self.strand.tick(delta).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => error!("tick handler failed: exception={e}"),
                    Err(StrandClosed) => break,
                }
            }
        })
    }
}
