//! Fixed-cadence sampling loop.

use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::output::format_tick_timestamp;
use crate::system::{CounterSnapshot, CounterSource};
use crate::writer::RowSender;

/// One row per second
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Turns successive counter samples into CSV rows
pub struct Sampler {
    source: Box<dyn CounterSource>,
    previous: Option<CounterSnapshot>,
}

impl Sampler {
    /// Take the baseline sample. If it fails, the first good tick becomes the
    /// baseline instead.
    pub fn new(mut source: Box<dyn CounterSource>) -> Self {
        let previous = match source.sample() {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "initial counter sample failed");
                None
            }
        };
        Self { source, previous }
    }

    /// Sample once and produce the row for this tick.
    ///
    /// Returns `None` when the sample failed (the previous snapshot is kept
    /// so the next row covers the gap) or when there is no baseline yet.
    pub fn tick<Tz: TimeZone>(&mut self, at: &DateTime<Tz>) -> Option<String>
    where
        Tz::Offset: Display,
    {
        let current = match self.source.sample() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "skipping tick, counter sample failed");
                return None;
            }
        };

        let row = self
            .previous
            .map(|prev| current.delta_since(&prev).to_csv_row(&format_tick_timestamp(at)));
        if row.is_none() {
            debug!("baseline sample taken, first row on next tick");
        }
        self.previous = Some(current);
        row
    }
}

/// Drive `sampler` every `period` until `cancel` fires, pushing rows onto
/// `queue`. Cancellation is only observed between ticks. The queue is
/// closed when this returns.
///
/// Returns the number of rows enqueued, or [`Error::QueueClosed`] if the
/// writer went away first.
pub async fn run_sampler(
    mut sampler: Sampler,
    queue: RowSender,
    period: Duration,
    cancel: CancellationToken,
) -> Result<u64> {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut rows = 0u64;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let Some(row) = sampler.tick(&Local::now()) else {
            continue;
        };

        // Once sampled, a row is always enqueued
        if queue.push(row).await.is_err() {
            warn!("row queue closed by writer, stopping sampler");
            return Err(Error::QueueClosed);
        }
        rows += 1;
    }

    info!(rows, "sampler stopped");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{row_queue, QUEUE_CAPACITY};
    use chrono::FixedOffset;
    use std::collections::VecDeque;

    /// Replays a fixed script of samples, then repeats the last good one
    struct Scripted {
        script: VecDeque<Result<CounterSnapshot>>,
        last: CounterSnapshot,
    }

    impl Scripted {
        fn boxed(script: Vec<Result<CounterSnapshot>>) -> Box<dyn CounterSource> {
            Box::new(Self {
                script: script.into(),
                last: CounterSnapshot::default(),
            })
        }
    }

    impl CounterSource for Scripted {
        fn sample(&mut self) -> Result<CounterSnapshot> {
            match self.script.pop_front() {
                Some(Ok(s)) => {
                    self.last = s;
                    Ok(s)
                }
                Some(Err(e)) => Err(e),
                None => Ok(self.last),
            }
        }
    }

    fn sent_recv(sent: u64, recv: u64) -> CounterSnapshot {
        CounterSnapshot {
            bytes_sent: sent,
            bytes_recv: recv,
            ..Default::default()
        }
    }

    fn utc() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn tick_emits_delta_row() {
        let mut sampler = Sampler::new(Scripted::boxed(vec![
            Ok(sent_recv(100, 50)),
            Ok(sent_recv(250, 80)),
        ]));
        let row = sampler.tick(&utc()).unwrap();
        assert_eq!(row, "20240301T12:00:00.000+0000,180,150,30,0,0,0,0,0,0,0,0,0\n");
    }

    #[test]
    fn failed_sample_skips_tick_and_keeps_baseline() {
        let mut sampler = Sampler::new(Scripted::boxed(vec![
            Ok(sent_recv(100, 0)),
            Err(Error::NoInterfaces),
            Ok(sent_recv(300, 0)),
        ]));
        assert!(sampler.tick(&utc()).is_none());
        let row = sampler.tick(&utc()).unwrap();
        assert!(row.contains(",200,200,0,"), "row was {row}");
    }

    #[test]
    fn failed_baseline_defers_first_row() {
        let mut sampler = Sampler::new(Scripted::boxed(vec![
            Err(Error::NoInterfaces),
            Ok(sent_recv(10, 10)),
            Ok(sent_recv(15, 10)),
        ]));
        assert!(sampler.tick(&utc()).is_none());
        let row = sampler.tick(&utc()).unwrap();
        assert!(row.contains(",5,5,0,"), "row was {row}");
    }

    #[tokio::test(start_paused = true)]
    async fn loop_stops_on_cancel_and_closes_queue() {
        let sampler = Sampler::new(Scripted::boxed(vec![
            Ok(sent_recv(0, 0)),
            Ok(sent_recv(10, 0)),
            Ok(sent_recv(30, 0)),
        ]));
        let (tx, mut rx) = row_queue(QUEUE_CAPACITY);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_sampler(sampler, tx, SAMPLE_INTERVAL, cancel.clone()));

        let first = rx.pop().await.unwrap();
        let second = rx.pop().await.unwrap();
        assert!(first.contains(",10,10,0,"), "first row was {first}");
        assert!(second.contains(",20,20,0,"), "second row was {second}");

        cancel.cancel();
        let rows = handle.await.unwrap().unwrap();
        assert!(rows >= 2);
        while rx.pop().await.is_some() {}
    }

    /// Cancels the run from inside the second sample, after which the row
    /// for that tick still has to reach the queue
    struct CancelDuringSample {
        calls: u32,
        cancel: CancellationToken,
    }

    impl CounterSource for CancelDuringSample {
        fn sample(&mut self) -> Result<CounterSnapshot> {
            self.calls += 1;
            if self.calls == 2 {
                self.cancel.cancel();
            }
            Ok(sent_recv(u64::from(self.calls) * 100, 0))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn row_sampled_before_cancel_is_enqueued() {
        let cancel = CancellationToken::new();
        let sampler = Sampler::new(Box::new(CancelDuringSample {
            calls: 0,
            cancel: cancel.clone(),
        }));
        let (tx, mut rx) = row_queue(QUEUE_CAPACITY);

        let rows = run_sampler(sampler, tx, SAMPLE_INTERVAL, cancel).await.unwrap();
        assert_eq!(rows, 1);

        let row = rx.pop().await.unwrap();
        assert!(row.contains(",100,100,0,"), "row was {row}");
        assert!(rx.pop().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn loop_errors_when_writer_gone() {
        let sampler = Sampler::new(Scripted::boxed(vec![Ok(sent_recv(0, 0))]));
        let (tx, rx) = row_queue(1);
        drop(rx);
        let result = run_sampler(sampler, tx, SAMPLE_INTERVAL, CancellationToken::new()).await;
        assert!(matches!(result, Err(Error::QueueClosed)));
    }
}
