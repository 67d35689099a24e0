//! Rolling window hit/miss counting

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

const BUCKETS: u32 = 60;

#[derive(Debug)]
struct Bucket {
    start: Instant,
    hits: u64,
    misses: u64,
}

/// Hit/miss counts over the trailing window, kept in fixed-width buckets so
/// observations age out gradually instead of all at once.
pub struct RollingWindow {
    buckets: Mutex<VecDeque<Bucket>>,
    window_duration: Duration,
    bucket_width: Duration,
}

impl RollingWindow {
    pub fn new(duration: Duration) -> Self {
        Self {
            buckets: Mutex::new(VecDeque::with_capacity(BUCKETS as usize + 1)),
            window_duration: duration,
            bucket_width: (duration / BUCKETS).max(Duration::from_millis(1)),
        }
    }

    pub fn record(&self, hit: bool) {
        let now = Instant::now();
        let mut buckets = self.buckets.lock();
        self.evict(&mut buckets, now);

        let needs_bucket = buckets
            .back()
            .map_or(true, |b| now.duration_since(b.start) >= self.bucket_width);
        if needs_bucket {
            buckets.push_back(Bucket {
                start: now,
                hits: 0,
                misses: 0,
            });
        }

        if let Some(current) = buckets.back_mut() {
            if hit {
                current.hits += 1;
            } else {
                current.misses += 1;
            }
        }
    }

    /// `None` when the trailing window holds no observations
    pub fn hit_rate(&self) -> Option<f64> {
        let mut buckets = self.buckets.lock();
        self.evict(&mut buckets, Instant::now());

        let (hits, misses) = buckets
            .iter()
            .fold((0u64, 0u64), |(h, m), b| (h + b.hits, m + b.misses));
        let total = hits + misses;
        if total == 0 {
            None
        } else {
            Some(hits as f64 / total as f64)
        }
    }

    fn evict(&self, buckets: &mut VecDeque<Bucket>, now: Instant) {
        while buckets
            .front()
            .is_some_and(|b| now.duration_since(b.start) >= self.window_duration)
        {
            buckets.pop_front();
        }
    }
}
