//! Full-update scheduling.
//!
//! Every companion runs its cheap bookkeeping each tick but only makes a full
//! decision when its countdown runs out. Owned companions stagger their
//! countdowns by the owner's companion count plus a jitter shared by all
//! companions of the same owner within one batch, so a large population
//! never lines up on the same tick.

use std::collections::HashMap;

use crate::config::SchedulerConfig;
use crate::env::RngOracle;
use crate::state::EntityId;

/// Per-tick scheduling context created by the host.
///
/// Holds the randomness source and the jitter drawn for each owner in this
/// batch. Drop it at the end of the tick.
pub struct SchedulingBatch<'r> {
    rng: &'r mut dyn RngOracle,
    jitter: HashMap<EntityId, u32>,
}

impl<'r> SchedulingBatch<'r> {
    pub fn new(rng: &'r mut dyn RngOracle) -> Self {
        Self {
            rng,
            jitter: HashMap::new(),
        }
    }

    /// Jitter in `[0, max]` for `owner`, drawn on first use within the batch.
    pub fn shared_jitter(&mut self, owner: EntityId, max: u32) -> u32 {
        let rng = &mut *self.rng;
        *self.jitter.entry(owner).or_insert_with(|| rng.range(0, max))
    }

    /// Number of owners that drew a jitter in this batch.
    pub fn owners_drawn(&self) -> usize {
        self.jitter.len()
    }

    pub(crate) fn rng(&mut self) -> &mut dyn RngOracle {
        &mut *self.rng
    }
}

/// Who the companion answers to, as far as scheduling cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Assignment {
    Autonomous {
        engaged: bool,
    },
    Owned {
        owner: EntityId,
        owner_in_world: bool,
        companion_count: usize,
        /// Owner is in a raid-sized group.
        mass_group: bool,
    },
}

/// Countdown until the next full update, plus the time that has passed
/// since the last one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateScheduler {
    wait_timer_ms: u32,
    pending_ms: u32,
}

impl UpdateScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wait_timer_ms(&self) -> u32 {
        self.wait_timer_ms
    }

    /// Time accumulated since the last full update.
    pub fn pending_ms(&self) -> u32 {
        self.pending_ms
    }

    /// Returns true if the full update should be skipped this tick.
    ///
    /// A deferred call only counts the countdown down. When the update runs,
    /// a new countdown is chosen for the following one.
    pub fn should_defer(
        &mut self,
        elapsed_ms: u32,
        assignment: &Assignment,
        batch: &mut SchedulingBatch<'_>,
        config: &SchedulerConfig,
    ) -> bool {
        self.pending_ms = self.pending_ms.saturating_add(elapsed_ms);

        let owner_away = matches!(
            assignment,
            Assignment::Owned {
                owner_in_world: false,
                ..
            }
        );
        if self.wait_timer_ms > elapsed_ms || owner_away {
            self.wait_timer_ms = self.wait_timer_ms.saturating_sub(elapsed_ms);
            return true;
        }

        self.wait_timer_ms = match *assignment {
            Assignment::Autonomous { engaged: true } => config.combat_delay_ms,
            Assignment::Autonomous { engaged: false } => batch
                .rng()
                .range(config.idle_delay_min_ms, config.idle_delay_max_ms),
            Assignment::Owned {
                owner,
                mass_group: true,
                ..
            } => batch.shared_jitter(owner, config.jitter_max),
            Assignment::Owned {
                owner,
                companion_count,
                ..
            } => {
                let jitter = batch.shared_jitter(owner, config.jitter_max);
                let extra = companion_count.saturating_sub(1) as u64;
                let delay = u64::from(config.per_companion_delay_ms) * extra + 2 * u64::from(jitter);
                delay.min(u64::from(config.owned_delay_cap_ms)) as u32
            }
        };
        false
    }

    /// Elapsed time since the last full update, including this tick. Resets it.
    pub fn take_window(&mut self) -> u32 {
        std::mem::take(&mut self.pending_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PcgRng;

    /// Counts how often the scheduler draws from the rng.
    struct CountingRng {
        inner: PcgRng,
        draws: usize,
    }

    impl RngOracle for CountingRng {
        fn next_u32(&mut self) -> u32 {
            self.draws += 1;
            self.inner.next_u32()
        }
    }

    fn owned(owner: u64, count: usize, mass_group: bool) -> Assignment {
        Assignment::Owned {
            owner: EntityId(owner),
            owner_in_world: true,
            companion_count: count,
            mass_group,
        }
    }

    #[test]
    fn deferred_ticks_count_down_and_never_draw() {
        let config = SchedulerConfig::default();
        let mut rng = CountingRng {
            inner: PcgRng::new(1),
            draws: 0,
        };
        let mut scheduler = UpdateScheduler::new();

        let mut batch = SchedulingBatch::new(&mut rng);
        assert!(!scheduler.should_defer(0, &owned(1, 10, false), &mut batch, &config));
        let wait = scheduler.wait_timer_ms();
        drop(batch);
        assert_eq!(rng.draws, 1);

        let mut batch = SchedulingBatch::new(&mut rng);
        assert!(scheduler.should_defer(wait - 1, &owned(1, 10, false), &mut batch, &config));
        drop(batch);
        assert_eq!(scheduler.wait_timer_ms(), 1);
        assert_eq!(rng.draws, 1);
    }

    #[test]
    fn absent_owner_defers_regardless_of_countdown() {
        let config = SchedulerConfig::default();
        let mut rng = PcgRng::new(2);
        let mut batch = SchedulingBatch::new(&mut rng);
        let mut scheduler = UpdateScheduler::new();
        let away = Assignment::Owned {
            owner: EntityId(1),
            owner_in_world: false,
            companion_count: 1,
            mass_group: false,
        };

        assert!(scheduler.should_defer(1000, &away, &mut batch, &config));
        assert_eq!(scheduler.wait_timer_ms(), 0);
        assert_eq!(batch.owners_drawn(), 0);
    }

    #[test]
    fn window_accumulates_across_deferrals() {
        let config = SchedulerConfig::default();
        let mut rng = PcgRng::new(3);
        let mut scheduler = UpdateScheduler::new();
        let engaged = Assignment::Autonomous { engaged: true };

        let mut batch = SchedulingBatch::new(&mut rng);
        assert!(!scheduler.should_defer(100, &engaged, &mut batch, &config));
        assert_eq!(scheduler.take_window(), 100);

        for _ in 0..4 {
            assert!(scheduler.should_defer(100, &engaged, &mut batch, &config));
        }
        assert!(!scheduler.should_defer(100, &engaged, &mut batch, &config));
        assert_eq!(scheduler.take_window(), 500);
    }

    #[test]
    fn jitter_is_shared_per_owner_within_a_batch() {
        let config = SchedulerConfig::default();
        let mut rng = CountingRng {
            inner: PcgRng::new(4),
            draws: 0,
        };
        let mut batch = SchedulingBatch::new(&mut rng);

        let mut waits = Vec::new();
        for _ in 0..5 {
            let mut scheduler = UpdateScheduler::new();
            assert!(!scheduler.should_defer(0, &owned(7, 1, true), &mut batch, &config));
            waits.push(scheduler.wait_timer_ms());
        }
        let mut other = UpdateScheduler::new();
        other.should_defer(0, &owned(8, 1, true), &mut batch, &config);

        assert!(waits.iter().all(|&w| w == waits[0]));
        assert_eq!(batch.owners_drawn(), 2);
        drop(batch);
        assert_eq!(rng.draws, 2);
    }

    #[test]
    fn autonomous_idle_histogram_covers_range() {
        let config = SchedulerConfig::default();
        let mut rng = PcgRng::new(5);
        let idle = Assignment::Autonomous { engaged: false };

        let mut buckets = [0usize; 5];
        for _ in 0..5000 {
            let mut batch = SchedulingBatch::new(&mut rng);
            let mut scheduler = UpdateScheduler::new();
            scheduler.should_defer(0, &idle, &mut batch, &config);
            let wait = scheduler.wait_timer_ms();
            assert!((750..=1250).contains(&wait), "wait {wait}");
            buckets[((wait - 750) / 101) as usize] += 1;
        }
        // roughly uniform: each fifth of the range gets a fair share
        assert!(buckets.iter().all(|&n| n > 700), "{buckets:?}");
    }

    #[test]
    fn owned_histogram_grows_with_companion_count() {
        let config = SchedulerConfig::default();
        let mut rng = PcgRng::new(6);

        let mut sample = |count: usize| -> Vec<u32> {
            (0..2000)
                .map(|_| {
                    let mut batch = SchedulingBatch::new(&mut rng);
                    let mut scheduler = UpdateScheduler::new();
                    scheduler.should_defer(0, &owned(1, count, false), &mut batch, &config);
                    scheduler.wait_timer_ms()
                })
                .collect()
        };

        let single = sample(1);
        assert!(single.iter().all(|&w| w <= 200 && w % 2 == 0));
        assert!(single.iter().any(|&w| w < 50));
        assert!(single.iter().any(|&w| w > 150));

        let crowded = sample(10);
        assert!(crowded.iter().all(|&w| (450..=500).contains(&w)));
        let capped = crowded.iter().filter(|&&w| w == 500).count();
        assert!(capped > crowded.len() / 2, "capped {capped}");
    }

    #[test]
    fn engaged_autonomous_always_uses_combat_delay() {
        let config = SchedulerConfig::default();
        let mut rng = CountingRng {
            inner: PcgRng::new(7),
            draws: 0,
        };
        let engaged = Assignment::Autonomous { engaged: true };

        let mut waits = Vec::new();
        for _ in 0..200 {
            let mut batch = SchedulingBatch::new(&mut rng);
            let mut scheduler = UpdateScheduler::new();
            assert!(!scheduler.should_defer(0, &engaged, &mut batch, &config));
            waits.push(scheduler.wait_timer_ms());
        }

        // one scheduler running through many consecutive updates
        let mut scheduler = UpdateScheduler::new();
        for _ in 0..200 {
            let mut batch = SchedulingBatch::new(&mut rng);
            let elapsed = scheduler.wait_timer_ms();
            assert!(!scheduler.should_defer(elapsed, &engaged, &mut batch, &config));
            waits.push(scheduler.wait_timer_ms());
        }

        assert!(waits.iter().all(|&w| w == 500), "{waits:?}");
        assert_eq!(rng.draws, 0);
    }
}
