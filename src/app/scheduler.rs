use std::time::Duration;

/// The stage change a timer drives when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Solve finished in step mode, start the reveal
    EnterVisualizing,
    /// Reveal one more visited cell
    VisualizeTick,
    /// Settle delay elapsed, start walking the path
    EnterMoving,
}

/// What a timer carries: its kind and the session generation that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub generation: u64,
    pub kind: TimerKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer {
    id: TimerId,
    due: Duration,
    /// Set for repeating timers
    period: Option<Duration>,
    token: Token,
}

/// Single-threaded timer queue over a virtual clock.
///
/// Nothing fires on its own: the owner moves the clock with [`Scheduler::pop_due`]
/// and [`Scheduler::advance_to`], handling each due timer in order. A handler may
/// schedule or cancel timers between pops.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    /// Shortest allowed period, so a repeating timer always moves the clock forward.
    const MIN_PERIOD: Duration = Duration::from_millis(1);

    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of timers still scheduled.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    fn insert(&mut self, delay: Duration, period: Option<Duration>, token: Token) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due: self.now + delay,
            period,
            token,
        });
        id
    }

    /// Fire `token` once, `delay` from now.
    pub fn schedule_after(&mut self, delay: Duration, token: Token) -> TimerId {
        self.insert(delay, None, token)
    }

    /// Fire `token` every `period`, first one `period` from now, until cancelled.
    pub fn schedule_every(&mut self, period: Duration, token: Token) -> TimerId {
        let period = period.max(Self::MIN_PERIOD);
        self.insert(period, Some(period), token)
    }

    /// Returns whether the timer was still scheduled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    /// Take the earliest timer due at or before `until` and move the clock to its due time.
    ///
    /// Timers due at the same instant fire in scheduling order. Repeating timers are
    /// rescheduled one period later before being returned.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, Token)> {
        let (idx, _) = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.id.0))?;

        let timer = &mut self.timers[idx];
        let fired = (timer.id, timer.token);
        self.now = self.now.max(timer.due);
        match timer.period {
            Some(period) => timer.due += period,
            None => {
                self.timers.swap_remove(idx);
            }
        }
        Some(fired)
    }

    /// Move the clock forward to `until` without firing anything.
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn token(kind: TimerKind) -> Token {
        Token {
            generation: 0,
            kind,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn drain(scheduler: &mut Scheduler, until: Duration) -> Vec<(Duration, TimerKind)> {
        let mut fired = Vec::new();
        while let Some((_, token)) = scheduler.pop_due(until) {
            fired.push((scheduler.now(), token.kind));
        }
        scheduler.advance_to(until);
        fired
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(ms(300), token(TimerKind::EnterVisualizing));
        assert!(drain(&mut scheduler, ms(299)).is_empty());
        assert_eq!(
            drain(&mut scheduler, ms(300)),
            vec![(ms(300), TimerKind::EnterVisualizing)]
        );
        assert!(drain(&mut scheduler, ms(10_000)).is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_repeating_timer() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule_every(ms(30), token(TimerKind::VisualizeTick));
        let fired = drain(&mut scheduler, ms(100));
        assert_eq!(
            fired.iter().map(|(at, _)| *at).collect::<Vec<_>>(),
            vec![ms(30), ms(60), ms(90)]
        );
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(drain(&mut scheduler, ms(1000)).is_empty());
    }

    #[test]
    fn test_due_order_and_ties() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(ms(500), token(TimerKind::EnterMoving));
        scheduler.schedule_after(ms(300), token(TimerKind::EnterVisualizing));
        scheduler.schedule_after(ms(300), token(TimerKind::VisualizeTick));
        let kinds = drain(&mut scheduler, ms(500))
            .into_iter()
            .map(|(_, kind)| kind)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                TimerKind::EnterVisualizing,
                TimerKind::VisualizeTick,
                TimerKind::EnterMoving
            ]
        );
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(ms(10), token(TimerKind::EnterMoving));
        scheduler.schedule_every(ms(10), token(TimerKind::VisualizeTick));
        scheduler.cancel_all();
        assert!(drain(&mut scheduler, ms(100)).is_empty());
        assert_eq!(scheduler.now(), ms(100));
    }

    #[test]
    fn test_delays_are_relative_to_now() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_to(ms(1000));
        scheduler.schedule_after(ms(500), token(TimerKind::EnterMoving));
        assert!(drain(&mut scheduler, ms(1499)).is_empty());
        assert_eq!(drain(&mut scheduler, ms(1500)).len(), 1);
    }
}
