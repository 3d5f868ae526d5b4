use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

use crate::note::Note;

/// Appended to a note's displayed title while its alarm is pending
pub const ALARM_MARKER: &str = "(Alarm)";
pub const MIN_ALARM_MINUTES: u32 = 1;
pub const MAX_ALARM_MINUTES: u32 = 60;
const MILLIS_PER_MINUTE: u64 = 60_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlarmError {
    #[error("Alarm time should be a number 1-60 (got '{0}')")]
    InvalidDuration(String),
}

/// Parse the minutes field of the alarm dialog
pub fn parse_minutes(text: &str) -> Result<u32, AlarmError> {
    let minutes: u32 = text
        .trim()
        .parse()
        .map_err(|_| AlarmError::InvalidDuration(text.to_string()))?;
    if !(MIN_ALARM_MINUTES..=MAX_ALARM_MINUTES).contains(&minutes) {
        return Err(AlarmError::InvalidDuration(text.to_string()));
    }
    Ok(minutes)
}

/// Time source for countdowns, measured from an arbitrary fixed origin
pub trait Clock {
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Simulated time. Clones share the same timeline.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlarmId(u64);

impl std::fmt::Display for AlarmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct AlarmInner {
    id: AlarmId,
    message: String,
    duration_ms: u64,
    deadline: Duration,
    expired: Cell<bool>,
}

/// Handle to a one-shot alarm. The note that created it and the scheduler
/// each hold a clone; `expired` flips to true exactly once, when it fires.
#[derive(Debug, Clone)]
pub struct Alarm {
    inner: Rc<AlarmInner>,
}

impl Alarm {
    pub fn id(&self) -> AlarmId {
        self.inner.id
    }

    pub fn message(&self) -> &str {
        &self.inner.message
    }

    pub fn duration_ms(&self) -> u64 {
        self.inner.duration_ms
    }

    pub fn deadline(&self) -> Duration {
        self.inner.deadline
    }

    pub fn is_expired(&self) -> bool {
        self.inner.expired.get()
    }
}

impl PartialEq for Alarm {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Alarm {}

pub struct AlarmScheduler {
    clock: Box<dyn Clock>,
    next_id: u64,
    // Countdowns still running, sorted by deadline
    pending: Vec<Alarm>,
    // Every alarm created and not yet pruned
    alarms: Vec<Alarm>,
}

impl AlarmScheduler {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            next_id: 0,
            pending: Vec::new(),
            alarms: Vec::new(),
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(Box::new(SystemClock::new()))
    }

    /// Validate the dialog input, start a countdown and attach it to `owner`.
    ///
    /// On invalid minutes nothing is created and the note is left untouched.
    /// A previous alarm on the note keeps running; only the note's reference
    /// is replaced.
    pub fn create_alarm(
        &mut self,
        owner: &mut Note,
        message_text: &str,
        minutes_text: &str,
    ) -> Result<Alarm, AlarmError> {
        let minutes = parse_minutes(minutes_text)?;
        let alarm = self.schedule(message_text, u64::from(minutes) * MILLIS_PER_MINUTE);
        owner.attach_alarm(alarm.clone());
        info!(note = %owner.id(), alarm = %alarm.id(), minutes, "alarm attached");
        Ok(alarm)
    }

    /// Start a raw countdown of `duration_ms`
    pub fn schedule(&mut self, message: &str, duration_ms: u64) -> Alarm {
        let id = AlarmId(self.next_id);
        self.next_id += 1;

        let deadline = self.clock.now() + Duration::from_millis(duration_ms);
        let alarm = Alarm {
            inner: Rc::new(AlarmInner {
                id,
                message: message.to_string(),
                duration_ms,
                deadline,
                expired: Cell::new(false),
            }),
        };

        let at = self.pending.partition_point(|a| a.deadline() <= deadline);
        self.pending.insert(at, alarm.clone());
        self.alarms.push(alarm.clone());
        debug!(alarm = %id, duration_ms, "countdown started");
        alarm
    }

    /// Fire every alarm whose countdown has elapsed, oldest deadline first.
    ///
    /// Must be called from the dispatch loop: `notify` runs there, so it sees
    /// note state without interleaving. Returns the number fired.
    pub fn fire_due(&mut self, mut notify: impl FnMut(&Alarm)) -> usize {
        let now = self.clock.now();
        let due = self.pending.partition_point(|a| a.deadline() <= now);
        let fired: Vec<Alarm> = self.pending.drain(..due).collect();

        for alarm in &fired {
            alarm.inner.expired.set(true);
            info!(alarm = %alarm.id(), "alarm fired");
            notify(alarm);
        }
        fired.len()
    }

    /// Time left until the next pending alarm fires
    pub fn time_until_next(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.pending
            .first()
            .map(|alarm| alarm.deadline().saturating_sub(now))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    /// Drop expired alarms from the shared collection
    pub fn prune_expired(&mut self) -> usize {
        let before = self.alarms.len();
        self.alarms.retain(|alarm| !alarm.is_expired());
        let pruned = before - self.alarms.len();
        if pruned > 0 {
            debug!(pruned, "expired alarms pruned");
        }
        pruned
    }
}

impl std::fmt::Debug for AlarmScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlarmScheduler")
            .field("next_id", &self.next_id)
            .field("pending", &self.pending.len())
            .field("alarms", &self.alarms.len())
            .finish()
    }
}
