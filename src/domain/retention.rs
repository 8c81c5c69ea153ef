use chrono::{DateTime, Duration, Utc};

/// Oldest publication time still shown: `now - days`, inclusive.
///
/// A window reaching past the earliest representable instant keeps everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindow {
    cutoff: DateTime<Utc>,
}

impl RetentionWindow {
    pub fn new(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            cutoff: now
                .checked_sub_signed(Duration::days(i64::from(days)))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    pub fn contains(&self, published_at: DateTime<Utc>) -> bool {
        published_at >= self.cutoff
    }
}
