use chrono::{DateTime, Duration, Utc};
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Creation and modification instants of an entity.
///
/// Both stay unset until the entity is first stamped by a service. `created_at`
/// is written once; `updated_at` moves forward on every stamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timestamps {
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Timestamps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamps read back from storage.
    pub fn restored(created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self {
            created_at: Some(created_at),
            updated_at: Some(updated_at),
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Sets `created_at` if unset and advances `updated_at`.
    ///
    /// `updated_at` is strictly greater after every call, even when the clock
    /// has not moved since the previous stamp.
    pub fn touch(&mut self) {
        let now = Utc::now();
        let now = match self.updated_at {
            Some(previous) if now <= previous => previous + Duration::microseconds(1),
            _ => now,
        };

        if self.created_at.is_none() {
            self.created_at = Some(now);
        }
        self.updated_at = Some(now);
    }

    /// Both instants, if the entity has been stamped.
    pub fn persisted(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.created_at?, self.updated_at?))
    }
}

/// An identified, timestamped domain entity.
///
/// Entity state is split in three: the identifier, the [`Timestamps`], and the
/// updatable `Data`. Updates only ever replace `Data`, so the identifier and
/// `created_at` cannot be overwritten by a merge.
pub trait DomainEntity: Clone + Send + Sync + 'static {
    type Id: Copy + Eq + Hash + Debug + Display + Send + Sync + 'static;
    type Data: Clone + Send + Sync;

    /// Name used in errors, logs and resource `type` fields.
    const TYPE_NAME: &'static str;

    fn id(&self) -> Self::Id;

    fn generate_id() -> Self::Id;

    fn timestamps(&self) -> &Timestamps;

    fn timestamps_mut(&mut self) -> &mut Timestamps;

    fn data(&self) -> &Self::Data;

    fn data_mut(&mut self) -> &mut Self::Data;

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.timestamps().created_at()
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.timestamps().updated_at()
    }

    fn update_time_stamps(&mut self) {
        self.timestamps_mut().touch();
    }

    /// Copies every updatable field from `source`.
    fn update_from(&mut self, source: &Self) {
        *self.data_mut() = source.data().clone();
    }
}
