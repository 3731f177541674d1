// Queue admission state
//
// QueueValidator decides whether a video may be queued, based on the queue
// list and the run's count/duration limits, and tracks how much has been
// queued so far. A single temporary limit scope can override the limits while
// one queue action is drained.

use crate::models::{LimitSettings, VideoDetails};
use crate::services::queue_list::{QueueList, QueueListError};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Why a video may not be queued.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("Already recorded or skipped.")]
    AlreadyRecorded,

    #[error("Queue limit reached.")]
    QueueLimitReached,

    #[error("Queue duration limit reached.")]
    QueueDurationLimitReached,
}

/// Count/duration limits paired with what has been queued against them.
/// A zero limit means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueCounter {
    pub count_limit: u32,
    pub duration_limit: Duration,
    pub queued_count: u32,
    pub queued_duration: Duration,
}

impl QueueCounter {
    fn check(&self, runtime: Duration) -> Result<(), Rejection> {
        if self.count_limit > 0 && self.count_limit <= self.queued_count {
            return Err(Rejection::QueueLimitReached);
        }
        if !self.duration_limit.is_zero()
            && self.duration_limit < self.queued_duration.saturating_add(runtime)
        {
            return Err(Rejection::QueueDurationLimitReached);
        }
        Ok(())
    }

    fn add(&mut self, runtime: Duration) {
        self.queued_count += 1;
        self.queued_duration = self.queued_duration.saturating_add(runtime);
    }
}

/// Admission state for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionState {
    /// Run-wide limits and totals.
    pub persistent: QueueCounter,
    /// Active temporary scope, if any.
    pub temporary: Option<QueueCounter>,
}

impl AdmissionState {
    fn active(&self) -> &QueueCounter {
        self.temporary.as_ref().unwrap_or(&self.persistent)
    }

    fn active_mut(&mut self) -> &mut QueueCounter {
        self.temporary.as_mut().unwrap_or(&mut self.persistent)
    }
}

/// Queue admission controller.
///
/// Access goes through `&self`; the state sits behind a mutex so the
/// temporary-limit guard can stay alive while the scope's body queues media.
pub struct QueueValidator {
    queue_list: Box<dyn QueueList>,
    state: Mutex<AdmissionState>,
}

impl QueueValidator {
    pub fn new(queue_list: Box<dyn QueueList>) -> Self {
        Self {
            queue_list,
            state: Mutex::new(AdmissionState::default()),
        }
    }

    pub fn with_limits(queue_list: Box<dyn QueueList>, limits: &LimitSettings) -> Self {
        let validator = Self::new(queue_list);
        validator.set_queue_count_limit(limits.queue_count);
        validator.set_queue_duration_limit(limits.queue_duration);
        validator
    }

    fn lock(&self) -> MutexGuard<'_, AdmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_queue_count_limit(&self, limit: u32) {
        self.lock().persistent.count_limit = limit;
    }

    pub fn set_queue_duration_limit(&self, limit: Duration) {
        self.lock().persistent.duration_limit = limit;
    }

    /// Snapshot of the current state.
    pub fn snapshot(&self) -> AdmissionState {
        self.lock().clone()
    }

    pub fn has_temporary_limits(&self) -> bool {
        self.lock().temporary.is_some()
    }

    /// Decide whether `media` may be queued. The first failing rule wins:
    /// queue list membership, then the active count limit, then the active
    /// duration limit.
    pub fn can_queue_media(&self, media: &VideoDetails) -> Result<(), Rejection> {
        if self.queue_list.media_in_list(media) {
            return Err(Rejection::AlreadyRecorded);
        }
        self.lock().active().check(media.runtime())
    }

    /// Count `media` against the active limits without recording it.
    pub fn add_media_to_counts(&self, media: &VideoDetails) {
        self.lock().active_mut().add(media.runtime());
    }

    /// Record `media` in the queue list and count it.
    pub fn add_media_to_queue_list(&self, media: &VideoDetails) -> Result<(), QueueListError> {
        self.queue_list.add_media_to_list(media)?;
        self.add_media_to_counts(media);
        Ok(())
    }

    /// Apply temporary limits until the returned guard is dropped.
    ///
    /// With both limits zero nothing changes and the guard does nothing. When
    /// the guard that activated the scope drops, whatever was counted in the
    /// scope is added to the run totals.
    pub fn enter_temporary_limits(
        &self,
        count_limit: u32,
        duration_limit: Duration,
    ) -> TemporaryLimits<'_> {
        if count_limit == 0 && duration_limit.is_zero() {
            return TemporaryLimits {
                validator: self,
                activated: false,
            };
        }

        let mut state = self.lock();
        match state.temporary.as_mut() {
            // Only one scope exists at a time. A second entry replaces the
            // limits and keeps the progress made so far.
            Some(active) => {
                tracing::warn!(
                    "Temporary queue limits entered while already active; replacing limits"
                );
                active.count_limit = count_limit;
                active.duration_limit = duration_limit;
                // The outer guard still owns the scope
                TemporaryLimits {
                    validator: self,
                    activated: false,
                }
            }
            None => {
                state.temporary = Some(QueueCounter {
                    count_limit,
                    duration_limit,
                    ..Default::default()
                });
                TemporaryLimits {
                    validator: self,
                    activated: true,
                }
            }
        }
    }

    fn release_temporary_limits(&self) {
        let mut state = self.lock();
        if let Some(temporary) = state.temporary.take() {
            state.persistent.queued_count += temporary.queued_count;
            state.persistent.queued_duration = state
                .persistent
                .queued_duration
                .saturating_add(temporary.queued_duration);
        }
    }
}

/// Guard for a temporary limit scope. Dropping it folds the scope's counts
/// into the run totals, including on early return and unwinding.
#[must_use = "temporary limits are released as soon as the guard is dropped"]
pub struct TemporaryLimits<'a> {
    validator: &'a QueueValidator,
    activated: bool,
}

impl TemporaryLimits<'_> {
    pub fn is_active(&self) -> bool {
        self.activated
    }
}

impl Drop for TemporaryLimits<'_> {
    fn drop(&mut self) {
        if self.activated {
            self.validator.release_temporary_limits();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::queue_list::{MemoryQueueList, MockQueueList};

    fn video(episode: u32, run_time: &str) -> VideoDetails {
        VideoDetails::new(
            "Random Series",
            format!("My Random - s01e{episode} - Episode {episode} Title"),
            run_time,
        )
    }

    fn validator() -> QueueValidator {
        QueueValidator::new(Box::new(MemoryQueueList::new()))
    }

    #[test]
    fn test_can_queue_media() {
        let validator = validator();
        let video1 = video(15, "00:10:00");

        assert_eq!(validator.can_queue_media(&video1), Ok(()));
        validator.add_media_to_queue_list(&video1).unwrap();
        assert_eq!(
            validator.can_queue_media(&video1),
            Err(Rejection::AlreadyRecorded)
        );
    }

    #[test]
    fn test_already_recorded_wins_over_limits() {
        let validator = validator();
        let video1 = video(15, "00:10:00");
        validator.add_media_to_queue_list(&video1).unwrap();
        validator.set_queue_count_limit(1);
        validator.set_queue_duration_limit(Duration::from_secs(60));

        assert_eq!(
            validator.can_queue_media(&video1),
            Err(Rejection::AlreadyRecorded)
        );
    }

    #[test]
    fn test_count_limit() {
        let validator = validator();
        let (video1, video2) = (video(15, "00:10:00"), video(16, "00:15:00"));
        validator.set_queue_count_limit(1);

        assert_eq!(validator.can_queue_media(&video1), Ok(()));
        assert_eq!(validator.can_queue_media(&video2), Ok(()));
        validator.add_media_to_counts(&video1);
        assert_eq!(
            validator.can_queue_media(&video2),
            Err(Rejection::QueueLimitReached)
        );

        validator.set_queue_count_limit(2);
        assert_eq!(validator.can_queue_media(&video2), Ok(()));
    }

    #[test]
    fn test_duration_limit() {
        let validator = validator();
        let video1 = video(15, "00:10:00");
        let video2 = video(16, "00:06:00");
        validator.set_queue_duration_limit(Duration::from_secs(15 * 60));

        assert_eq!(validator.can_queue_media(&video1), Ok(()));
        validator.add_media_to_counts(&video1);
        assert_eq!(
            validator.can_queue_media(&video2),
            Err(Rejection::QueueDurationLimitReached)
        );

        validator.set_queue_duration_limit(Duration::from_secs(16 * 60));
        assert_eq!(validator.can_queue_media(&video2), Ok(()));
    }

    #[test]
    fn test_unparsable_runtime_counts_as_five_hours() {
        let validator = validator();
        validator.set_queue_duration_limit(Duration::from_secs(15 * 60));

        assert_eq!(
            validator.can_queue_media(&video(16, "")),
            Err(Rejection::QueueDurationLimitReached)
        );
        assert_eq!(
            validator.can_queue_media(&video(16, "5 HOURS")),
            Err(Rejection::QueueDurationLimitReached)
        );

        validator.set_queue_duration_limit(Duration::from_secs(5 * 60 * 60));
        assert_eq!(validator.can_queue_media(&video(16, "5 HOURS")), Ok(()));
    }

    #[test]
    fn test_temporary_count_limit() {
        let validator = validator();
        let (video1, video2, video3) =
            (video(15, "00:10:00"), video(16, "00:15:00"), video(17, "00:20:00"));
        validator.set_queue_count_limit(3);
        validator.add_media_to_queue_list(&video1).unwrap();

        {
            let scope = validator.enter_temporary_limits(1, Duration::ZERO);
            assert!(scope.is_active());
            assert_eq!(validator.can_queue_media(&video2), Ok(()));
            assert_eq!(validator.can_queue_media(&video3), Ok(()));
            validator.add_media_to_queue_list(&video2).unwrap();
            assert_eq!(
                validator.can_queue_media(&video3),
                Err(Rejection::QueueLimitReached)
            );
        }

        assert!(!validator.has_temporary_limits());
        assert_eq!(validator.snapshot().persistent.queued_count, 2);
        assert_eq!(validator.can_queue_media(&video3), Ok(()));
    }

    #[test]
    fn test_temporary_duration_limit() {
        let validator = validator();
        let (video1, video2, video3) =
            (video(15, "00:10:00"), video(16, "00:15:00"), video(17, "00:20:00"));
        validator.set_queue_duration_limit(Duration::from_secs(60 * 60));
        validator.add_media_to_queue_list(&video1).unwrap();

        {
            let _scope = validator.enter_temporary_limits(0, Duration::from_secs(20 * 60));
            assert_eq!(validator.can_queue_media(&video2), Ok(()));
            assert_eq!(validator.can_queue_media(&video3), Ok(()));
            validator.add_media_to_queue_list(&video2).unwrap();
            assert_eq!(
                validator.can_queue_media(&video3),
                Err(Rejection::QueueDurationLimitReached)
            );
        }

        let state = validator.snapshot();
        assert_eq!(state.persistent.queued_duration, Duration::from_secs(25 * 60));
        assert_eq!(validator.can_queue_media(&video3), Ok(()));
    }

    #[test]
    fn test_zero_temporary_limits_are_a_no_op() {
        let validator = validator();
        let scope = validator.enter_temporary_limits(0, Duration::ZERO);
        assert!(!scope.is_active());
        assert!(!validator.has_temporary_limits());

        validator.add_media_to_counts(&video(15, "00:10:00"));
        drop(scope);
        assert_eq!(validator.snapshot().persistent.queued_count, 1);
    }

    #[test]
    fn test_temporary_scope_folds_back_on_unwind() {
        let validator = validator();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = validator.enter_temporary_limits(5, Duration::ZERO);
            validator.add_media_to_counts(&video(15, "00:10:00"));
            panic!("simulated failure inside scope");
        }));

        assert!(result.is_err());
        let state = validator.snapshot();
        assert!(state.temporary.is_none());
        assert_eq!(state.persistent.queued_count, 1);
        assert_eq!(state.persistent.queued_duration, Duration::from_secs(600));
    }

    #[test]
    fn test_reentered_scope_is_owned_by_outer_guard() {
        let validator = validator();
        let outer = validator.enter_temporary_limits(1, Duration::ZERO);
        validator.add_media_to_counts(&video(15, "00:10:00"));

        let inner = validator.enter_temporary_limits(3, Duration::ZERO);
        let state = validator.snapshot();
        let temporary = state.temporary.unwrap();
        assert_eq!(temporary.count_limit, 3);
        assert_eq!(temporary.queued_count, 1);
        assert_eq!(state.persistent.queued_count, 0);

        assert!(!inner.is_active());
        drop(inner);
        assert!(validator.has_temporary_limits());
        assert_eq!(validator.snapshot().persistent.queued_count, 0);

        validator.add_media_to_counts(&video(16, "00:10:00"));
        drop(outer);
        assert!(!validator.has_temporary_limits());
        let state = validator.snapshot();
        assert_eq!(state.persistent.queued_count, 2);
        assert_eq!(state.persistent.queued_duration, Duration::from_secs(1200));
    }

    #[test]
    fn test_counts_do_not_touch_queue_list() {
        let mut queue_list = MockQueueList::new();
        queue_list.expect_media_in_list().return_const(false);
        queue_list.expect_add_media_to_list().never();

        let validator = QueueValidator::new(Box::new(queue_list));
        validator.add_media_to_counts(&video(15, "00:10:00"));
        assert_eq!(validator.snapshot().persistent.queued_count, 1);
    }

    #[test]
    fn test_queue_list_records_then_counts() {
        let mut queue_list = MockQueueList::new();
        queue_list
            .expect_add_media_to_list()
            .withf(|media| media.series == "Random Series")
            .times(1)
            .returning(|_| Ok(()));

        let validator = QueueValidator::new(Box::new(queue_list));
        validator
            .add_media_to_queue_list(&video(15, "00:10:00"))
            .unwrap();
        assert_eq!(validator.snapshot().persistent.queued_count, 1);
    }
}
