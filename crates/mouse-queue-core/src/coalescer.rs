//! Movement coalescer: harvests history points on each movement message.

use crate::config::{QueueConfig, MAX_HISTORY_DEPTH};
use crate::error::QueueResult;
use crate::point::{HistoryPoint, MousePoint, ResolutionMode, VirtualScreen};
use crate::queue::MovementQueue;
use tracing::trace;

/// Source of recent movement samples (the platform history buffer).
pub trait MoveHistory {
    /// Fill `out` with samples at or before `reference`, most recent first.
    /// Returns how many entries were written; failures report 0.
    fn query(&self, reference: &HistoryPoint, mode: ResolutionMode, out: &mut [HistoryPoint])
        -> usize;

    /// Current virtual-screen geometry.
    fn virtual_screen(&self) -> VirtualScreen;
}

/// Filter state carried between movement messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookState {
    pub last_timestamp: u32,
    /// Masked screen position of the last movement message.
    pub last_point: MousePoint,
}

impl HookState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether a sample is new enough to enqueue.
    pub fn accepts(&self, time: u32) -> bool {
        time >= self.last_timestamp
    }
}

/// A movement message, already converted to screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveMessage {
    pub screen: MousePoint,
    pub time: u32,
}

/// Everything the hook mutates: filter state, queue and configuration.
#[derive(Debug)]
pub struct MouseQueueContext {
    state: HookState,
    queue: MovementQueue,
    config: QueueConfig,
}

impl MouseQueueContext {
    pub fn new(config: QueueConfig) -> QueueResult<Self> {
        let config = config.sanitized();
        let queue = MovementQueue::with_limit(config.initial_capacity, config.max_capacity)?;
        Ok(Self {
            state: HookState::default(),
            queue,
            config,
        })
    }

    /// Reset the filter state and reinitialize the queue.
    pub fn reset(&mut self) -> QueueResult<()> {
        self.queue.reset(self.config.initial_capacity)?;
        self.state.reset();
        Ok(())
    }

    /// Replace the configuration, then reset like [`Self::reset`].
    pub fn reconfigure(&mut self, config: QueueConfig) -> QueueResult<()> {
        let config = config.sanitized();
        self.queue = MovementQueue::with_limit(config.initial_capacity, config.max_capacity)?;
        self.config = config;
        self.state.reset();
        Ok(())
    }

    pub fn state(&self) -> &HookState {
        &self.state
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn queue(&self) -> &MovementQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut MovementQueue {
        &mut self.queue
    }

    /// Harvest history points for one movement message.
    ///
    /// Points are appended in the order the history returns them, newest
    /// first, skipping anything older than the previous message. Returns the
    /// number of points appended.
    ///
    /// The batch is appended whole or not at all, and the filter state
    /// always advances to this message, so a failed batch is never
    /// harvested twice.
    pub fn on_mouse_move<H: MoveHistory + ?Sized>(
        &mut self,
        message: MoveMessage,
        history: &H,
    ) -> QueueResult<usize> {
        let mode = self.config.mode;
        let screen = match mode {
            ResolutionMode::HighResolution => history.virtual_screen(),
            ResolutionMode::Display => VirtualScreen::default(),
        };

        let masked = message.screen.masked();
        let reference = HistoryPoint::new(masked.x, masked.y, message.time);

        let mut buf = [HistoryPoint::default(); MAX_HISTORY_DEPTH];
        let depth = self.config.history_depth.min(MAX_HISTORY_DEPTH);
        let count = history.query(&reference, mode, &mut buf[..depth]).min(depth);

        let mut accepted = [MousePoint::ORIGIN; MAX_HISTORY_DEPTH];
        let mut appended = 0;
        for raw in buf[..count].iter().filter(|p| self.state.accepts(p.time)) {
            accepted[appended] = mode.normalize(raw, &screen);
            appended += 1;
        }
        let result = self.queue.extend(&accepted[..appended]);

        trace!(
            time = message.time,
            returned = count,
            appended,
            last = self.state.last_timestamp,
            ok = result.is_ok(),
            "Coalesced movement history"
        );

        self.state.last_timestamp = message.time;
        self.state.last_point = masked;
        result.map(|()| appended)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::QueueError;
    use std::cell::RefCell;

    /// In-memory history returning a scripted batch per query.
    #[derive(Default)]
    pub(crate) struct FakeHistory {
        pub batches: RefCell<Vec<Vec<HistoryPoint>>>,
        pub queries: RefCell<Vec<(HistoryPoint, ResolutionMode, usize)>>,
        pub screen: VirtualScreen,
    }

    impl FakeHistory {
        pub fn with_batches(batches: Vec<Vec<HistoryPoint>>) -> Self {
            Self {
                batches: RefCell::new(batches.into_iter().rev().collect()),
                ..Default::default()
            }
        }
    }

    impl MoveHistory for FakeHistory {
        fn query(
            &self,
            reference: &HistoryPoint,
            mode: ResolutionMode,
            out: &mut [HistoryPoint],
        ) -> usize {
            self.queries.borrow_mut().push((*reference, mode, out.len()));
            let batch = self.batches.borrow_mut().pop().unwrap_or_default();
            let n = batch.len().min(out.len());
            out[..n].copy_from_slice(&batch[..n]);
            n
        }

        fn virtual_screen(&self) -> VirtualScreen {
            self.screen
        }
    }

    fn hp(x: i32, y: i32, time: u32) -> HistoryPoint {
        HistoryPoint::new(x, y, time)
    }

    fn msg(x: i32, y: i32, time: u32) -> MoveMessage {
        MoveMessage {
            screen: MousePoint::new(x, y),
            time,
        }
    }

    #[test]
    fn test_batch_is_appended_newest_first() {
        let history = FakeHistory::with_batches(vec![vec![
            hp(30, 30, 300),
            hp(20, 20, 200),
            hp(10, 10, 100),
        ]]);
        let mut ctx = MouseQueueContext::new(QueueConfig::default()).unwrap();

        assert_eq!(ctx.on_mouse_move(msg(30, 30, 300), &history).unwrap(), 3);
        assert_eq!(
            ctx.queue().as_slice(),
            &[
                MousePoint::new(30, 30),
                MousePoint::new(20, 20),
                MousePoint::new(10, 10)
            ]
        );
    }

    #[test]
    fn test_old_points_are_filtered() {
        let history = FakeHistory::with_batches(vec![
            vec![hp(2, 2, 200), hp(1, 1, 100)],
            // Second query still sees the first batch in history
            vec![hp(4, 4, 400), hp(3, 3, 300), hp(2, 2, 200), hp(1, 1, 100)],
        ]);
        let mut ctx = MouseQueueContext::new(QueueConfig::default()).unwrap();

        assert_eq!(ctx.on_mouse_move(msg(2, 2, 200), &history).unwrap(), 2);
        assert_eq!(ctx.state().last_timestamp, 200);

        // 200 equals the threshold and is kept; 100 is strictly older
        assert_eq!(ctx.on_mouse_move(msg(4, 4, 400), &history).unwrap(), 3);
        assert_eq!(
            ctx.queue().as_slice(),
            &[
                MousePoint::new(2, 2),
                MousePoint::new(1, 1),
                MousePoint::new(4, 4),
                MousePoint::new(3, 3),
                MousePoint::new(2, 2),
            ]
        );
        assert_eq!(ctx.state().last_timestamp, 400);
    }

    #[test]
    fn test_monotonic_filtering_over_many_calls() {
        // x carries each sample's timestamp so queued points can be checked
        let mut batches = Vec::new();
        for t in 3..=22u32 {
            let now = t * 10;
            batches.push(vec![
                hp(now as i32, 0, now),
                hp((now - 15) as i32, 0, now - 15),
                hp((now - 25) as i32, 0, now - 25),
            ]);
        }
        let history = FakeHistory::with_batches(batches);
        let mut ctx = MouseQueueContext::new(QueueConfig::default()).unwrap();

        let mut previous = 0u32;
        for t in 3..=22u32 {
            let before = ctx.queue().len();
            ctx.on_mouse_move(msg(t as i32, 0, t * 10), &history).unwrap();
            let appended = &ctx.queue().as_slice()[before..];
            assert!(!appended.is_empty());
            assert!(appended.iter().all(|p| p.x as u32 >= previous));
            if t > 3 {
                // 10*t - 15 and 10*t - 25 fall below the previous 10*(t-1)
                assert_eq!(appended, &[MousePoint::new((t * 10) as i32, 0)]);
            }
            previous = t * 10;
        }
        assert_eq!(ctx.queue().len(), 3 + 19);
    }

    #[test]
    fn test_failed_append_still_advances_state() {
        let history = FakeHistory::with_batches(vec![
            vec![hp(3, 3, 300), hp(2, 2, 200), hp(1, 1, 100)],
            // The next query replays the batch that failed
            vec![hp(4, 4, 400), hp(3, 3, 300), hp(2, 2, 200), hp(1, 1, 100)],
        ]);
        let config = QueueConfig {
            initial_capacity: 2,
            max_capacity: 2,
            ..Default::default()
        };
        let mut ctx = MouseQueueContext::new(config).unwrap();

        let err = ctx.on_mouse_move(msg(3, 3, 300), &history).unwrap_err();
        assert!(matches!(err, QueueError::OutOfMemory { requested: 3 }));
        assert!(ctx.queue().is_empty());
        assert_eq!(ctx.state().last_timestamp, 300);
        assert_eq!(ctx.state().last_point, MousePoint::new(3, 3));

        assert_eq!(ctx.on_mouse_move(msg(4, 4, 400), &history).unwrap(), 2);
        assert_eq!(
            ctx.queue().as_slice(),
            &[MousePoint::new(4, 4), MousePoint::new(3, 3)]
        );
    }

    #[test]
    fn test_state_tracks_message_not_history() {
        let history = FakeHistory::with_batches(vec![vec![hp(9, 9, 9_999)]]);
        let mut ctx = MouseQueueContext::new(QueueConfig::default()).unwrap();

        ctx.on_mouse_move(msg(-16, 5, 1_000), &history).unwrap();
        assert_eq!(ctx.state().last_timestamp, 1_000);
        assert_eq!(ctx.state().last_point, MousePoint::new(0xFFF0, 5));
    }

    #[test]
    fn test_query_uses_masked_reference_and_depth() {
        let history = FakeHistory::default();
        let config = QueueConfig {
            history_depth: 8,
            ..Default::default()
        };
        let mut ctx = MouseQueueContext::new(config).unwrap();

        assert_eq!(ctx.on_mouse_move(msg(-1, 70_000, 42), &history).unwrap(), 0);
        let queries = history.queries.borrow();
        let (reference, mode, len) = queries[0];
        assert_eq!(reference, hp(0xFFFF, 70_000 & 0xFFFF, 42));
        assert_eq!(mode, ResolutionMode::Display);
        assert_eq!(len, 8);
        assert!(ctx.queue().is_empty());
    }

    #[test]
    fn test_display_mode_unpacks_negative_coords() {
        let history = FakeHistory::with_batches(vec![vec![hp(0xFFF0, 0x0010, 5)]]);
        let mut ctx = MouseQueueContext::new(QueueConfig::default()).unwrap();

        ctx.on_mouse_move(msg(-16, 16, 5), &history).unwrap();
        assert_eq!(ctx.queue().as_slice(), &[MousePoint::new(-16, 16)]);
    }

    #[test]
    fn test_high_resolution_mode_rescales() {
        let mut history = FakeHistory::with_batches(vec![vec![hp(960, 0, 5)]]);
        history.screen = VirtualScreen {
            left: 0,
            top: 0,
            width: 1920,
            height: 1080,
        };
        let config = QueueConfig {
            mode: ResolutionMode::HighResolution,
            ..Default::default()
        };
        let mut ctx = MouseQueueContext::new(config).unwrap();

        ctx.on_mouse_move(msg(959, 0, 5), &history).unwrap();
        assert_eq!(ctx.queue().as_slice(), &[MousePoint::new(959, 0)]);
        assert_eq!(history.queries.borrow()[0].1, ResolutionMode::HighResolution);
    }

    #[test]
    fn test_reset_accepts_old_timestamps_again() {
        let history = FakeHistory::with_batches(vec![
            vec![hp(1, 1, 5_000)],
            vec![hp(2, 2, 100)],
        ]);
        let mut ctx = MouseQueueContext::new(QueueConfig::default()).unwrap();

        ctx.on_mouse_move(msg(1, 1, 5_000), &history).unwrap();
        ctx.reset().unwrap();
        assert_eq!(ctx.state().last_timestamp, 0);
        assert!(ctx.queue().is_empty());
        assert_eq!(ctx.queue().capacity(), 16);

        assert_eq!(ctx.on_mouse_move(msg(2, 2, 100), &history).unwrap(), 1);
    }
}
