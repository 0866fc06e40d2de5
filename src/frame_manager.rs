//! Frame scheduling: the request queue, the crossfade between the active
//! frame pair, pitch contours and purge semantics.
//!
//! The producing (text/phoneme) thread calls [`FrameManager::queue_frame`]
//! and [`FrameManager::last_user_index`]; the consuming (audio) thread
//! calls [`FrameManager::current_frame`] once per output sample. One lock
//! covers queue mutation, active-pair promotion and purge; the critical
//! section is the scheduler state transition and nothing else.

use alloc::boxed::Box;
use alloc::collections::VecDeque;

use spin::Mutex;

use crate::frame::Frame;

/// A queued parameter frame with its timing.
#[derive(Debug, Clone)]
struct FrameRequest {
    min_num_samples: u32,
    num_fade_samples: u32,
    /// Silence sentinel: promoted as a copy of the preceding frame with
    /// `pre_formant_gain` zeroed.
    null_frame: bool,
    frame: Frame,
    /// Pitch increment per hold sample (first half for contour frames).
    voice_pitch_inc: f32,
    /// Pitch increment for the second half of a 3-point contour.
    voice_pitch_inc2: f32,
    has_contour: bool,
    user_index: i32,
}

impl FrameRequest {
    fn silence() -> Self {
        Self {
            min_num_samples: 0,
            num_fade_samples: 0,
            null_frame: true,
            frame: Frame::default(),
            voice_pitch_inc: 0.0,
            voice_pitch_inc2: 0.0,
            has_contour: false,
            user_index: -1,
        }
    }
}

#[derive(Debug)]
struct SchedulerState {
    queue: VecDeque<Box<FrameRequest>>,
    old: Box<FrameRequest>,
    new: Option<Box<FrameRequest>>,
    current: Frame,
    current_is_null: bool,
    sample_counter: u32,
    last_user_index: i32,
}

impl SchedulerState {
    /// Advance the scheduler by one sample.
    fn step(&mut self) {
        self.sample_counter += 1;
        if let Some(new) = self.new.take() {
            if self.sample_counter > new.num_fade_samples {
                // Fade complete: the target becomes the held frame.
                self.old = new;
            } else {
                let ratio = self.sample_counter as f32 / new.num_fade_samples as f32;
                self.current = Frame::at_fade_position(&self.old.frame, &new.frame, ratio);
                self.new = Some(new);
            }
        } else if self.sample_counter > self.old.min_num_samples {
            if let Some(mut new) = self.queue.pop_front() {
                self.current_is_null = false;
                if new.null_frame {
                    // Fade to silence: same parameters, gain ramped to
                    // zero, pitch pinned to the audible value.
                    new.frame = self.old.frame;
                    new.frame.pre_formant_gain = 0.0;
                    new.frame.voice_pitch = self.current.voice_pitch;
                    new.voice_pitch_inc = 0.0;
                } else if self.old.null_frame {
                    // Start of stream: fade the gain up from zero instead
                    // of crossfading from unrelated parameters.
                    self.old.frame = new.frame;
                    self.old.frame.pre_formant_gain = 0.0;
                }
                if new.user_index != -1 {
                    self.last_user_index = new.user_index;
                }
                self.sample_counter = 0;
                // Pre-advance the target pitch so that the declared start
                // value is reached when the fade completes.
                new.frame.voice_pitch += new.voice_pitch_inc * new.num_fade_samples as f32;
                self.new = Some(new);
            } else {
                self.current_is_null = true;
            }
        } else {
            // Hold phase: only the pitch moves, along the precomputed
            // contour.
            let inc = if self.old.has_contour && self.sample_counter > self.old.min_num_samples / 2
            {
                self.old.voice_pitch_inc2
            } else {
                self.old.voice_pitch_inc
            };
            self.current.voice_pitch += inc;
            self.old.frame.voice_pitch = self.current.voice_pitch;
        }
    }
}

/// The shared frame scheduler.
///
/// All operations take the single internal lock, so a `FrameManager` can be
/// shared between a producer and a consumer thread through an `Arc`.
#[derive(Debug)]
pub struct FrameManager {
    state: Mutex<SchedulerState>,
}

impl Default for FrameManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameManager {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SchedulerState {
                queue: VecDeque::new(),
                old: Box::new(FrameRequest::silence()),
                new: None,
                current: Frame::default(),
                current_is_null: true,
                sample_counter: 0,
                last_user_index: -1,
            }),
        }
    }

    /// Append a frame request to the queue.
    ///
    /// `frame = None` queues the silence sentinel used to drain the tail of
    /// an utterance. `min_num_samples` is the hold time after the fade
    /// completes, `num_fade_samples` the crossfade length from the previous
    /// frame; both are floored at 1. `user_index` is echoed through
    /// [`last_user_index`](Self::last_user_index) when the request is
    /// promoted (-1 leaves the reported index unchanged).
    ///
    /// With `purge_queue` set, all pending requests are dropped first and
    /// the active pair collapses to the currently audible values, so this
    /// request starts a fresh crossfade from exactly what is heard now.
    pub fn queue_frame(
        &self,
        frame: Option<&Frame>,
        min_num_samples: u32,
        num_fade_samples: u32,
        user_index: i32,
        purge_queue: bool,
    ) {
        let min_num_samples = min_num_samples.max(1);
        let mut request = Box::new(FrameRequest {
            min_num_samples,
            num_fade_samples: num_fade_samples.max(1),
            null_frame: true,
            frame: Frame::default(),
            voice_pitch_inc: 0.0,
            voice_pitch_inc2: 0.0,
            has_contour: false,
            user_index,
        });

        if let Some(frame) = frame {
            request.null_frame = false;
            request.frame = *frame;
            if frame.mid_voice_pitch > 0.0 {
                // 3-point contour: sweep to the midpoint over the first
                // half of the hold, then to the end pitch.
                request.has_contour = true;
                let half_samples = min_num_samples / 2;
                if half_samples > 0 {
                    request.voice_pitch_inc =
                        (frame.mid_voice_pitch - frame.voice_pitch) / half_samples as f32;
                    request.voice_pitch_inc2 = (frame.end_voice_pitch - frame.mid_voice_pitch)
                        / (min_num_samples - half_samples) as f32;
                }
            } else {
                request.voice_pitch_inc =
                    (frame.end_voice_pitch - frame.voice_pitch) / min_num_samples as f32;
            }
        }

        let mut guard = self.state.lock();
        let state = &mut *guard;
        if purge_queue {
            state.queue.clear();
            state.sample_counter = state.old.min_num_samples;
            if let Some(new) = state.new.take() {
                state.old.null_frame = new.null_frame;
                state.old.frame = state.current;
            }
        }
        state.queue.push_back(request);
    }

    /// Advance the scheduler one sample and return the interpolated frame,
    /// or `None` when all queued frames are exhausted.
    pub fn current_frame(&self) -> Option<Frame> {
        let mut state = self.state.lock();
        state.step();
        if state.current_is_null {
            None
        } else {
            Some(state.current)
        }
    }

    /// The `user_index` of the most recently promoted request, or -1 before
    /// any request has been promoted.
    pub fn last_user_index(&self) -> i32 {
        self.state.lock().last_user_index
    }
}
