//! Animated command output.
//!
//! An animated command owns a live region of the transcript and repaints it
//! from timer callbacks until it is cancelled, stopped by its duration, or
//! replaced. Cancellation is cooperative: a pending tick may still fire once
//! after cancellation, but it checks [`AnimationHandle::is_active`] first and
//! exits without output or rescheduling.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use termfolio_types::config::AnimationConfig;
use termfolio_types::error::Result;
use termfolio_types::output::OutputLine;

use crate::args::ParsedCommand;
use crate::command::{CommandContext, CommandOutput, Handler};
use crate::timer::TimerQueue;
use crate::transcript::Transcript;

/// Cleanup callback run when an animation is stopped.
pub type Cleanup = Box<dyn FnOnce()>;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cooperative cancellation flag shared between an animation and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

struct ActiveAnimation {
    token: CancellationToken,
    cleanup: Option<Cleanup>,
}

/// Active animations keyed by id. At most one entry per id.
///
/// Entries are removed from the map before their cleanup runs, so a cleanup
/// may safely call back into the registry.
#[derive(Clone, Default)]
pub struct AnimationRegistry {
    active: Rc<RefCell<HashMap<String, ActiveAnimation>>>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an animation, stopping any animation already using `id`.
    pub fn register(&self, id: &str, token: CancellationToken, cleanup: Option<Cleanup>) {
        self.stop(id);
        log::trace!("animation registered: {id}");
        self.active
            .borrow_mut()
            .insert(id.to_string(), ActiveAnimation { token, cleanup });
    }

    /// Cancel `id`, run its cleanup, and forget it. No-op if absent.
    pub fn stop(&self, id: &str) {
        let entry = self.active.borrow_mut().remove(id);
        if let Some(entry) = entry {
            log::trace!("animation stopped: {id}");
            finish(entry);
        }
    }

    /// Stop every active animation.
    pub fn stop_all(&self) {
        let drained: Vec<(String, ActiveAnimation)> = self.active.borrow_mut().drain().collect();
        if !drained.is_empty() {
            log::trace!("stopping {} animations", drained.len());
        }
        for (_, entry) in drained {
            finish(entry);
        }
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.borrow().contains_key(id)
    }

    /// Ids of active animations, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.active.borrow().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.active.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.borrow().is_empty()
    }
}

fn finish(entry: ActiveAnimation) {
    entry.token.cancel();
    if let Some(cleanup) = entry.cleanup {
        cleanup();
    }
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// Everything an animation needs from its session: the registry, the timer
/// queue, and the transcript it paints into. Clones share state.
#[derive(Clone)]
pub struct AnimationRuntime {
    registry: AnimationRegistry,
    timers: TimerQueue,
    transcript: Transcript,
    next_seq: Rc<Cell<u64>>,
    default_fps: u32,
    min_frame_delay_ms: u64,
}

impl AnimationRuntime {
    pub fn new(timers: TimerQueue, transcript: Transcript, config: &AnimationConfig) -> Self {
        Self {
            registry: AnimationRegistry::new(),
            timers,
            transcript,
            next_seq: Rc::new(Cell::new(0)),
            default_fps: config.default_fps.max(1),
            min_frame_delay_ms: config.min_frame_delay_ms.max(1),
        }
    }

    pub fn registry(&self) -> &AnimationRegistry {
        &self.registry
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Frame rate for continuous animations that do not pick their own.
    pub fn default_fps(&self) -> u32 {
        self.default_fps
    }

    /// Lower bound applied to every frame delay.
    pub fn min_frame_delay_ms(&self) -> u64 {
        self.min_frame_delay_ms
    }

    /// Allocate a unique id for `name`, register it, and open its region.
    pub fn begin(&self, name: &str) -> AnimationHandle {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        let id = format!("{name}-{}-{seq}", self.timers.now());
        let token = CancellationToken::new();
        self.registry.register(&id, token.clone(), None);
        self.transcript.open_region(&id);
        AnimationHandle {
            id,
            token,
            running: Rc::new(Cell::new(true)),
            runtime: self.clone(),
        }
    }
}

/// The view an animation has of itself while it runs.
#[derive(Clone)]
pub struct AnimationHandle {
    id: String,
    token: CancellationToken,
    running: Rc<Cell<bool>>,
    runtime: AnimationRuntime,
}

impl fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl AnimationHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// True until cancelled or cleaned up.
    pub fn is_active(&self) -> bool {
        self.running.get() && !self.token.is_cancelled()
    }

    /// Repaint this animation's region. Ignored once inactive.
    pub fn update_output(&self, lines: Vec<OutputLine>) {
        if self.is_active() {
            self.runtime.transcript.update_region(&self.id, lines);
        }
    }

    /// Mark finished and deregister.
    pub fn cleanup(&self) {
        self.running.set(false);
        self.runtime.registry.stop(&self.id);
    }

    /// Clean up and drop the region, leaving no trace in the transcript.
    pub fn abandon(&self) {
        self.cleanup();
        self.runtime.transcript.remove_region(&self.id);
    }

    /// Current clock value.
    pub fn now(&self) -> u64 {
        self.runtime.timers.now()
    }

    /// Schedule `callback` on the session's timer queue.
    pub fn schedule(&self, delay_ms: u64, callback: impl FnOnce() + 'static) {
        self.runtime.timers.schedule(delay_ms, callback);
    }

    /// Frame rate configured for the session.
    pub fn default_fps(&self) -> u32 {
        self.runtime.default_fps
    }

    fn frame_delay(&self, requested_ms: u64) -> u64 {
        requested_ms.max(self.runtime.min_frame_delay_ms)
    }
}

// ---------------------------------------------------------------------------
// Animated commands
// ---------------------------------------------------------------------------

/// Body of an animated command.
pub trait Animation {
    /// Start animating. Usually paints a first frame and schedules more.
    fn start(&self, handle: &AnimationHandle, parsed: &ParsedCommand) -> Result<()>;

    /// Stop automatically after this many milliseconds.
    fn duration_ms(&self, _parsed: &ParsedCommand) -> Option<u64> {
        None
    }
}

/// Wrap an [`Animation`] as a command handler.
///
/// Each invocation gets a fresh id (`{name}-{now}-{seq}`) and live region.
/// The handler returns no lines of its own; everything arrives through the
/// region. If `start` fails the animation is deregistered and its region
/// removed before the error is returned.
pub fn animated_command(name: &str, animation: Rc<dyn Animation>) -> Handler {
    let name = name.to_lowercase();
    Box::new(move |ctx: &mut CommandContext<'_>| -> Result<CommandOutput> {
        let handle = ctx.runtime.begin(&name);
        if let Err(e) = animation.start(&handle, ctx.parsed) {
            log::warn!("{} failed to start: {e}", handle.id());
            handle.abandon();
            return Err(e);
        }
        if let Some(duration) = animation.duration_ms(ctx.parsed).filter(|d| *d > 0) {
            let stopper = handle.clone();
            handle.schedule(duration, move || stopper.cleanup());
        }
        Ok(CommandOutput::empty())
    })
}

/// A function producing one frame.
pub type Frame = Box<dyn Fn() -> Vec<OutputLine>>;

/// Cycle through `frames`, one every `frame_delay_ms`.
///
/// The first frame is painted immediately. Each tick checks that the handle
/// is still active before painting.
pub fn animate_frames(handle: &AnimationHandle, frames: Vec<Frame>, frame_delay_ms: u64) {
    fn tick(handle: AnimationHandle, frames: Rc<Vec<Frame>>, index: usize, delay: u64) {
        if !handle.is_active() || frames.is_empty() {
            return;
        }
        let frame = &frames[index % frames.len()];
        handle.update_output(frame());
        let next = handle.clone();
        handle.schedule(delay, move || tick(next, frames, index + 1, delay));
    }
    let delay = handle.frame_delay(frame_delay_ms);
    tick(handle.clone(), Rc::new(frames), 0, delay);
}

/// Repaint with `render(elapsed_ms)` at roughly `fps` frames per second.
///
/// `elapsed_ms` is measured on the clock rather than counted in frames, so
/// late ticks catch up instead of slowing playback.
pub fn animate_continuous(
    handle: &AnimationHandle,
    render: impl Fn(u64) -> Vec<OutputLine> + 'static,
    fps: u32,
) {
    fn tick(
        handle: AnimationHandle,
        render: Rc<dyn Fn(u64) -> Vec<OutputLine>>,
        start: u64,
        delay: u64,
    ) {
        if !handle.is_active() {
            return;
        }
        handle.update_output(render(handle.now().saturating_sub(start)));
        let next = handle.clone();
        handle.schedule(delay, move || tick(next, render, start, delay));
    }
    let delay = handle.frame_delay(1000 / u64::from(fps.max(1)));
    tick(handle.clone(), Rc::new(render), handle.now(), delay);
}
