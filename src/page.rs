use chrono::{DateTime, FixedOffset, Timelike};

use crate::countdown::{Countdown, CountdownSettings, Tick};
use crate::layout::Layout;
use crate::reveal::{RevealEffect, RevealTracker, TextPhase};
use crate::surface::{BlockId, Surface, TextId};
use crate::theme::{apply_theme, select_theme};
use crate::timers::{TimerId, TimerQueue};

pub const GREETING_HEAD_START_MS: i64 = 800;
pub const BLOCK_STAGGER_MS: i64 = 400;
pub const LINE_STAGGER_MS: i64 = 200;
pub const COUNTDOWN_TICK_MS: i64 = 1_000;
pub const CELESTIAL_PULSE_MS: i64 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Task {
    ThemeRefresh,
    CountdownTick,
    RevealBlock(BlockId),
    StartText { text: TextId, generation: u32 },
    SettleText { text: TextId, generation: u32 },
    CelestialRelease,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageSettings {
    pub countdown: CountdownSettings,
    pub theme_refresh_ms: i64,
    pub storm: bool,
}

/// Drives theme, reveals and countdown against a [`Surface`].
///
/// The host calls [`Page::pump`] whenever time has moved on and
/// [`Page::notify_visible`] when a watched block scrolls into view.
pub struct Page<S: Surface> {
    surface: S,
    layout: Layout,
    timers: TimerQueue<Task>,
    tracker: RevealTracker,
    countdown: Countdown,
    countdown_timer: Option<TimerId>,
    settings: PageSettings,
    started: bool,
    running: bool,
}

impl<S: Surface> Page<S> {
    pub fn new(surface: S, layout: Layout, settings: PageSettings) -> Self {
        Self {
            surface,
            layout,
            timers: TimerQueue::new(),
            tracker: RevealTracker::default(),
            countdown: Countdown::new(settings.countdown.clone()),
            countdown_timer: None,
            settings,
            started: false,
            running: false,
        }
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[cfg(target_arch = "wasm32")]
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[cfg(test)]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn start(&mut self, now: DateTime<FixedOffset>) {
        if self.started {
            return;
        }
        self.started = true;
        self.running = true;
        tracing::debug!("page: start");
        let now_ms = now.timestamp_millis();

        self.refresh_theme(now);
        self.timers
            .schedule_every(now_ms, self.settings.theme_refresh_ms, Task::ThemeRefresh);

        for block in &self.layout.blocks {
            self.surface.set_block_visible(block.id, false);
            for line in &block.lines {
                self.surface.set_text_phase(line.id, TextPhase::Hidden);
            }
        }

        // The greeting always goes first; eager cards queue up behind it.
        let greeting = self.layout.greeting;
        self.reveal_block(greeting, now_ms);
        let mut delay = GREETING_HEAD_START_MS;
        let others: Vec<BlockId> = self
            .layout
            .blocks
            .iter()
            .map(|block| block.id)
            .filter(|id| *id != greeting)
            .collect();
        for block in others {
            if self.surface.block_in_viewport(block) {
                self.timers
                    .schedule_once(now_ms, delay, Task::RevealBlock(block));
                delay += BLOCK_STAGGER_MS;
            } else {
                self.surface.observe(block);
            }
        }

        self.tick_countdown(now);
        if !self.countdown.is_halted() {
            self.countdown_timer = Some(self.timers.schedule_every(
                now_ms,
                COUNTDOWN_TICK_MS,
                Task::CountdownTick,
            ));
        }
    }

    /// Runs every task due at `now`, including ones scheduled by earlier tasks.
    /// Follow-up delays count from the task's due time, not from `now`.
    pub fn pump(&mut self, now: DateTime<FixedOffset>) {
        let now_ms = now.timestamp_millis();
        while let Some((due_ms, task)) = self.timers.pop_due(now_ms) {
            self.run(task, due_ms, now);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn next_due_ms(&self) -> Option<i64> {
        self.timers.next_due()
    }

    pub fn notify_visible(&mut self, block: BlockId, now: DateTime<FixedOffset>) {
        if !self.running {
            return;
        }
        self.surface.unobserve(block);
        self.reveal_block(block, now.timestamp_millis());
    }

    pub fn pulse_celestial(&mut self, now: DateTime<FixedOffset>) {
        if !self.running {
            return;
        }
        self.surface.set_style_var("--celestial-scale", "1.2");
        self.timers.schedule_once(
            now.timestamp_millis(),
            CELESTIAL_PULSE_MS,
            Task::CelestialRelease,
        );
    }

    /// Cancels every pending callback; late ones can no longer touch the surface.
    pub fn stop(&mut self) {
        tracing::debug!("page: stop");
        self.running = false;
        self.timers.clear();
        self.countdown_timer = None;
        self.tracker.invalidate_all();
        for block in &self.layout.blocks {
            self.surface.unobserve(block.id);
        }
    }

    fn run(&mut self, task: Task, due_ms: i64, now: DateTime<FixedOffset>) {
        match task {
            Task::ThemeRefresh => self.refresh_theme(now),
            Task::CountdownTick => self.tick_countdown(now),
            Task::RevealBlock(block) => self.reveal_block(block, due_ms),
            Task::StartText { text, generation } => {
                if !self.tracker.is_current(text, generation) {
                    return;
                }
                let Some((content, effect)) = self.text_source(text) else {
                    return;
                };
                let phase = TextPhase::animating(effect, &content);
                self.surface.set_text_phase(text, phase);
                let duration = i64::from(effect.duration_ms(&content));
                self.timers
                    .schedule_once(due_ms, duration, Task::SettleText { text, generation });
            }
            Task::SettleText { text, generation } => {
                if self.tracker.is_current(text, generation) {
                    self.surface.set_text_phase(text, TextPhase::Settled);
                }
            }
            Task::CelestialRelease => self.surface.set_style_var("--celestial-scale", "1"),
        }
    }

    fn refresh_theme(&mut self, now: DateTime<FixedOffset>) {
        let mut theme = select_theme(now.hour());
        if self.settings.storm {
            theme = theme.with_storm();
        }
        tracing::debug!("theme: {:?}", theme.band);
        apply_theme(&mut self.surface, &theme);
    }

    fn reveal_block(&mut self, id: BlockId, now_ms: i64) {
        let Some(block) = self.layout.block_mut(id) else {
            return;
        };
        if block.revealed {
            self.surface.set_block_visible(id, true);
            return;
        }
        block.revealed = true;
        tracing::debug!("reveal: block {}", id.0);
        let lines: Vec<(TextId, String, RevealEffect)> = block
            .lines
            .iter()
            .map(|line| (line.id, line.original.clone(), line.effect))
            .collect();
        self.surface.set_block_visible(id, true);
        for (index, (text, content, effect)) in lines.into_iter().enumerate() {
            let delay = LINE_STAGGER_MS * index as i64;
            self.reveal_text(text, &content, effect, now_ms, delay);
        }
    }

    /// Sets the full text right away; only the visual transition is staged.
    fn reveal_text(
        &mut self,
        text: TextId,
        content: &str,
        effect: RevealEffect,
        now_ms: i64,
        delay_ms: i64,
    ) {
        if !self.surface.has_text(text) {
            return;
        }
        let generation = self.tracker.begin(text);
        self.surface.set_text(text, content);
        self.surface.set_text_phase(text, TextPhase::Pending);
        self.timers
            .schedule_once(now_ms, delay_ms, Task::StartText { text, generation });
    }

    fn tick_countdown(&mut self, now: DateTime<FixedOffset>) {
        let text = self.layout.countdown_text;
        match self.countdown.tick(now) {
            Tick::Remaining(remaining) => {
                // A newer generation drops any arrived-message callbacks still queued.
                self.tracker.begin(text);
                self.surface.set_text(text, &remaining);
                self.surface.set_text_phase(text, TextPhase::Settled);
            }
            Tick::Arrived(message) => {
                self.reveal_text(text, &message, RevealEffect::arrived(), now.timestamp_millis(), 0);
            }
            Tick::Unchanged | Tick::Halted => {}
        }
        if self.countdown.is_halted() {
            if let Some(id) = self.countdown_timer.take() {
                tracing::debug!("countdown: stopping tick");
                self.timers.cancel(id);
            }
        }
    }

    /// Content and effect a delayed text callback should animate with.
    fn text_source(&self, text: TextId) -> Option<(String, RevealEffect)> {
        if text == self.layout.countdown_text {
            return Some((
                self.settings.countdown.arrived_message.clone(),
                RevealEffect::arrived(),
            ));
        }
        self.layout
            .blocks
            .iter()
            .flat_map(|block| block.lines.iter())
            .find(|line| line.id == text)
            .map(|line| (line.original.clone(), line.effect))
    }
}
