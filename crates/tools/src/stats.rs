use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Samples kept for the panel graph.
const HISTORY_LEN: usize = 74;

/// Which measurement the panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsPanel {
    /// Frames rendered per second, sampled once a second.
    #[default]
    Fps,
    /// Milliseconds between `begin` and `end` of the last frame.
    Ms,
}

impl StatsPanel {
    pub fn from_index(index: usize) -> Self {
        match index {
            1 => StatsPanel::Ms,
            _ => StatsPanel::Fps,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StatsPanel::Fps => "FPS",
            StatsPanel::Ms => "MS",
        }
    }

    pub fn next(self) -> Self {
        match self {
            StatsPanel::Fps => StatsPanel::Ms,
            StatsPanel::Ms => StatsPanel::Fps,
        }
    }
}

/// Corner the overlay is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAnchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Placement and look of the stats overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub anchor: OverlayAnchor,
    pub opacity: f32,
    /// Draw above every other UI layer.
    pub foreground: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            anchor: OverlayAnchor::BottomRight,
            opacity: 0.9,
            foreground: true,
        }
    }
}

#[derive(Debug, Clone)]
struct Series {
    value: f32,
    min: f32,
    max: f32,
    history: VecDeque<f32>,
}

impl Series {
    fn new() -> Self {
        Self {
            value: 0.0,
            min: f32::INFINITY,
            max: 0.0,
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    fn push(&mut self, value: f32) {
        self.value = value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(value);
    }

    fn label(&self, name: &str) -> String {
        let min = if self.min.is_finite() { self.min } else { 0.0 };
        format!(
            "{} {} ({}-{})",
            self.value.round(),
            name,
            min.round(),
            self.max.round()
        )
    }
}

/// Frame timing panel model: wrap each frame in `begin`/`end`.
///
/// Timestamps are passed in so the numbers are reproducible in tests.
#[derive(Debug, Clone)]
pub struct FrameStats {
    panel: StatsPanel,
    style: OverlayStyle,
    frame_start: Option<Instant>,
    window_start: Instant,
    frames: u32,
    fps: Series,
    ms: Series,
}

impl FrameStats {
    pub fn new(now: Instant) -> Self {
        Self {
            panel: StatsPanel::Fps,
            style: OverlayStyle::default(),
            frame_start: None,
            window_start: now,
            frames: 0,
            fps: Series::new(),
            ms: Series::new(),
        }
    }

    pub fn panel(&self) -> StatsPanel {
        self.panel
    }

    pub fn show_panel(&mut self, panel: StatsPanel) {
        self.panel = panel;
    }

    /// Clicking the overlay cycles through the panels.
    pub fn cycle_panel(&mut self) {
        self.panel = self.panel.next();
    }

    pub fn style(&self) -> OverlayStyle {
        self.style
    }

    pub fn begin(&mut self, now: Instant) {
        self.frame_start = Some(now);
    }

    /// Close the frame opened by `begin`. Returns `now` for chaining into the
    /// next `begin`.
    pub fn end(&mut self, now: Instant) -> Instant {
        self.frames += 1;
        if let Some(start) = self.frame_start.take() {
            self.ms
                .push(now.saturating_duration_since(start).as_secs_f32() * 1000.0);
        }

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames as f32 / elapsed.as_secs_f32();
            self.fps.push(fps);
            tracing::trace!(fps, "frame rate sampled");
            self.window_start = now;
            self.frames = 0;
        }
        now
    }

    pub fn fps(&self) -> f32 {
        self.fps.value
    }

    pub fn frame_ms(&self) -> f32 {
        self.ms.value
    }

    /// Text for the active panel, e.g. `60 FPS (58-61)`.
    pub fn label(&self) -> String {
        match self.panel {
            StatsPanel::Fps => self.fps.label(StatsPanel::Fps.name()),
            StatsPanel::Ms => self.ms.label(StatsPanel::Ms.name()),
        }
    }

    /// Graph samples for the active panel, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        let series = match self.panel {
            StatsPanel::Fps => &self.fps,
            StatsPanel::Ms => &self.ms,
        };
        series.history.iter().copied()
    }

    /// Largest sample of the active panel, for scaling the graph.
    pub fn history_max(&self) -> f32 {
        self.history().fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frames(stats: &mut FrameStats, start: Instant, count: u32, frame: Duration) -> Instant {
        let mut now = start;
        for _ in 0..count {
            stats.begin(now);
            now += frame;
            stats.end(now);
        }
        now
    }

    #[test]
    fn panel_selection() {
        assert_eq!(StatsPanel::from_index(0), StatsPanel::Fps);
        assert_eq!(StatsPanel::from_index(1), StatsPanel::Ms);
        assert_eq!(StatsPanel::from_index(7), StatsPanel::Fps);
    }

    #[test]
    fn cycling_wraps() {
        let mut stats = FrameStats::new(Instant::now());
        assert_eq!(stats.panel(), StatsPanel::Fps);
        stats.cycle_panel();
        assert_eq!(stats.panel(), StatsPanel::Ms);
        stats.cycle_panel();
        assert_eq!(stats.panel(), StatsPanel::Fps);
    }

    #[test]
    fn fps_sampled_once_per_second() {
        let start = Instant::now();
        let mut stats = FrameStats::new(start);
        run_frames(&mut stats, start, 59, Duration::from_millis(16));
        assert_eq!(stats.fps(), 0.0);
        run_frames(&mut stats, start + Duration::from_millis(59 * 16), 10, Duration::from_millis(16));
        assert!(stats.fps() > 55.0 && stats.fps() < 70.0);
    }

    #[test]
    fn ms_tracks_last_frame() {
        let start = Instant::now();
        let mut stats = FrameStats::new(start);
        stats.begin(start);
        stats.end(start + Duration::from_millis(8));
        assert!((stats.frame_ms() - 8.0).abs() < 0.01);
        stats.show_panel(StatsPanel::Ms);
        assert_eq!(stats.label(), "8 MS (8-8)");
    }

    #[test]
    fn history_is_bounded() {
        let start = Instant::now();
        let mut stats = FrameStats::new(start);
        stats.show_panel(StatsPanel::Ms);
        run_frames(&mut stats, start, 500, Duration::from_millis(5));
        assert_eq!(stats.history().count(), HISTORY_LEN);
        assert!((stats.history_max() - 5.0).abs() < 0.01);
    }

    #[test]
    fn overlay_pinned_bottom_right() {
        let style = FrameStats::new(Instant::now()).style();
        assert_eq!(style.anchor, OverlayAnchor::BottomRight);
        assert_eq!(style.opacity, 0.9);
        assert!(style.foreground);
    }

    #[test]
    fn empty_label() {
        let stats = FrameStats::new(Instant::now());
        assert_eq!(stats.label(), "0 FPS (0-0)");
    }
}
