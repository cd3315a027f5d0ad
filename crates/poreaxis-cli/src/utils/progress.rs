use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use poreaxis::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

struct BarState {
    bar: ProgressBar,
    failed_frames: usize,
}

/// Renders engine progress events on stderr with `indicatif`.
///
/// Single-frame phases are shown as a spinner, trajectory scans as a bar
/// counting processed frames and failures.
#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<BarState>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target).with_style(Self::spinner_style());
        bar.finish_and_clear();
        Self {
            state: Arc::new(Mutex::new(BarState {
                bar,
                failed_frames: 0,
            })),
        }
    }

    pub fn failed_frames(&self) -> usize {
        self.state.lock().map(|s| s.failed_frames).unwrap_or(0)
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = self.state.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut state) = state.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    state.bar.reset();
                    state.bar.set_length(0);
                    state.bar.set_style(Self::spinner_style());
                    state
                        .bar
                        .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    state.bar.set_message(name);
                }
                Progress::PhaseFinish => {
                    state.bar.disable_steady_tick();
                    state.bar.finish_with_message("✓ Done");
                }
                Progress::ScanStart { total_frames } => {
                    state.failed_frames = 0;
                    state.bar.disable_steady_tick();
                    state.bar.reset();
                    state.bar.set_length(total_frames);
                    state.bar.set_style(Self::bar_style());
                    state.bar.set_message("Analysing frames");
                }
                Progress::FrameDone { index, succeeded } => {
                    if !succeeded {
                        state.failed_frames += 1;
                        let failed = state.failed_frames;
                        state.bar.println(format!("  ✗ Frame {} failed", index));
                        state
                            .bar
                            .set_message(format!("Analysing frames ({} failed)", failed));
                    }
                    state.bar.inc(1);
                }
                Progress::ScanFinish => {
                    if let Some(length) = state.bar.length() {
                        state.bar.set_position(length);
                    }
                    state.bar.finish();
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<30} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .map(|style| style.progress_chars("##-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
