/// Events emitted while a pore analysis runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// A named phase of a single-frame analysis begins.
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// A scan over `total_frames` frames begins.
    ScanStart { total_frames: u64 },
    /// One frame of a scan has been processed, successfully or not.
    FrameDone { index: usize, succeeded: bool },
    ScanFinish,
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional observer.
///
/// A reporter without a callback swallows every event, so library code can
/// report unconditionally. The callback must be thread-safe because frames of a
/// trajectory may finish on different worker threads.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    observer: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            observer: Some(callback),
        }
    }

    pub fn is_silent(&self) -> bool {
        self.observer.is_none()
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(observer) = self.observer.as_ref() {
            observer(event);
        }
    }

    /// Runs `work` bracketed by `PhaseStart` and `PhaseFinish` events.
    ///
    /// The finish event is emitted whether or not `work` succeeds.
    pub fn phase<T>(&self, name: &'static str, work: impl FnOnce() -> T) -> T {
        self.report(Progress::PhaseStart { name });
        let outcome = work();
        self.report(Progress::PhaseFinish);
        outcome
    }
}
