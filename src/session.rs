// THEORY:
// The `session` module owns everything temporal that is not tracker state: the
// periodic drive, the scan throttle, the hide-grace timer, and the lifecycle of
// one detection session. It is the only module that touches the runtime.
//
// Key architectural principles:
// 1.  **One Task Per Session**: A started session is exactly one spawned task
//     that owns the pipeline, the tracker, the frame source and the overlay
//     sink. Cycles run to completion inside that task, so there are no
//     concurrent cycles and no shared state to lock.
// 2.  **Tick Fast, Scan Slow**: The loop is driven by a refresh-rate ticker but
//     performs a CPU-bound scan only when the scan interval (200 ms) has
//     elapsed since the previous one. The display can refresh at 60 Hz while
//     detection stays at ~5 Hz.
// 3.  **The Hide Timer Is A Message**: A deferred hide is a spawned sleep that
//     sends a `HideCheck` command back into the session loop. The loop then
//     asks the tracker whether the hide is still due; an intervening detection
//     makes it a no-op. Supersession lives in tracker state, not in timer
//     cancellation.
// 4.  **Cycles Never Kill The Loop**: A malformed frame is logged and treated
//     as an empty cycle. A source that reports not-ready is skipped outright.
//     The loop only exits on `stop()`.

use crate::core_modules::bounds::BoundingBox;
use crate::core_modules::frame::FrameBuffer;
use crate::core_modules::tracker::{BoundsTracker, TrackerUpdate};
use crate::pipeline::{DetectionPipeline, PipelineConfig};
use log::{debug, error, info};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Pull-based access to the live video feed, supplied by the capture
/// collaborator. `snapshot` hands the session an owned copy of the current
/// frame in the canonical interleaved RGBA layout.
pub trait FrameSource: Send + 'static {
    /// Whether a frame is available right now. A `false` skips the cycle.
    fn ready(&self) -> bool;

    /// The current frame, or `None` if the source cannot produce one after
    /// all. Called at most once per scan.
    fn snapshot(&mut self) -> Option<FrameBuffer>;
}

/// The overlay consumer. Both calls are fire-and-forget from the detector's
/// perspective and must not block.
pub trait OverlaySink: Send + 'static {
    /// Position the highlight at `bounds` within a `frame_width` x
    /// `frame_height` frame.
    fn show(&mut self, bounds: BoundingBox, frame_width: u32, frame_height: u32);

    /// Remove the highlight.
    fn hide(&mut self);
}

enum SessionCommand {
    /// A hide-grace timer elapsed; recheck whether the hide is still due.
    HideCheck,
    Stop,
}

/// Handle to a running detection session.
///
/// `start` spawns the session task; `stop` halts further cycles, hides the
/// overlay and waits for the task to finish. Dropping the handle without
/// stopping aborts the task without the final overlay hide.
pub struct DetectionSession {
    command_tx: mpsc::Sender<SessionCommand>,
    task: Option<JoinHandle<()>>,
}

impl DetectionSession {
    /// Starts a detection session over `source`, reporting to `sink`. All
    /// tracking state begins fresh.
    pub fn start<S, O>(source: S, sink: O, config: PipelineConfig) -> Self
    where
        S: FrameSource,
        O: OverlaySink,
    {
        let (command_tx, command_rx) = mpsc::channel(8);
        let worker = SessionWorker {
            pipeline: DetectionPipeline::new(config.clone()),
            tracker: BoundsTracker::new(config.jitter_tolerance),
            config,
            source,
            sink,
            command_tx: command_tx.clone(),
            command_rx,
            last_scan: None,
            hide_pending: false,
        };
        let task = tokio::spawn(worker.run());
        Self {
            command_tx,
            task: Some(task),
        }
    }

    /// Stops the session: no further cycles run and the overlay is hidden.
    /// Idempotent; extra calls do nothing.
    pub async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = self.command_tx.send(SessionCommand::Stop).await;
            let _ = task.await;
        }
    }

    /// Whether the session task is still running.
    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for DetectionSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct SessionWorker<S, O> {
    pipeline: DetectionPipeline,
    tracker: BoundsTracker,
    config: PipelineConfig,
    source: S,
    sink: O,
    command_tx: mpsc::Sender<SessionCommand>,
    command_rx: mpsc::Receiver<SessionCommand>,
    last_scan: Option<Instant>,
    hide_pending: bool,
}

impl<S: FrameSource, O: OverlaySink> SessionWorker<S, O> {
    async fn run(mut self) {
        let mut ticker = time::interval(self.config.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("detection session started");

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(SessionCommand::HideCheck) => {
                        self.hide_pending = false;
                        if self.tracker.hide_if_due() {
                            debug!("hide grace elapsed with no new detection; hiding overlay");
                            self.sink.hide();
                        }
                    }
                    Some(SessionCommand::Stop) | None => {
                        self.tracker.reset();
                        self.sink.hide();
                        info!("detection session stopped");
                        break;
                    }
                },
                _ = ticker.tick() => self.tick(),
            }
        }
    }

    /// One refresh tick. Runs a scan only when the throttle allows and the
    /// source has a frame ready.
    fn tick(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_scan {
            if now.duration_since(last) < self.config.scan_interval {
                return;
            }
        }
        if !self.source.ready() {
            return;
        }
        let Some(buffer) = self.source.snapshot() else {
            return;
        };
        self.last_scan = Some(now);

        let candidate = match buffer.view() {
            Ok(frame) => self.pipeline.detect(&frame),
            Err(err) => {
                // The one internal fault a cycle can hit; log and degrade to
                // an empty cycle rather than stopping the loop.
                error!("detection cycle dropped a malformed frame: {err}");
                None
            }
        };

        match self.tracker.observe(candidate) {
            TrackerUpdate::Redraw(bounds) => {
                debug!(
                    "stable bounds updated: x={} y={} w={} h={}",
                    bounds.x, bounds.y, bounds.width, bounds.height
                );
                self.sink.show(bounds, buffer.width, buffer.height);
            }
            TrackerUpdate::ScheduleHide => self.schedule_hide(),
            TrackerUpdate::Unchanged | TrackerUpdate::Idle => {}
        }
    }

    /// Arms the hide-grace timer. At most one timer is outstanding; the
    /// recheck at fire time handles supersession, the flag just avoids
    /// stacking a timer per empty cycle.
    fn schedule_hide(&mut self) {
        if self.hide_pending {
            return;
        }
        self.hide_pending = true;
        let command_tx = self.command_tx.clone();
        let grace = self.config.hide_grace;
        tokio::spawn(async move {
            time::sleep(grace).await;
            let _ = command_tx.send(SessionCommand::HideCheck).await;
        });
    }
}
