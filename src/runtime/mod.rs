//! The two loops of the daemon.
//!
//! The sampling loop polls the digitizer on a blocking thread and paints pen
//! dabs into the shared [`Canvas`]. The refresh loop runs on its own period,
//! takes whatever damage has accumulated and hands it to the panel. The canvas
//! mutex is the only state they share; older damage is absorbed into the
//! current rectangle, never queued.

pub mod sampler;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::Context;
use tokio::sync::{Notify, watch};

use crate::config::DeviceInfo;
use crate::input_devices::{Digitizer, Transport};
use crate::screen_overlay::{Canvas, Paint, RefreshService};
use crate::tablet_driver::DeviceFeatures;

pub use sampler::{SamplerStats, Step, sample_once};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub sampler: SamplerStats,
    pub refreshes: u64,
    pub refresh_errors: u64,
}

pub(crate) fn lock<P>(canvas: &Mutex<Canvas<P>>) -> MutexGuard<'_, Canvas<P>> {
    // a panic mid-paint leaves at worst a partially drawn dab
    canvas.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run both loops until `shutdown` turns true (or its sender is dropped).
///
/// The digitizer, and with it the transport handle, is dropped before this
/// returns. Any damage left when the loops stop is flushed once.
pub async fn run<T, P, R>(
    digitizer: Digitizer<T>,
    features: DeviceFeatures,
    cfg: DeviceInfo,
    brush: P,
    refresh: R,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<RunStats>
where
    T: Transport + 'static,
    P: Paint + 'static,
    R: RefreshService + 'static,
{
    let canvas = Arc::new(Mutex::new(Canvas::new(
        cfg.display_width,
        cfg.display_height,
        cfg.brush_radius,
        brush,
    )));
    let damaged = Arc::new(Notify::new());

    tracing::info!(
        "drawing on {}x{} panel, refresh every {} ms, sample delay {} ms",
        cfg.display_width,
        cfg.display_height,
        cfg.refresh_period_ms,
        cfg.sample_delay_ms
    );

    let sampling = tokio::task::spawn_blocking({
        let canvas = canvas.clone();
        let damaged = damaged.clone();
        let shutdown = shutdown.clone();
        let cfg = cfg.clone();
        move || sampling_loop(digitizer, &features, &cfg, &canvas, &damaged, &shutdown)
    });

    let refreshing = tokio::spawn(refresh_loop(
        canvas,
        refresh,
        RefreshSettings::from(&cfg),
        damaged,
        shutdown,
    ));

    let sampler = sampling.await.context("sampling loop panicked")?;
    let (refreshes, refresh_errors) = refreshing.await.context("refresh loop panicked")?;

    Ok(RunStats {
        sampler,
        refreshes,
        refresh_errors,
    })
}

fn sampling_loop<T: Transport, P: Paint>(
    mut digitizer: Digitizer<T>,
    features: &DeviceFeatures,
    cfg: &DeviceInfo,
    canvas: &Mutex<Canvas<P>>,
    damaged: &Notify,
    shutdown: &watch::Receiver<bool>,
) -> SamplerStats {
    let delay = Duration::from_millis(cfg.sample_delay_ms);
    let mut stats = SamplerStats::default();

    while !*shutdown.borrow() && shutdown.has_changed().is_ok() {
        let outcome = sample_once(&mut digitizer, features, cfg, canvas);
        match &outcome {
            Ok(Step::Painted) => damaged.notify_one(),
            Ok(_) => {}
            Err(e) => tracing::warn!("dropping sample: {e}"),
        }
        stats.record(&outcome);

        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }

    drop(digitizer);
    tracing::debug!("sampling stopped: {stats:?}");
    stats
}

#[derive(Debug, Clone, Copy)]
struct RefreshSettings {
    period: Duration,
    mode: u16,
    hold: bool,
}

impl From<&DeviceInfo> for RefreshSettings {
    fn from(cfg: &DeviceInfo) -> Self {
        Self {
            period: Duration::from_millis(cfg.refresh_period_ms),
            mode: cfg.refresh_mode,
            hold: cfg.refresh_hold,
        }
    }
}

async fn refresh_loop<P: Paint, R: RefreshService>(
    canvas: Arc<Mutex<Canvas<P>>>,
    mut refresh: R,
    settings: RefreshSettings,
    damaged: Arc<Notify>,
    mut shutdown: watch::Receiver<bool>,
) -> (u64, u64) {
    let mut interval = (!settings.period.is_zero()).then(|| {
        let mut interval = tokio::time::interval(settings.period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        interval
    });
    let mut counts = (0, 0);

    loop {
        if *shutdown.borrow() {
            break;
        }
        match interval.as_mut() {
            Some(interval) => tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown.changed() => break,
            },
            None => tokio::select! {
                _ = damaged.notified() => {}
                _ = shutdown.changed() => break,
            },
        }
        flush(&canvas, &mut refresh, settings, &mut counts);
    }

    flush(&canvas, &mut refresh, settings, &mut counts);
    tracing::debug!("refresh stopped after {} refreshes", counts.0);
    counts
}

fn flush<P: Paint, R: RefreshService>(
    canvas: &Mutex<Canvas<P>>,
    refresh: &mut R,
    settings: RefreshSettings,
    (refreshes, errors): &mut (u64, u64),
) {
    let taken = lock(canvas).take_damage();
    let sub = match taken {
        Ok(Some(sub)) => sub,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!("skipping refresh: {e}");
            *errors += 1;
            return;
        }
    };

    match refresh.refresh(&sub.data, sub.region, settings.mode, settings.hold) {
        Ok(()) => *refreshes += 1,
        Err(e) => {
            tracing::warn!("refresh of {:?} failed: {e:#}", sub.region);
            *errors += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_devices::digitizer::tests::ScriptedTransport;
    use crate::screen_overlay::{RecordingRefresh, Region, SolidBrush};
    use crate::tablet_driver::Generation;
    use crate::tablet_driver::report::tests::{features, pen_report};
    use crate::tablet_driver::report::{IN_PROXIMITY, TIP_SWITCH};

    fn cfg(refresh_period_ms: u64) -> DeviceInfo {
        DeviceInfo {
            display_width: 512,
            display_height: 512,
            x_scale: 0.1,
            y_scale: 0.1,
            brush_radius: 4,
            sample_delay_ms: 1,
            refresh_period_ms,
            refresh_mode: 6,
            ..DeviceInfo::default()
        }
    }

    fn strokes() -> ScriptedTransport {
        let mut transport = ScriptedTransport::default();
        for (x, y) in [(1000, 1000), (1500, 1200), (2000, 1000)] {
            transport
                .reads
                .push_back(Ok(pen_report(IN_PROXIMITY | TIP_SWITCH, x, y, 0, 0).to_vec()));
        }
        transport
    }

    async fn run_for(cfg: DeviceInfo, refresh: RecordingRefresh, millis: u64) -> RunStats {
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run(
            Digitizer::new(strokes()),
            features(Generation::WithHeight),
            cfg,
            SolidBrush,
            refresh,
            rx,
        ));
        tokio::time::sleep(Duration::from_millis(millis)).await;
        tx.send(true).unwrap();
        handle.await.unwrap().unwrap()
    }

    fn covered(calls: &[crate::screen_overlay::RefreshCall]) -> (u32, u32, u32, u32) {
        calls.iter().fold((u32::MAX, u32::MAX, 0, 0), |(x0, y0, x1, y1), c| {
            let r = c.region;
            (x0.min(r.x), y0.min(r.y), x1.max(r.x + r.width), y1.max(r.y + r.height))
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn unthrottled_refresh_covers_every_stroke() {
        let refresh = RecordingRefresh::new();
        let stats = run_for(cfg(0), refresh.clone(), 100).await;

        assert_eq!(stats.sampler.painted, 3);
        assert!(stats.sampler.transport_errors > 0);
        assert_eq!(stats.refresh_errors, 0);

        let calls = refresh.calls();
        assert_eq!(calls.len() as u64, stats.refreshes);
        assert!(!calls.is_empty());
        assert!(calls.iter().all(|c| c.mode == 6 && !c.hold));
        assert!(calls.iter().all(|c| c.region.x % 16 == 0 && c.region.width % 16 == 0));
        // dabs at (100,100), (150,120), (200,100) with radius 4
        assert_eq!(covered(&calls), (96, 96, 208, 125));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn periodic_refresh_coalesces_and_flushes_on_shutdown() {
        let refresh = RecordingRefresh::new();
        let stats = run_for(cfg(10_000), refresh.clone(), 100).await;

        assert_eq!(stats.sampler.painted, 3);
        let calls = refresh.calls();
        // one refresh at the immediate first tick at most, then the final flush
        assert!(!calls.is_empty() && calls.len() <= 2);
        assert_eq!(covered(&calls), (96, 96, 208, 125));
    }

    #[test]
    fn flush_without_damage_does_nothing() {
        let canvas = Mutex::new(Canvas::new(64, 64, 4, SolidBrush));
        let mut refresh = RecordingRefresh::new();
        let mut counts = (0, 0);
        let settings = RefreshSettings::from(&cfg(0));
        flush(&canvas, &mut refresh, settings, &mut counts);
        assert_eq!(counts, (0, 0));
        assert!(refresh.calls().is_empty());
    }

    #[test]
    fn flush_hands_off_and_resets() {
        let canvas = Mutex::new(Canvas::new(64, 64, 4, SolidBrush));
        lock(&canvas).paint(&crate::event_model::TransformedPoint {
            x: 20.0,
            y: 20.0,
            touch_down: true,
            pressure: 0,
            tool: crate::event_model::ToolType::Pen,
        });
        let mut refresh = RecordingRefresh::new();
        let mut counts = (0, 0);
        let settings = RefreshSettings::from(&cfg(0));

        flush(&canvas, &mut refresh, settings, &mut counts);
        flush(&canvas, &mut refresh, settings, &mut counts);

        assert_eq!(counts, (1, 0));
        let calls = refresh.calls();
        assert_eq!(
            calls[0].region,
            Region {
                x: 16,
                y: 16,
                width: 16,
                height: 9
            }
        );
        assert_eq!(calls[0].buffer.len(), 2 * 9);
        assert!(lock(&canvas).damage().is_empty());
    }
}
