use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use epd_tabletd::config::DeviceInfo;
use epd_tabletd::input_devices::{Digitizer, QUERY_COMMAND, Transport, TransportError};
use epd_tabletd::runtime;
use epd_tabletd::screen_mapping::transform;
use epd_tabletd::screen_overlay::{RecordingRefresh, Region, SolidBrush};
use epd_tabletd::tablet_driver::{Decoded, Generation};
use tokio::sync::watch;

/// Plays back canned reports, then reports an empty bus.
#[derive(Default)]
struct Replay {
    reports: VecDeque<[u8; 22]>,
    written: Vec<Vec<u8>>,
}

impl Transport for Replay {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
        self.written.push(bytes.to_vec());
        Ok(bytes.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.reports.pop_front() {
            Some(report) => {
                buf.copy_from_slice(&report);
                Ok(report.len())
            }
            None => Err(TransportError::Read(io::ErrorKind::WouldBlock.into())),
        }
    }
}

fn wez01_query() -> [u8; 22] {
    let mut buf = [0u8; 22];
    buf[3..5].copy_from_slice(&15624u16.to_le_bytes());
    buf[5..7].copy_from_slice(&20832u16.to_le_bytes());
    buf[11..13].copy_from_slice(&4095u16.to_le_bytes());
    buf[16] = 255;
    buf[17..19].copy_from_slice(&63i16.to_le_bytes());
    buf[19..21].copy_from_slice(&63i16.to_le_bytes());
    buf
}

fn pen_down(x: u16, y: u16, hover: i16) -> [u8; 22] {
    let mut buf = [0u8; 22];
    buf[..3].copy_from_slice(&[0x13, 0x00, 0x1a]);
    // in range, tip down
    buf[3] = 0x21;
    buf[4..6].copy_from_slice(&x.to_le_bytes());
    buf[6..8].copy_from_slice(&y.to_le_bytes());
    buf[8..10].copy_from_slice(&1200u16.to_le_bytes());
    buf[15..17].copy_from_slice(&hover.wrapping_neg().to_le_bytes());
    buf
}

fn config() -> DeviceInfo {
    DeviceInfo {
        x_scale: 0.1,
        y_scale: 0.1,
        touchdown_height: 5,
        sample_delay_ms: 1,
        refresh_period_ms: 0,
        ..DeviceInfo::default()
    }
}

#[test]
fn report_lands_on_the_expected_pixel() {
    let mut replay = Replay::default();
    replay.reports.push_back(wez01_query());
    replay.reports.push_back(pen_down(1000, 2000, 3));
    let mut digitizer = Digitizer::new(replay);

    let features = digitizer.query_features().unwrap();
    assert_eq!(features.generation, Generation::WithHeight);

    let Decoded::Sample(raw) = digitizer.read_sample(&features).unwrap() else {
        panic!("report was ignored");
    };
    assert_eq!(raw.hover_height, 3);

    let point = transform(&raw, &features, &config());
    assert_eq!((point.x, point.y), (100.0, 200.0));
    assert!(point.touch_down);

    assert_eq!(digitizer.into_transport().written, vec![QUERY_COMMAND.to_vec()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stroke_reaches_the_panel() {
    let mut replay = Replay::default();
    replay.reports.push_back(wez01_query());
    replay.reports.push_back(pen_down(1000, 2000, 3));
    let mut digitizer = Digitizer::new(replay);
    let features = digitizer.query_features().unwrap();

    let refresh = RecordingRefresh::new();
    let (stop, shutdown) = watch::channel(false);
    let task = tokio::spawn(runtime::run(
        digitizer,
        features,
        config(),
        SolidBrush,
        refresh.clone(),
        shutdown,
    ));
    tokio::time::sleep(Duration::from_millis(100)).await;
    stop.send(true).unwrap();
    let stats = task.await.unwrap().unwrap();

    assert_eq!(stats.sampler.painted, 1);
    let calls = refresh.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(
        call.region,
        Region {
            x: 80,
            y: 180,
            width: 48,
            height: 41
        }
    );
    assert_eq!(call.mode, 6);
    assert!(!call.hold);

    // pixel (100, 200) is row 20, column 20 of the region
    let width_bytes = 48 / 8;
    assert_eq!(call.buffer[20 * width_bytes + 2] & 0x08, 0);
    // the region corner is outside the dab
    assert_eq!(call.buffer[0] & 0x80, 0x80);
}
