//! The `pose_queue_depth` gauge under concurrent admit and release.
//!
//! Installs a global metrics recorder, so it lives in its own test binary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use contracts::ChannelNames;
use dispatcher::create_dispatcher;
use metrics::{
    Counter, Gauge, GaugeFn, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use serde_json::json;

/// Last value set on the depth gauge
#[derive(Default)]
struct DepthGauge(AtomicU64);

impl DepthGauge {
    fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::SeqCst))
    }
}

impl GaugeFn for DepthGauge {
    fn increment(&self, value: f64) {
        self.set(self.get() + value);
    }

    fn decrement(&self, value: f64) {
        self.set(self.get() - value);
    }

    fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::SeqCst);
    }
}

struct DepthRecorder {
    depth: Arc<DepthGauge>,
}

impl Recorder for DepthRecorder {
    fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn register_counter(&self, _: &Key, _: &Metadata<'_>) -> Counter {
        Counter::noop()
    }

    fn register_gauge(&self, key: &Key, _: &Metadata<'_>) -> Gauge {
        if key.name() == "pose_queue_depth" {
            Gauge::from_arc(Arc::clone(&self.depth))
        } else {
            Gauge::noop()
        }
    }

    fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

#[test]
fn test_depth_gauge_matches_queue_after_concurrent_traffic() {
    let depth = Arc::new(DepthGauge::default());
    metrics::set_global_recorder(DepthRecorder {
        depth: Arc::clone(&depth),
    })
    .unwrap();

    let (dispatcher, _outbound) = create_dispatcher(ChannelNames::default());

    let workers: Vec<_> = (0..8)
        .map(|w| {
            let d = dispatcher.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    if w % 2 == 0 {
                        d.admit_value(json!({ "x": i, "y": w })).unwrap();
                    } else {
                        d.report_status("FREE").unwrap();
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(depth.get(), dispatcher.queue_len().unwrap() as f64);
}
