//! # Integration Tests
//!
//! End-to-end tests across crates.
//!
//! Covers:
//! - contract snapshot checks
//! - config -> dispatcher -> router -> audit fan-out flows
//! - ordering and conservation under concurrent producers

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ActuatorState, ConfigVersion, SinkType};

    #[test]
    fn test_minimal_config_uses_defaults() {
        let blueprint = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
        assert_eq!(blueprint.version, ConfigVersion::V1);
        assert_eq!(blueprint.channels.log, "log");

        let sinks = blueprint.effective_sinks();
        assert_eq!(sinks.len(), 1);
        assert_eq!(sinks[0].sink_type, SinkType::Log);
        assert_eq!(ActuatorState::default(), ActuatorState::Idle);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{AuditRecord, Pose};
    use dispatcher::{
        create_audit_fanout, outbound_channels, Dispatcher, ManualClock, Router, StatusOutcome,
    };
    use serde_json::{json, Value};
    use tokio::sync::mpsc;
    use tokio::time::{timeout, Duration};

    /// Config -> Dispatcher -> Router -> AuditFanout -> file
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_e2e_config_to_audit_file() {
        let dir = tempfile::tempdir().unwrap();
        let audit_path = dir.path().join("audit.jsonl");
        let config = format!(
            r#"
[channels]
enqueue = "/enqueue"
status = "/status"
dequeue = "/dequeue"
log = "/logs"

[[audit_sinks]]
name = "trail"
sink_type = "file"
[audit_sinks.params]
path = "{}"
"#,
            audit_path.display()
        );
        let blueprint = ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap();

        let clock = Arc::new(ManualClock::new(1_000));
        let (outbound, mut receivers) = outbound_channels();
        let dispatcher = Dispatcher::with_clock(blueprint.channels.clone(), outbound, clock);
        let observer = dispatcher.clone();
        let fanout = create_audit_fanout(&blueprint.audit_sinks, receivers.log)
            .unwrap()
            .spawn();

        let (enqueue_tx, enqueue_rx) = mpsc::channel(8);
        let (status_tx, status_rx) = mpsc::channel(8);
        let router = Router::new(dispatcher).spawn(enqueue_rx, status_rx);

        let inputs = vec![
            json!({ "x": 1.0, "y": 0.5 }),
            json!({ "y": 3 }),
            serde_json::to_value(Pose::planar(4.0, 4.0, 0.0)).unwrap(),
            json!("garbage"),
        ];
        for value in inputs {
            enqueue_tx.send(value).await.unwrap();
        }
        drop(enqueue_tx);

        // Let both admissions land before any release
        timeout(Duration::from_secs(5), async {
            while observer.queue_len().unwrap() < 2 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("both poses admitted");
        drop(observer);

        let mut released = Vec::new();
        timeout(Duration::from_secs(5), async {
            while released.len() < 2 {
                status_tx.send("FREE".to_string()).await.unwrap();
                if let Ok(Some(pose)) =
                    timeout(Duration::from_millis(20), receivers.dequeue.recv()).await
                {
                    released.push(pose);
                }
            }
        })
        .await
        .expect("both poses released");
        drop(status_tx);

        let stats = router.join().await.unwrap();
        assert_eq!(stats.admitted, 2);
        assert_eq!(stats.discarded, 2);
        assert_eq!(stats.released, 2);

        // Router dropped the last dispatcher, so the log channel closes
        let report = fanout.await.unwrap();
        assert_eq!(report.records, 4);

        let records: Vec<AuditRecord> = std::fs::read_to_string(&audit_path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        let labels: Vec<&str> = records.iter().map(|r| r.source_label.as_str()).collect();
        assert_eq!(labels, vec!["/enqueue", "/enqueue", "/dequeue", "/dequeue"]);
        assert!(records.iter().all(|r| r.timestamp == 1_000));
        assert_eq!(records[2].description, released[0].to_string());
        assert_eq!(records[3].description, released[1].to_string());
    }

    /// Every admission and release reaches the audit file, well past the
    /// sink queue capacity
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_e2e_audit_file_matches_volume() {
        let dir = tempfile::tempdir().unwrap();
        let audit_path = dir.path().join("audit.jsonl");
        let config = format!(
            r#"
[[audit_sinks]]
name = "trail"
sink_type = "file"
queue_capacity = 16
[audit_sinks.params]
path = "{}"
"#,
            audit_path.display()
        );
        let blueprint = ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap();

        let (outbound, mut receivers) = outbound_channels();
        let dispatcher = Dispatcher::new(blueprint.channels.clone(), outbound);
        let fanout = create_audit_fanout(&blueprint.effective_sinks(), receivers.log)
            .unwrap()
            .spawn();

        let (enqueue_tx, enqueue_rx) = mpsc::channel(64);
        let (status_tx, status_rx) = mpsc::channel(64);
        let router = Router::new(dispatcher).spawn(enqueue_rx, status_rx);

        let producer = tokio::spawn(async move {
            for i in 0..1500 {
                enqueue_tx.send(json!({ "x": i, "y": 0 })).await.unwrap();
            }
        });
        let reporter = tokio::spawn(async move {
            for _ in 0..1000 {
                status_tx.send("FREE".to_string()).await.unwrap();
            }
        });
        producer.await.unwrap();
        reporter.await.unwrap();

        let stats = timeout(Duration::from_secs(10), router.join())
            .await
            .expect("router finished")
            .unwrap();
        assert_eq!(stats.admitted, 1500);
        assert!(stats.released <= 1000);

        let report = fanout.await.unwrap();
        assert_eq!(report.records, stats.admitted + stats.released);
        assert_eq!(report.sinks[0].1.dropped_count, 0);

        let lines = std::fs::read_to_string(&audit_path).unwrap().lines().count() as u64;
        assert_eq!(lines, stats.admitted + stats.released);

        let mut released = 0;
        while receivers.dequeue.try_recv().is_ok() {
            released += 1;
        }
        assert_eq!(released, stats.released);
    }

    /// Several producers racing a releaser never lose or duplicate a pose
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_e2e_conservation_under_concurrency() {
        let (outbound, mut receivers) = outbound_channels();
        let dispatcher = Dispatcher::new(Default::default(), outbound);

        let producers = 4;
        let per_producer = 100;
        let mut tasks = Vec::new();
        for p in 0..producers {
            let d = dispatcher.clone();
            tasks.push(tokio::spawn(async move {
                for i in 0..per_producer {
                    d.admit_value(json!({ "x": p as f64, "y": i as f64 })).unwrap();
                    tokio::task::yield_now().await;
                }
            }));
        }

        let releaser = {
            let d = dispatcher.clone();
            tokio::spawn(async move {
                let mut released = 0;
                while released < producers * per_producer {
                    match d.report_status("FREE").unwrap() {
                        StatusOutcome::Released(_) => released += 1,
                        _ => tokio::task::yield_now().await,
                    }
                }
                released
            })
        };

        for task in tasks {
            task.await.unwrap();
        }
        let released = timeout(Duration::from_secs(10), releaser)
            .await
            .expect("releaser finished")
            .unwrap();
        assert_eq!(released, producers * per_producer);
        assert_eq!(dispatcher.queue_len().unwrap(), 0);

        drop(dispatcher);

        let mut poses = Vec::new();
        while let Some(pose) = receivers.dequeue.recv().await {
            poses.push(pose);
        }
        assert_eq!(poses.len(), producers * per_producer);

        let mut seen: Vec<(i64, i64)> = poses
            .iter()
            .map(|p| (p.position.x as i64, p.position.y as i64))
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), producers * per_producer);

        let mut audit = Vec::new();
        while let Some(record) = receivers.log.recv().await {
            audit.push(record);
        }
        assert_eq!(audit.len(), 2 * producers * per_producer);
        assert!(audit.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    /// Audit records follow the order of state changes
    #[tokio::test]
    async fn test_e2e_audit_parity_order() {
        let (outbound, mut receivers) = outbound_channels();
        let dispatcher = Dispatcher::new(Default::default(), outbound);

        let script: Vec<(&str, Value)> = vec![
            ("admit", json!({ "x": 1, "y": 1 })),
            ("status", json!("FREE")),
            ("admit", json!({ "x": 2, "y": 2 })),
            ("admit", json!({ "x": 3, "y": 3 })),
            ("status", json!("BUSY")),
            ("status", json!("FREE")),
            ("status", json!("FREE")),
        ];
        for (op, value) in script {
            match op {
                "admit" => {
                    dispatcher.admit_value(value).unwrap();
                }
                _ => {
                    dispatcher.report_status(value.as_str().unwrap()).unwrap();
                }
            }
        }
        drop(dispatcher);

        let mut labels = Vec::new();
        while let Some(record) = receivers.log.recv().await {
            labels.push(record.source_label);
        }
        assert_eq!(
            labels,
            vec!["enqueue", "dequeue", "enqueue", "enqueue", "dequeue", "dequeue"]
        );
    }
}
