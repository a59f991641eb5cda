use cursor_integrate::filter::IntegratorSettings;
use cursor_integrate::pipeline::{PipelineHandle, PipelineSettings};
use cursor_integrate::report::{AuxReport, DeviceReport, ProximityReport, TabletReport};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn fast_pipeline() -> PipelineSettings {
    PipelineSettings {
        emission_interval_us: 1000,
        range_timeout_ms: 50,
        channel_capacity: 64,
        stats_interval_secs: 60,
    }
}

fn unit_filter() -> IntegratorSettings {
    IntegratorSettings {
        input_sensitivity: 0.001,
        ..Default::default()
    }
}

async fn next_output(receiver: &mut mpsc::Receiver<DeviceReport>) -> DeviceReport {
    timeout(Duration::from_secs(2), receiver.recv())
        .await
        .expect("timed out waiting for output")
        .expect("output channel closed")
}

// Discards whatever is already queued
fn drain(receiver: &mut mpsc::Receiver<DeviceReport>) -> usize {
    let mut drained = 0;
    while receiver.try_recv().is_ok() {
        drained += 1;
    }
    drained
}

#[tokio::test]
async fn positional_reports_are_emitted_on_ticks() {
    let (report_sender, report_receiver) = mpsc::channel(64);
    let (output_sender, mut output_receiver) = mpsc::channel(1024);
    let pipeline = PipelineHandle::spawn(fast_pipeline(), unit_filter(), report_receiver, output_sender);

    report_sender
        .send(TabletReport::new(1920.0, 540.0, 0).into())
        .await
        .unwrap();

    // velocity (0.001, 0) per tick moves the cursor right of center
    let mut last_x = 960.0;
    for _ in 0..5 {
        let report = next_output(&mut output_receiver).await;
        let position = report.position().expect("tablet report expected");
        assert!(position.x > last_x);
        assert!((position.y - 540.0).abs() < 1e-3);
        last_x = position.x;
    }

    let stats = pipeline.shutdown().await.unwrap();
    assert_eq!(stats.consumed, 1);
    assert!(stats.emitted >= 5);
}

#[tokio::test]
async fn non_positional_reports_pass_through() {
    let (report_sender, report_receiver) = mpsc::channel(64);
    let (output_sender, mut output_receiver) = mpsc::channel(1024);
    let pipeline = PipelineHandle::spawn(fast_pipeline(), unit_filter(), report_receiver, output_sender);

    report_sender.send(AuxReport::new(0b101).into()).await.unwrap();

    match next_output(&mut output_receiver).await {
        DeviceReport::Auxiliary(aux) => assert_eq!(aux.buttons, 0b101),
        other => panic!("expected aux report, got {:?}", other),
    }

    // no positional report yet, nothing else is emitted
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(drain(&mut output_receiver), 0);

    let stats = pipeline.shutdown().await.unwrap();
    assert_eq!(stats.passed_through, 1);
    assert_eq!(stats.emitted, 0);
}

#[tokio::test]
async fn emission_stops_when_reports_stop() {
    let (report_sender, report_receiver) = mpsc::channel(64);
    let (output_sender, mut output_receiver) = mpsc::channel(4096);
    let pipeline = PipelineHandle::spawn(fast_pipeline(), unit_filter(), report_receiver, output_sender);

    report_sender
        .send(TabletReport::new(1000.0, 540.0, 0).into())
        .await
        .unwrap();
    next_output(&mut output_receiver).await;

    // well past the 50ms range timeout
    tokio::time::sleep(Duration::from_millis(200)).await;
    drain(&mut output_receiver);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(drain(&mut output_receiver), 0);

    // a fresh report brings the device back in range
    report_sender
        .send(TabletReport::new(1000.0, 540.0, 0).into())
        .await
        .unwrap();
    assert!(next_output(&mut output_receiver).await.is_positional());

    pipeline.shutdown().await.unwrap();
}

#[tokio::test]
async fn proximity_far_halts_emission() {
    let (report_sender, report_receiver) = mpsc::channel(64);
    let (output_sender, mut output_receiver) = mpsc::channel(4096);
    let settings = PipelineSettings {
        range_timeout_ms: 10_000,
        ..fast_pipeline()
    };
    let pipeline = PipelineHandle::spawn(settings, unit_filter(), report_receiver, output_sender);

    report_sender
        .send(TabletReport::new(1000.0, 540.0, 0).into())
        .await
        .unwrap();
    next_output(&mut output_receiver).await;

    report_sender.send(ProximityReport::new(false).into()).await.unwrap();

    // the proximity report itself is forwarded, then emission stops
    let mut saw_proximity = false;
    while !saw_proximity {
        saw_proximity = next_output(&mut output_receiver).await.proximity() == Some(false);
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(drain(&mut output_receiver), 0);

    pipeline.shutdown().await.unwrap();
}

#[tokio::test]
async fn settings_update_reaches_running_filter() {
    let (report_sender, report_receiver) = mpsc::channel(64);
    let (output_sender, mut output_receiver) = mpsc::channel(4096);
    let settings = PipelineSettings {
        range_timeout_ms: 10_000,
        ..fast_pipeline()
    };
    let pipeline = PipelineHandle::spawn(settings, unit_filter(), report_receiver, output_sender);

    report_sender
        .send(TabletReport::new(1920.0, 540.0, 0).into())
        .await
        .unwrap();
    next_output(&mut output_receiver).await;

    // zero output sensitivity pins every emission to the screen center
    pipeline
        .update_settings(IntegratorSettings {
            output_sensitivity: 0.0,
            ..unit_filter()
        })
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    drain(&mut output_receiver);

    let position = next_output(&mut output_receiver).await.position().unwrap();
    assert!((position.x - 960.0).abs() < 1e-3);
    assert!((position.y - 540.0).abs() < 1e-3);

    pipeline.shutdown().await.unwrap();
}

#[tokio::test]
async fn pipeline_ends_when_input_closes() {
    let (report_sender, report_receiver) = mpsc::channel(64);
    let (output_sender, _output_receiver) = mpsc::channel(4096);
    let pipeline = PipelineHandle::spawn(fast_pipeline(), unit_filter(), report_receiver, output_sender);

    report_sender
        .send(TabletReport::new(100.0, 100.0, 0).into())
        .await
        .unwrap();
    drop(report_sender);

    let stats = timeout(Duration::from_secs(2), pipeline.join())
        .await
        .expect("pipeline did not stop")
        .unwrap();
    assert_eq!(stats.consumed, 1);
}

#[tokio::test]
async fn dropped_downstream_is_an_error() {
    let (report_sender, report_receiver) = mpsc::channel(64);
    let (output_sender, output_receiver) = mpsc::channel(4);
    let pipeline = PipelineHandle::spawn(fast_pipeline(), unit_filter(), report_receiver, output_sender);
    drop(output_receiver);

    report_sender
        .send(TabletReport::new(100.0, 100.0, 0).into())
        .await
        .unwrap();

    let result = timeout(Duration::from_secs(2), pipeline.join())
        .await
        .expect("pipeline did not stop");
    assert!(result.is_err());
}
