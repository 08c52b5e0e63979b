use std::sync::{Arc, Mutex};
use std::time::Duration;

use servo_car_runtime::messages::CarDirection;
use servo_car_runtime::motor::{
    Delay, MotionConfig, MotionController, PinId, PinWrite, RecordingPins,
};
use servo_car_runtime::runtime::Runtime;

fn pulse(pin: PinId, micros: i32) -> PinWrite {
    PinWrite::Pulse { pin, micros }
}

fn off(pin: PinId) -> PinWrite {
    PinWrite::Digital { pin, level: 0 }
}

/// Delay that only records what it was asked for
#[derive(Clone, Default)]
struct CountingDelay {
    pauses: Arc<Mutex<Vec<Duration>>>,
}

impl Delay for CountingDelay {
    fn pause(&mut self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        self.pauses.lock().unwrap().push(duration);
        std::future::ready(())
    }
}

#[tokio::test(start_paused = true)]
async fn timed_drive_stops_after_duration() {
    let mut car = MotionController::new(RecordingPins::new());
    let start = tokio::time::Instant::now();
    car.drive_forward(Duration::from_millis(1000)).await;

    let pins = car.release();
    let writes = pins.timed_writes();
    assert_eq!(writes.len(), 4);

    let (l, r) = (PinId::P1, PinId::P2);
    assert_eq!(writes[0].1, pulse(l, 1680));
    assert_eq!(writes[1].1, pulse(r, 1320));
    assert_eq!(writes[2].1, off(l));
    assert_eq!(writes[3].1, off(r));

    assert_eq!(writes[1].0 - start, Duration::ZERO);
    assert_eq!(writes[2].0 - start, Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn every_timed_variant_ends_in_stop() {
    let (l, r) = (PinId::P1, PinId::P2);
    let d = Duration::from_millis(250);

    let cases: Vec<(&str, [i32; 2])> = vec![
        ("drive_forward", [1680, 1320]),
        ("drive_backward", [1320, 1680]),
        ("turn_right_for", [1680, 1680]),
        ("turn_left_for", [1320, 1320]),
        ("custom_forward", [1644, 1356]),
        ("custom_backward", [1356, 1644]),
        ("custom_right", [1644, 1644]),
        ("custom_left", [1356, 1356]),
    ];

    for (name, [left, right]) in cases {
        let mut car = MotionController::new(RecordingPins::new());
        match name {
            "drive_forward" => car.drive_forward(d).await,
            "drive_backward" => car.drive_backward(d).await,
            "turn_right_for" => car.turn_right_for(d).await,
            "turn_left_for" => car.turn_left_for(d).await,
            // 80% power: 9 * 20 * 0.8 = 144
            "custom_forward" => car.custom_forward(d, 80.0).await,
            "custom_backward" => car.custom_backward(d, 80.0).await,
            "custom_right" => car.custom_right(d, 80.0).await,
            "custom_left" => car.custom_left(d, 80.0).await,
            _ => unreachable!(),
        }
        assert_eq!(
            car.release().writes(),
            vec![pulse(l, left), pulse(r, right), off(l), off(r)],
            "{}",
            name
        );
    }
}

#[tokio::test(start_paused = true)]
async fn dropped_timed_drive_still_stops() {
    let mut pins = RecordingPins::new();
    {
        let mut car = MotionController::new(&mut pins);
        let drive = car.drive_for(CarDirection::TurnLeft, Duration::from_secs(10), 100.0);
        let timed_out = tokio::time::timeout(Duration::from_millis(300), drive).await;
        assert!(timed_out.is_err());
    }

    let (l, r) = (PinId::P1, PinId::P2);
    assert_eq!(
        pins.writes(),
        vec![pulse(l, 1320), pulse(r, 1320), off(l), off(r)]
    );
    assert_eq!(pins.last_write(l), Some(off(l)));
}

#[tokio::test]
async fn custom_delay_receives_duration() {
    let delay = CountingDelay::default();
    let mut car =
        MotionController::with_delay(RecordingPins::new(), delay.clone(), MotionConfig::default());
    car.custom_left(Duration::from_millis(500), 200.0).await;
    car.drive_backward(Duration::ZERO).await;

    // 9 * 20 * 2 = 360
    let writes = car.release().writes();
    assert_eq!(writes[0], pulse(PinId::P1, 1140));
    assert_eq!(writes[1], pulse(PinId::P2, 1140));
    assert_eq!(writes.len(), 8);
    assert_eq!(
        *delay.pauses.lock().unwrap(),
        vec![Duration::from_millis(500), Duration::ZERO]
    );
}

#[tokio::test(start_paused = true)]
async fn script_runs_commands_in_order() {
    let script = r#"
{"cmd":"set_wheel_pins","left":0,"right":8}
{"cmd":"drive","direction":"forward","duration_ms":500}
{"cmd":"continuous","direction":"turn_right"}
{"cmd":"continuous","direction":42}
"#;
    let start = tokio::time::Instant::now();
    let mut rt = Runtime::new(MotionController::new(RecordingPins::new()));
    let summary = rt.run(script.as_bytes()).await.unwrap();
    assert_eq!(summary.executed, 4);
    assert_eq!(summary.skipped, 0);

    let (l, r) = (PinId(0), PinId(8));
    let pins = rt.into_controller().release();
    assert_eq!(
        pins.writes(),
        vec![
            pulse(l, 1680),
            pulse(r, 1320),
            off(l),
            off(r),
            pulse(l, 1680),
            pulse(r, 1680),
            off(l),
            off(r),
            // end of stream
            off(l),
            off(r),
        ]
    );
    assert_eq!(pins.timed_writes()[2].0 - start, Duration::from_millis(500));
}
