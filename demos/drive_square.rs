// Drive square: forward, turn right, four times over
//
// Usage: cargo run --example drive_square -- [port]
// Without a port the pin writes are only logged (RUST_LOG=debug shows them).
//
// Put the car on the floor with some room around it; each side takes one second.

use std::time::Duration;

use servo_car_runtime::motor::{LogPins, MotionController, PinOutput, SerialBridge};

// Time for a roughly 90 degree spin at standard power
const QUARTER_TURN: Duration = Duration::from_millis(600);
const SIDE: Duration = Duration::from_millis(1000);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let pins: Box<dyn PinOutput + Send> = match std::env::args().nth(1) {
        Some(port) => Box::new(SerialBridge::open(&port)?),
        None => {
            println!("No port given, simulating");
            Box::new(LogPins)
        }
    };

    let mut car = MotionController::new(pins);
    for side in 1..=4 {
        println!("Side {}", side);
        car.drive_forward(SIDE).await;
        car.turn_right_for(QUARTER_TURN).await;
    }
    println!("Done");
    Ok(())
}
