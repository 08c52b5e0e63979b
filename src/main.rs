use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use servo_car_runtime::config::{
    duration_from_ms, CarConfig, DEFAULT_CUSTOM_POWER, DEFAULT_DURATION_MS, STANDARD_POWER,
};
use servo_car_runtime::messages::CarDirection;
use servo_car_runtime::motor::{LogPins, MotionConfig, MotionController, PinOutput, SerialBridge};
use servo_car_runtime::runtime::Runtime;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Drive a two-wheel servo car
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// JSON config file (pins, wheel speeds, serial port)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Serial port of the pin bridge; overrides the config file. Without a port the car is simulated.
    #[arg(short, long, global = true)]
    port: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive forwards for a duration
    Forward(TimedArgs),
    /// Drive backwards for a duration
    Backward(TimedArgs),
    /// Spin left in place for a duration
    Left(TimedArgs),
    /// Spin right in place for a duration
    Right(TimedArgs),
    /// Run in a direction until interrupted (Ctrl+C stops)
    Continuous {
        #[arg(value_enum)]
        direction: CarDirection,
    },
    /// Release both wheels
    Stop,
    /// Execute JSON-lines commands from a file, or stdin when omitted
    Script { file: Option<PathBuf> },
}

#[derive(clap::Args, Debug)]
struct TimedArgs {
    /// Duration in milliseconds (negative runs for zero time)
    #[arg(short, long, default_value_t = DEFAULT_DURATION_MS, allow_negative_numbers = true)]
    duration: i64,

    /// Power adjustment, 0 to 200 (100 = standard)
    #[arg(long, default_value_t = STANDARD_POWER)]
    power: f64,

    /// Use the custom drive default power
    #[arg(long, conflicts_with = "power")]
    custom: bool,
}

impl TimedArgs {
    fn power(&self) -> f64 {
        if self.custom {
            DEFAULT_CUSTOM_POWER
        } else {
            self.power
        }
    }
}

fn open_pins(cfg: &CarConfig) -> Result<Box<dyn PinOutput + Send>, BoxError> {
    match &cfg.port {
        Some(port) => Ok(Box::new(SerialBridge::open_with_baudrate(port, cfg.baud_rate)?)),
        None => {
            info!("No serial port configured, simulating pin output");
            Ok(Box::new(LogPins))
        }
    }
}

async fn run(cli: Cli) -> Result<(), BoxError> {
    let mut cfg = match &cli.config {
        Some(path) => CarConfig::load(path)?,
        None => CarConfig::default(),
    };
    if cli.port.is_some() {
        cfg.port = cli.port.clone();
    }

    let pins = open_pins(&cfg)?;
    let mut car = MotionController::with_config(pins, MotionConfig::from(&cfg));

    match cli.command {
        Command::Forward(args) => {
            car.drive_for(CarDirection::Forward, duration_from_ms(args.duration), args.power())
                .await
        }
        Command::Backward(args) => {
            car.drive_for(CarDirection::Backward, duration_from_ms(args.duration), args.power())
                .await
        }
        Command::Left(args) => {
            car.drive_for(CarDirection::TurnLeft, duration_from_ms(args.duration), args.power())
                .await
        }
        Command::Right(args) => {
            car.drive_for(CarDirection::TurnRight, duration_from_ms(args.duration), args.power())
                .await
        }
        Command::Continuous { direction } => {
            car.continuous_run(Some(direction));
            info!("Running {:?}, press Ctrl+C to stop", direction);
            tokio::signal::ctrl_c().await?;
            car.stop();
        }
        Command::Stop => car.stop(),
        Command::Script { file } => {
            let mut runtime = Runtime::new(car);
            let summary = match file {
                Some(path) => {
                    let file = tokio::fs::File::open(&path).await?;
                    runtime.run(BufReader::new(file)).await?
                }
                None => runtime.run(BufReader::new(tokio::io::stdin())).await?,
            };
            info!(
                "Script finished: {} executed, {} skipped",
                summary.executed, summary.skipped
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
