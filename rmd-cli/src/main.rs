//! `rmdctl`: command-line control for RMD series servo motors.
//!
//! Talks to one motor over a serial link. The device is either given with
//! `--port` or found by scanning candidate serial ports for a controller
//! that answers the identification handshake.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rmd_detect::MotorProber;
use rmd_driver::Motor;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rmdctl")]
#[command(about = "Control RMD series servo motors over a serial link", version)]
struct Cli {
    /// Serial device path; scanned for when omitted
    #[arg(long, short = 'p')]
    port: Option<String>,

    /// Motor id on the bus
    #[arg(long, default_value_t = 1)]
    id: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rotate to an absolute angle within one revolution (0–359.99°)
    To {
        degree: f64,
        #[arg(allow_negative_numbers = true)]
        speed: Option<f64>,
    },
    /// Rotate by a relative angle (−360–360°)
    More {
        #[arg(allow_negative_numbers = true)]
        degree: f64,
        #[arg(allow_negative_numbers = true)]
        speed: Option<f64>,
    },
    /// Rotate continuously at a speed (deg/s, sign selects direction)
    Run {
        #[arg(allow_negative_numbers = true)]
        speed: Option<f64>,
    },
    /// Stop the motor, keeping it powered
    Pause,
    /// Resume after a pause
    Resume,
    /// Stop the motor and power the driver section down
    Shutdown,
    /// Print the single-loop angle
    Pose,
    /// Rotate to an absolute multi-loop angle (cumulative from power-on)
    MTo {
        #[arg(allow_negative_numbers = true)]
        degree: f64,
        #[arg(allow_negative_numbers = true)]
        speed: Option<f64>,
    },
    /// Rotate by a relative angle in multi-loop mode
    MMore {
        #[arg(allow_negative_numbers = true)]
        degree: f64,
        #[arg(allow_negative_numbers = true)]
        speed: Option<f64>,
    },
    /// Print the cumulative multi-loop angle
    MPose,
    /// Scan serial ports and report the motor found
    Find,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rmdctl=info,rmd_driver=info,rmd_detect=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let prober = MotorProber::new();

    if let Command::Find = cli.command {
        match prober.find_motor(cli.id)? {
            Some(found) => {
                println!("{}", found.port);
                println!("driver:   {}", found.info.driver_name);
                println!("motor:    {}", found.info.motor_name);
                println!("hardware: {}", found.info.hardware_version);
                println!("firmware: {}", found.info.firmware_version);
            }
            None => bail!("no motor with id {} found", cli.id),
        }
        return Ok(());
    }

    let port = match cli.port {
        Some(port) => port,
        None => match prober.find_motor(cli.id)? {
            Some(found) => {
                info!(port = %found.port, "using discovered motor");
                found.port
            }
            None => bail!("no motor with id {} found; pass --port to skip discovery", cli.id),
        },
    };

    let mut motor =
        Motor::open(&port, cli.id).with_context(|| format!("cannot open motor on {port}"))?;

    match cli.command {
        Command::To { degree, speed } => motor.rotate_to(degree, speed)?,
        Command::More { degree, speed } => motor.rotate_more(degree, speed)?,
        Command::Run { speed } => motor.rotate(speed)?,
        Command::Pause => motor.pause()?,
        Command::Resume => motor.resume()?,
        Command::Shutdown => motor.shutdown()?,
        Command::Pose => println!("{:.2}", motor.current_pose()?),
        Command::MTo { degree, speed } => motor.rotate_multi_to(degree, speed)?,
        Command::MMore { degree, speed } => motor.rotate_multi_more(degree, speed)?,
        Command::MPose => println!("{:.2}", motor.current_multi_pose()?),
        Command::Find => unreachable!("handled above"),
    }

    Ok(())
}
