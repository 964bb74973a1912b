//! NZXT Kraken Control CLI
//!
//! Command-line interface for monitoring and controlling NZXT Kraken coolers.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use nzxt_kraken_control::config::SUPPORTED_MODELS;
use nzxt_kraken_control::cooling::fill_missing_duties;
use nzxt_kraken_control::device::{LightingChannel, LightingRequest};
use nzxt_kraken_control::driver::{DriverProvider, HidProvider};
use nzxt_kraken_control::monitor::{PollEvent, Poller};
use nzxt_kraken_control::storage::{ProfileStore, Settings};
use nzxt_kraken_control::utils::parsing::{
    parse_channel, parse_curve_points, parse_hex_color, parse_lighting_channel,
    parse_lighting_direction, parse_lighting_speed,
};
use nzxt_kraken_control::{Channel, KrakenError, KrakenRepository};

const UDEV_HINT: &str = "The current user probably lacks permission to access the device.\n\
    Add a udev rule such as\n\n    \
    SUBSYSTEM==\"hidraw\", ATTRS{idVendor}==\"1e71\", TAG+=\"uaccess\"\n\n\
    to /etc/udev/rules.d/60-nzxt-kraken.rules, then reload the rules and replug the cooler.";

const LEGACY_FIRMWARE_HINT: &str = "⚠️  Firmware 2.x does not support speed profiles. \
    Update the cooler firmware to use them.";

// =============================================================================
// CLI Arguments
// =============================================================================

/// NZXT Kraken Control Tool
#[derive(Parser, Debug)]
#[command(name = "nzxt-kraken-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Profile store location (default: user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show current device status
    Status,

    /// Continuously monitor device status
    Monitor {
        /// Update interval in seconds (default: stored refresh interval)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// List connected supported devices
    List,

    /// List stored speed profiles
    Profiles {
        /// Only show profiles of this channel: fan or pump
        channel: Option<String>,
    },

    /// Apply a stored speed profile and remember it as current
    Apply {
        /// Channel: fan or pump
        channel: String,

        /// Profile id (see `profiles`)
        id: u32,
    },

    /// Set a fixed duty and store it in the channel's Fixed profile
    SetFixed {
        /// Channel: fan or pump
        channel: String,

        /// Duty cycle percentage
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        duty: u8,
    },

    /// Apply an ad-hoc speed curve without storing it
    SetCurve {
        /// Channel: fan or pump
        channel: String,

        /// Curve points as TEMP:DUTY pairs, e.g. 20:30,40:60,60:100
        points: String,
    },

    /// Store a new speed profile
    CreateProfile {
        /// Channel: fan or pump
        channel: String,

        /// Profile name
        name: String,

        /// Curve points as TEMP:DUTY pairs, e.g. 20:30,40:60,60:100
        points: String,
    },

    /// Delete a stored speed profile
    DeleteProfile {
        /// Profile id (see `profiles`)
        id: u32,
    },

    /// List the lighting modes of the connected device
    LightingModes,

    /// Set a lighting mode
    SetLighting {
        /// Lighting channel: logo or ring
        channel: String,

        /// Mode id (see `lighting-modes`)
        mode: u8,

        /// Color as RRGGBB, repeat for multi-color modes
        #[arg(short, long = "color")]
        colors: Vec<String>,

        /// Animation speed: slowest, slower, normal, faster, fastest
        #[arg(short, long)]
        speed: Option<String>,

        /// Animation direction: forward or backward
        #[arg(short, long)]
        direction: Option<String>,
    },

    /// Show or change settings
    Settings {
        /// Seconds between two status polls
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        refresh_interval: Option<u64>,

        /// Re-apply the current profiles when monitoring starts
        #[arg(long)]
        load_last_profile: Option<bool>,
    },
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.config;
    match args.command {
        Command::Status => cmd_status(),
        Command::Monitor { interval } => cmd_monitor(config, interval),
        Command::List => cmd_list(),
        Command::Profiles { channel } => cmd_profiles(config, channel.as_deref()),
        Command::Apply { channel, id } => cmd_apply(config, &channel, id),
        Command::SetFixed { channel, duty } => cmd_set_fixed(config, &channel, duty),
        Command::SetCurve { channel, points } => cmd_set_curve(&channel, &points),
        Command::CreateProfile {
            channel,
            name,
            points,
        } => cmd_create_profile(config, &channel, &name, &points),
        Command::DeleteProfile { id } => cmd_delete_profile(config, id),
        Command::LightingModes => cmd_lighting_modes(),
        Command::SetLighting {
            channel,
            mode,
            colors,
            speed,
            direction,
        } => cmd_set_lighting(&channel, mode, &colors, speed.as_deref(), direction.as_deref()),
        Command::Settings {
            refresh_interval,
            load_last_profile,
        } => cmd_settings(config, refresh_interval, load_last_profile),
    }
}

/// `RUST_LOG` wins; otherwise `--verbose` selects debug output.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Helpers
// =============================================================================

fn open_store(config: Option<PathBuf>) -> Result<ProfileStore> {
    let store = match config {
        Some(path) => ProfileStore::open(path),
        None => ProfileStore::open_default(),
    };
    store.context("Failed to open profile store")
}

/// Connect to the first supported device.
fn open_repository() -> Result<KrakenRepository> {
    let repository = KrakenRepository::new(HidProvider);

    match repository.connect() {
        Ok(()) => Ok(repository),
        Err(KrakenError::DeviceUnavailable) => bail!(
            "No supported device found. Supported models: {}",
            SUPPORTED_MODELS
        ),
        Err(e) if e.is_communication() => {
            eprintln!("{}", UDEV_HINT);
            Err(e).context("Failed to connect to device")
        }
        Err(e) => Err(e).context("Failed to connect to device"),
    }
}

fn apply_steps(
    repository: &KrakenRepository,
    channel: Channel,
    steps: &[(u8, u8)],
) -> Result<()> {
    repository
        .set_speed_profile(channel, steps)
        .with_context(|| format!("Failed to apply {} profile", channel))
}

// =============================================================================
// Command Implementations
// =============================================================================

fn cmd_status() -> Result<()> {
    let repository = open_repository()?;
    let status = repository.get_status().context("Failed to read status")?;

    match status {
        Some(status) => {
            println!("🧊 {}", status.device_description);
            println!("   Firmware: {}", status.firmware_version);
            println!("   {}", status);
            if status.has_legacy_firmware() {
                println!("{}", LEGACY_FIRMWARE_HINT);
            }
        }
        None => println!("⚠️  The device did not report a usable status."),
    }

    repository.cleanup();
    Ok(())
}

fn cmd_monitor(config: Option<PathBuf>, interval: Option<u64>) -> Result<()> {
    let store = open_store(config)?;
    let repository = Arc::new(open_repository()?);

    if store.settings().load_last_profile {
        // Only restore channels the device reports a speed for
        let status = repository
            .get_status()
            .context("Failed to read status")?;

        for channel in Channel::ALL {
            let Some(profile) = store.current(channel) else {
                continue;
            };
            if status.as_ref().and_then(|s| s.rpm(channel)).is_none() {
                println!("⏭️  Skipping {} profile: channel not reported by the device", channel);
                continue;
            }
            apply_steps(&repository, channel, &profile.steps)?;
            println!("✅ Restored {} profile '{}'", channel, profile.name);
        }
    }

    let interval = interval.unwrap_or(store.settings().refresh_interval_secs).max(1);
    let curves = store.current_curves();

    // Setup Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let (poller, events) = Poller::spawn(repository.clone(), Duration::from_secs(interval))
        .context("Failed to start status polling")?;

    println!("🌡️  Monitoring every {}s (Ctrl+C to stop)...\n", interval);
    let mut legacy_warned = false;

    while running.load(Ordering::SeqCst) {
        let event = match events.recv_timeout(Duration::from_millis(200)) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        match event {
            PollEvent::Status(status) => {
                if !legacy_warned && status.has_legacy_firmware() {
                    legacy_warned = true;
                    println!("{}", LEGACY_FIRMWARE_HINT);
                }
                let status = fill_missing_duties(&status, &curves);
                println!("{}", status);
            }
            PollEvent::NoStatus => println!("⚠️  No usable status"),
            PollEvent::Unavailable => println!("🔌 Waiting for a supported device..."),
            PollEvent::Error(e) if e.is_communication() => {
                eprintln!("❌ {}\n\n{}", e, UDEV_HINT);
                break;
            }
            PollEvent::Error(e) => eprintln!("⚠️  Read error: {}", e),
        }
    }

    poller.stop();
    repository.cleanup();
    println!("\n👋 Monitoring stopped.");
    Ok(())
}

fn cmd_list() -> Result<()> {
    let drivers = HidProvider
        .find_supported()
        .context("Failed to enumerate devices")?;

    if drivers.is_empty() {
        println!("❌ No supported devices found.");
        println!("   Supported models: {}", SUPPORTED_MODELS);
        return Ok(());
    }

    println!("🔍 Found {} device(s):\n", drivers.len());
    for (i, driver) in drivers.iter().enumerate() {
        let (vendor_id, product_id) = driver.usb_id();
        println!("  {}. {}", i + 1, driver.description());
        println!("     USB id: {:04x}:{:04x}", vendor_id, product_id);
    }

    Ok(())
}

fn cmd_profiles(config: Option<PathBuf>, channel: Option<&str>) -> Result<()> {
    let store = open_store(config)?;
    let channels = match channel {
        Some(name) => vec![parse_channel(name)?],
        None => Channel::ALL.to_vec(),
    };

    for channel in channels {
        let current = store.current(channel).map(|p| p.id);
        println!("{} profiles:", channel);

        for profile in store.list(channel) {
            let marker = if current == Some(profile.id) { "👉" } else { "  " };
            let lock = if profile.read_only { " (read-only)" } else { "" };
            let steps: Vec<String> = profile
                .steps
                .iter()
                .map(|(temp, duty)| format!("{}:{}", temp, duty))
                .collect();
            println!(
                "  {} [{:2}] {}{}  {}",
                marker,
                profile.id,
                profile.name,
                lock,
                steps.join(",")
            );
        }
        println!();
    }

    Ok(())
}

fn cmd_apply(config: Option<PathBuf>, channel_str: &str, id: u32) -> Result<()> {
    let channel = parse_channel(channel_str)?;
    let mut store = open_store(config)?;
    let profile = store.get(id)?.clone();

    if profile.channel != channel {
        bail!("Profile {} belongs to the {} channel", id, profile.channel);
    }

    let repository = open_repository()?;
    apply_steps(&repository, channel, &profile.steps)?;
    store
        .set_current(channel, id)
        .context("Failed to remember current profile")?;

    println!("✅ Applied '{}' to {}", profile.name, channel);
    repository.cleanup();
    Ok(())
}

fn cmd_set_fixed(config: Option<PathBuf>, channel_str: &str, duty: u8) -> Result<()> {
    let channel = parse_channel(channel_str)?;
    let duty = channel.validate_duty(duty)?;
    let mut store = open_store(config)?;

    let fixed = store
        .list(channel)
        .into_iter()
        .find(|p| p.single_step)
        .cloned()
        .with_context(|| format!("No Fixed profile stored for {}", channel))?;
    let temperature = fixed.steps.first().map_or(20, |(temp, _)| *temp);
    let steps = vec![(temperature, duty)];

    let repository = open_repository()?;
    apply_steps(&repository, channel, &steps)?;

    store
        .update_steps(fixed.id, steps)
        .context("Failed to update Fixed profile")?;
    store
        .set_current(channel, fixed.id)
        .context("Failed to remember current profile")?;

    println!("✅ {} speed set to {}%", channel, duty);
    repository.cleanup();
    Ok(())
}

fn cmd_set_curve(channel_str: &str, points: &str) -> Result<()> {
    let channel = parse_channel(channel_str)?;
    let points = parse_curve_points(points)?;
    if points.is_empty() {
        bail!("At least one TEMP:DUTY point is required");
    }

    let repository = open_repository()?;
    apply_steps(&repository, channel, &points)?;

    println!("✅ Applied {}-point curve to {}", points.len(), channel);
    repository.cleanup();
    Ok(())
}

fn cmd_create_profile(
    config: Option<PathBuf>,
    channel_str: &str,
    name: &str,
    points: &str,
) -> Result<()> {
    let channel = parse_channel(channel_str)?;
    let points = parse_curve_points(points)?;
    let mut store = open_store(config)?;

    let id = store
        .create(channel, name, points)
        .context("Failed to create profile")?;

    println!("✅ Created {} profile '{}' with id {}", channel, name, id);
    Ok(())
}

fn cmd_delete_profile(config: Option<PathBuf>, id: u32) -> Result<()> {
    let mut store = open_store(config)?;
    store.delete(id).context("Failed to delete profile")?;

    println!("🗑️  Deleted profile {}", id);
    Ok(())
}

fn cmd_lighting_modes() -> Result<()> {
    let repository = open_repository()?;
    let modes = repository
        .get_lighting_modes()
        .context("Failed to query lighting modes")?;

    let Some(modes) = modes.filter(|m| !m.is_empty()) else {
        println!("❌ This device has no configurable lighting.");
        repository.cleanup();
        return Ok(());
    };

    for channel in [LightingChannel::Logo, LightingChannel::Ring] {
        let channel_modes = modes.for_channel(channel);
        if channel_modes.is_empty() {
            continue;
        }

        println!("{} modes:", channel);
        for mode in channel_modes.values() {
            let colors = if mode.min_colors == mode.max_colors {
                format!("{}", mode.max_colors)
            } else {
                format!("{}-{}", mode.min_colors, mode.max_colors)
            };
            let mut extras = Vec::new();
            if mode.speed_enabled {
                extras.push("speed");
            }
            if mode.direction_enabled {
                extras.push("direction");
            }
            println!(
                "  [{:2}] {:<22} colors: {:<5} {}",
                mode.mode_id,
                mode.display_name,
                colors,
                extras.join(", ")
            );
        }
        println!();
    }

    repository.cleanup();
    Ok(())
}

fn cmd_set_lighting(
    channel_str: &str,
    mode_id: u8,
    colors: &[String],
    speed: Option<&str>,
    direction: Option<&str>,
) -> Result<()> {
    let channel = parse_lighting_channel(channel_str)?;
    let colors = colors
        .iter()
        .map(|hex| parse_hex_color(hex))
        .collect::<nzxt_kraken_control::Result<Vec<_>>>()?;

    let mut request = LightingRequest::new(channel, mode_id).with_colors(colors);
    if let Some(speed) = speed {
        request = request.with_speed(parse_lighting_speed(speed)?);
    }
    if let Some(direction) = direction {
        request = request.with_direction(parse_lighting_direction(direction)?);
    }

    let repository = open_repository()?;
    repository
        .set_lighting(&request)
        .context("Failed to set lighting")?;

    println!("✅ {} lighting set to mode {}", channel, mode_id);
    repository.cleanup();
    Ok(())
}

fn cmd_settings(
    config: Option<PathBuf>,
    refresh_interval: Option<u64>,
    load_last_profile: Option<bool>,
) -> Result<()> {
    let mut store = open_store(config)?;

    if refresh_interval.is_some() || load_last_profile.is_some() {
        let current = store.settings();
        let settings = Settings {
            refresh_interval_secs: refresh_interval.unwrap_or(current.refresh_interval_secs),
            load_last_profile: load_last_profile.unwrap_or(current.load_last_profile),
        };
        store
            .update_settings(settings)
            .context("Failed to save settings")?;
        println!("✅ Settings saved");
    }

    let settings = store.settings();
    println!("⚙️  Settings ({})", store.path().display());
    println!("   Refresh interval:  {}s", settings.refresh_interval_secs);
    println!("   Load last profile: {}", settings.load_last_profile);
    Ok(())
}
