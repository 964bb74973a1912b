//! NZXT Kraken Control Library
//!
//! Monitoring and cooling control for NZXT Kraken liquid coolers.
//!
//! # Features
//!
//! - Decode device telemetry into one canonical [`Status`] per device family
//! - Apply fixed duties and temperature/duty curves to the fan and pump
//! - Query and set lighting modes
//! - Persist named speed profiles and user settings
//!
//! # Example
//!
//! ```no_run
//! use nzxt_kraken_control::driver::HidProvider;
//! use nzxt_kraken_control::{Channel, KrakenRepository};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repository = KrakenRepository::new(HidProvider);
//!
//!     if let Some(status) = repository.get_status()? {
//!         println!("{}", status);
//!     }
//!
//!     // A single point sets a fixed duty
//!     repository.set_speed_profile(Channel::Fan, &[(20, 50)])?;
//!     repository.set_speed_profile(Channel::Pump, &[(20, 40), (40, 70), (60, 100)])?;
//!
//!     repository.cleanup();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cooling;
pub mod device;
pub mod driver;
pub mod error;
pub mod monitor;
pub mod protocol;
pub mod repository;
pub mod storage;
pub mod utils;

// Re-exports for convenience
pub use cooling::Channel;
pub use device::{DeviceFamily, Status};
pub use error::{KrakenError, Result};
pub use repository::KrakenRepository;
