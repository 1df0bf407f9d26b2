use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::screen_overlay::paint::MAX_RADIUS;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DebugMode {
    #[default]
    Off,
    /// Log pen x, y and hover height for every sample.
    PrintSamples,
}

/// Everything the daemon needs to know about the attached panel and digitizer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub display_width: u32,
    pub display_height: u32,
    pub x_scale: f64,
    pub y_scale: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    /// Sensor height at or below which the pen counts as drawing.
    pub touchdown_height: i32,
    pub transpose_xy: bool,
    pub flip_x: bool,
    pub flip_y: bool,
    pub debug_mode: DebugMode,
    /// Bus name such as `i2c-1`, or an absolute device path.
    pub i2c_bus: String,
    pub i2c_address: u16,
    /// Delay between two digitizer reads.
    pub sample_delay_ms: u64,
    /// Period of the display refresh loop. 0 refreshes as soon as damage appears.
    pub refresh_period_ms: u64,
    pub brush_radius: u32,
    pub refresh_mode: u16,
    pub refresh_hold: bool,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            display_width: 1872,
            display_height: 1404,
            x_scale: 0.0921659,
            y_scale: 0.06912442,
            x_offset: 0.0,
            y_offset: 0.0,
            touchdown_height: 5,
            transpose_xy: false,
            flip_x: false,
            flip_y: false,
            debug_mode: DebugMode::Off,
            i2c_bus: "i2c-1".to_string(),
            i2c_address: 9,
            sample_delay_ms: 0,
            refresh_period_ms: 100,
            brush_radius: 20,
            refresh_mode: 6,
            refresh_hold: false,
        }
    }
}

impl DeviceInfo {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Device node for the digitizer bus. Bare bus names live under `/dev`.
    pub fn i2c_device_path(&self) -> PathBuf {
        let bus = Path::new(&self.i2c_bus);
        if bus.is_absolute() {
            bus.to_path_buf()
        } else {
            Path::new("/dev").join(bus)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.display_width == 0 || self.display_height == 0 {
            return Err(invalid("display size", "width and height must be non-zero"));
        }
        if self.display_width > u32::from(u16::MAX) || self.display_height > u32::from(u16::MAX) {
            return Err(invalid("display size", "must fit in 16 bits"));
        }
        if self.display_width % 8 != 0 {
            return Err(invalid(
                "display_width",
                format!("{} is not a whole number of bytes per row", self.display_width),
            ));
        }
        for (field, value) in [
            ("x_scale", self.x_scale),
            ("y_scale", self.y_scale),
            ("x_offset", self.x_offset),
            ("y_offset", self.y_offset),
        ] {
            if !value.is_finite() {
                return Err(invalid(field, format!("{value} is not a finite number")));
            }
        }
        if !(0..=255).contains(&self.touchdown_height) {
            return Err(invalid(
                "touchdown_height",
                format!("{} is outside 0..=255", self.touchdown_height),
            ));
        }
        if self.i2c_address > 0x7F {
            return Err(invalid(
                "i2c_address",
                format!("{:#x} is not a 7-bit address", self.i2c_address),
            ));
        }
        if self.i2c_bus.trim().is_empty() {
            return Err(invalid("i2c_bus", "must not be empty"));
        }
        if self.brush_radius == 0 {
            return Err(invalid("brush_radius", "must be non-zero"));
        }
        let panel = self.display_width.max(self.display_height);
        if self.brush_radius > panel.min(MAX_RADIUS) {
            return Err(invalid(
                "brush_radius",
                format!(
                    "{} exceeds the panel size ({panel}) or the brush limit ({MAX_RADIUS})",
                    self.brush_radius
                ),
            ));
        }
        Ok(())
    }
}

/// Draw on an e-paper panel with an I2C pen digitizer.
///
/// Example for a WEZ01 sensor on a 1920x1080 panel:
/// `epd-tabletd --x-scale 0.0921659 --y-scale 0.06912442 --transpose-xy true
/// --flip-y true --touchdown-height 5 --i2c-bus i2c-1 --sample-delay-ms 0`
#[derive(Debug, Default, Parser)]
#[command(version, about)]
pub struct Cli {
    /// TOML file with defaults; flags given on the command line win.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// More log output; repeat for packet dumps.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    /// Display width / usable sensor width.
    #[arg(long, allow_negative_numbers = true)]
    pub x_scale: Option<f64>,
    /// Display height / usable sensor height.
    #[arg(long, allow_negative_numbers = true)]
    pub y_scale: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub x_offset: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub y_offset: Option<f64>,
    /// Height (0-255, sensor units) below which the pen draws.
    #[arg(long)]
    pub touchdown_height: Option<i32>,
    /// Swap sensor X and Y after flipping.
    #[arg(long)]
    pub transpose_xy: Option<bool>,
    /// Mirror the sensor X axis.
    #[arg(long)]
    pub flip_x: Option<bool>,
    /// Mirror the sensor Y axis.
    #[arg(long)]
    pub flip_y: Option<bool>,
    #[arg(long, value_enum)]
    pub debug_mode: Option<DebugMode>,
    /// i2c-1, i2c-4, ... or a full device path.
    #[arg(long)]
    pub i2c_bus: Option<String>,
    #[arg(long, value_parser = parse_address)]
    pub i2c_address: Option<u16>,
    /// Delay between digitizer reads, in milliseconds.
    #[arg(long)]
    pub sample_delay_ms: Option<u64>,
    /// Display refresh period in milliseconds; 0 refreshes on every stroke.
    #[arg(long)]
    pub refresh_period_ms: Option<u64>,
    #[arg(long)]
    pub brush_radius: Option<u32>,
    /// Waveform mode number handed to the panel driver.
    #[arg(long)]
    pub refresh_mode: Option<u16>,
    #[arg(long)]
    pub refresh_hold: Option<bool>,
}

fn parse_address(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("{s}: {e}"))
}

impl Cli {
    /// Defaults, then the TOML file, then flags. The result is validated.
    pub fn resolve(&self) -> Result<DeviceInfo, ConfigError> {
        let mut info = match &self.config {
            Some(path) => DeviceInfo::from_toml_file(path)?,
            None => DeviceInfo::default(),
        };

        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = &self.$field {
                    info.$field = v.clone();
                })*
            };
        }
        apply!(
            display_width,
            display_height,
            x_scale,
            y_scale,
            x_offset,
            y_offset,
            touchdown_height,
            transpose_xy,
            flip_x,
            flip_y,
            debug_mode,
            i2c_bus,
            i2c_address,
            sample_delay_ms,
            refresh_period_ms,
            brush_radius,
            refresh_mode,
            refresh_hold,
        );

        info.validate()?;
        Ok(info)
    }
}
