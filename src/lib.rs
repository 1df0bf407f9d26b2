/// Daemon configuration: defaults, TOML file and command line
pub mod config;

/// Pen samples and the points they map to on the panel
pub mod event_model;

/// Transports to the digitizer, and the query/read cycle on top of them
pub mod input_devices;

/// The sampling and refresh loops
pub mod runtime;

/// Sensor to panel coordinate mapping
pub mod screen_mapping;

/// Framebuffer, brush, damage tracking and partial refresh
pub mod screen_overlay;

/// Report decoding for the I2C pen digitizer
pub mod tablet_driver;

// Only the pen interface of the controller is handled. The touch interface
// at the neighbouring address speaks a different report format.
