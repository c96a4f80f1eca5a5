//! Joystick discovery through evdev (I/O layer).
//!
//! Supplies the raw device name that the matcher works on.
use std::path::Path;
use std::process::ExitCode;

use evdev::{AbsoluteAxisType, AttributeSetRef, Device, Key};
use log::debug;

use crate::config::AutopadError;

/// Buttons that mark a device as a gamepad or joystick.
const JOYSTICK_BUTTONS: &[Key] = &[Key::BTN_SOUTH, Key::BTN_TRIGGER];

/// A device is joystick-like if it reports an X axis and a gamepad or
/// joystick button.
pub fn is_joystick(
    keys: Option<&AttributeSetRef<Key>>,
    axes: Option<&AttributeSetRef<AbsoluteAxisType>>,
) -> bool {
    let (Some(keys), Some(axes)) = (keys, axes) else {
        return false;
    };
    axes.contains(AbsoluteAxisType::ABS_X) && JOYSTICK_BUTTONS.iter().any(|b| keys.contains(*b))
}

fn is_joystick_device(device: &Device) -> bool {
    is_joystick(device.supported_keys(), device.supported_absolute_axes())
}

/// Read the reported name of the evdev node at `path`.
pub fn device_name(path: &Path) -> Result<String, AutopadError> {
    let device = Device::open(path).map_err(|e| AutopadError::DeviceOpenError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let name = device
        .name()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AutopadError::MissingDeviceName(path.to_path_buf()))?;
    debug!("Device {} reports name '{name}'", path.display());
    Ok(name.to_string())
}

/// List all joystick-like devices.
pub fn list_joystick_devices() -> ExitCode {
    println!("\n=== autopad: Available Joystick Devices ===\n");
    let mut count = 0;

    for (path, device) in evdev::enumerate() {
        if !is_joystick_device(&device) {
            continue;
        }

        count += 1;
        println!(
            "Device {count}:\n\
             \x20 Path:      {}\n\
             \x20 Name:      {}\n\
             \x20 Buttons:   {}\n\
             \x20 Axes:      {}\n",
            path.display(),
            device.name().unwrap_or("unknown"),
            device.supported_keys().map_or(0, |k| k.iter().count()),
            device.supported_absolute_axes().map_or(0, |a| a.iter().count()),
        );
    }

    if count == 0 {
        println!(
            "No joystick devices found.\n\n\
             Troubleshooting:\n\
             \x20 - Check if the controller is connected\n\
             \x20 - Run as root if devices are not visible"
        );
        return ExitCode::FAILURE;
    }

    println!(
        "Found {count} joystick device(s).\n\n\
         Auto-configure one with:\n\
         \x20 autopad --event <Path>"
    );
    ExitCode::SUCCESS
}
