//! Tests for `autopad::devices` - the joystick capability check.
//!
//! Device enumeration needs hardware and is not covered here.
use evdev::{AbsoluteAxisType, AttributeSet, Key};

use autopad::devices::is_joystick;

fn keys(list: &[Key]) -> AttributeSet<Key> {
    let mut set = AttributeSet::new();
    for key in list {
        set.insert(*key);
    }
    set
}

fn axes(list: &[AbsoluteAxisType]) -> AttributeSet<AbsoluteAxisType> {
    let mut set = AttributeSet::new();
    for axis in list {
        set.insert(*axis);
    }
    set
}

#[test]
fn test_gamepad_is_joystick() {
    let k = keys(&[Key::BTN_SOUTH, Key::BTN_EAST]);
    let a = axes(&[AbsoluteAxisType::ABS_X, AbsoluteAxisType::ABS_Y]);
    assert!(is_joystick(Some(&*k), Some(&*a)));
}

#[test]
fn test_flight_stick_is_joystick() {
    let k = keys(&[Key::BTN_TRIGGER]);
    let a = axes(&[AbsoluteAxisType::ABS_X]);
    assert!(is_joystick(Some(&*k), Some(&*a)));
}

#[test]
fn test_touchpad_is_not_joystick() {
    let k = keys(&[Key::BTN_TOUCH, Key::BTN_LEFT]);
    let a = axes(&[AbsoluteAxisType::ABS_X, AbsoluteAxisType::ABS_Y]);
    assert!(!is_joystick(Some(&*k), Some(&*a)));
}

#[test]
fn test_buttons_without_axes() {
    let k = keys(&[Key::BTN_SOUTH]);
    let a = axes(&[AbsoluteAxisType::ABS_WHEEL]);
    assert!(!is_joystick(Some(&*k), Some(&*a)));
    assert!(!is_joystick(Some(&*k), None));
}

#[test]
fn test_no_capabilities() {
    assert!(!is_joystick(None, None));
}
