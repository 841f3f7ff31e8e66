//! VCOM and power rail commands

use super::CommandResult;
use crate::devices::DeviceChannel;
use it8951_core::pmic::{self, PmicState};

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn print_state(state: &PmicState, show_power: bool) {
    println!("vcom {} mV (set: {})", state.vcom, yes_no(state.vcom_set));
    if show_power {
        println!(
            "power {} (set: {})",
            if state.power_on { "on" } else { "off" },
            yes_no(state.power_set)
        );
    }
}

/// Read VCOM, or set it first when a value is given
pub fn run_vcom(chan: &mut DeviceChannel, vcom: Option<u16>) -> CommandResult {
    let state = pmic::control(chan, vcom, None)?;
    print_state(&state, false);
    Ok(())
}

/// Switch the panel power rail on or off
pub fn run_power(chan: &mut DeviceChannel, on: bool) -> CommandResult {
    let state = pmic::control(chan, None, Some(on))?;
    print_state(&state, true);
    Ok(())
}
