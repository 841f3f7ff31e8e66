//! PMIC control: VCOM voltage and power rail

use log::{debug, info};
use zerocopy::IntoBytes;

use crate::channel::Channel;
use crate::error::Result;
use crate::protocol::args::PmicResponse;
use crate::protocol::{hex_dump, Command};
use crate::transport::{DataPhase, Transport};

/// PMIC registers reported back after a control command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PmicState {
    /// VCOM in millivolts
    pub vcom: u16,
    /// Controller acknowledged a VCOM change
    pub vcom_set: bool,
    /// Controller acknowledged a power change
    pub power_set: bool,
    /// Power rail is on
    pub power_on: bool,
}

impl From<&PmicResponse> for PmicState {
    fn from(resp: &PmicResponse) -> Self {
        Self {
            vcom: resp.vcom.get(),
            vcom_set: resp.set_vcom != 0,
            power_set: resp.set_pwr != 0,
            power_on: resp.pwr != 0,
        }
    }
}

/// Optionally set VCOM and the power rail, and read the PMIC state back
///
/// With both arguments `None` this is a plain query.
pub fn control<T: Transport>(
    chan: &mut Channel<T>,
    vcom: Option<u16>,
    power: Option<bool>,
) -> Result<PmicState> {
    if let Some(vcom) = vcom {
        info!("Setting VCOM to {} mV", vcom);
    }
    if let Some(power) = power {
        info!("Turning power {}", if power { "on" } else { "off" });
    }

    let mut resp = PmicResponse::default();
    chan.submit(
        &Command::pmic(vcom, power),
        DataPhase::FromDevice(resp.as_mut_bytes()),
    )?;
    debug!("PMIC response: {}", hex_dump(resp.as_bytes()));

    Ok(PmicState::from(&resp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::tests::MockTransport;
    use crate::protocol::opcodes;
    use zerocopy::FromBytes;

    #[test]
    fn test_state_from_response() {
        let raw = [0x07, 0xD0, 1, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let state = PmicState::from(PmicResponse::ref_from_bytes(&raw).unwrap());
        assert_eq!(
            state,
            PmicState {
                vcom: 2000,
                vcom_set: true,
                power_set: false,
                power_on: true,
            }
        );
        assert!(PmicResponse::ref_from_bytes(&raw[..8]).is_err());
    }

    #[test]
    fn test_control_descriptor() {
        let mut chan = Channel::open(MockTransport::new(800, 600)).unwrap();
        control(&mut chan, Some(1500), Some(false)).unwrap();

        let transport = chan.into_inner();
        assert_eq!(transport.opcodes(), vec![opcodes::PMIC_CTRL]);
        let cdb = transport.log[1].0;
        assert_eq!(&cdb[7..12], &[0x05, 0xDC, 1, 1, 0]);
    }
}
