//! Bridge driver: H-bridge commands on top of the channel model.

use tracing::trace;
use turtle_common::error::PortError;
use turtle_common::io::bridge::{BridgeCommand, BridgePair};
use turtle_common::io::register::PortRegister;

/// Drive `pair` into the state dictated by `command`.
///
/// Issues exactly two channel writes, first channel then second, back to
/// back with no port read in between. Every pair, C included, only ever
/// touches its own two channels.
pub fn apply_bridge(
    register: &mut PortRegister,
    pair: BridgePair,
    command: BridgeCommand,
) -> Result<(), PortError> {
    let (first, second) = pair.channels();
    let (first_level, second_level) = command.levels();
    register.drive(first, first_level)?;
    register.drive(second, second_level)?;
    trace!("Bridge {} -> {}", pair, command);
    Ok(())
}

/// Parse textual pair/command tokens and apply them.
///
/// # Errors
/// `PortError::InvalidBridgeArgs` for an unknown token; the register is
/// left untouched in that case.
pub fn apply_bridge_tokens(
    register: &mut PortRegister,
    pair: &str,
    command: &str,
) -> Result<(), PortError> {
    let pair: BridgePair = pair.parse()?;
    let command: BridgeCommand = command.parse()?;
    apply_bridge(register, pair, command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sim_register;

    #[test]
    fn every_pair_and_command_matches_table() {
        for background in [0x00u8, 0x3F, 0x15, 0x2A] {
            for pair in BridgePair::ALL {
                for command in BridgeCommand::ALL {
                    let (mut reg, _probe) = sim_register(&[0xC0]);
                    reg.write(0x3F, background).unwrap();

                    apply_bridge(&mut reg, pair, command).unwrap();

                    let value = reg.read_all().unwrap();
                    let (first, second) = pair.channels();
                    let (first_level, second_level) = command.levels();
                    assert_eq!(value & first.mask() != 0, first_level, "{pair} {command}");
                    assert_eq!(value & second.mask() != 0, second_level, "{pair} {command}");
                    assert_eq!(
                        value & 0x3F & !pair.mask(),
                        background & !pair.mask(),
                        "{pair} {command} disturbed other channels"
                    );
                    assert_eq!(value & 0xC0, 0xC0, "input bits changed");
                }
            }
        }
    }

    #[test]
    fn coast_on_pair_c_clears_pair_c_not_pair_a() {
        // Regression guard: COAST on pair C once cleared OUT0/OUT1 (pair A).
        // It must release OUT4/OUT5 and leave pair A running.
        let (mut reg, _probe) = sim_register(&[]);
        apply_bridge(&mut reg, BridgePair::A, BridgeCommand::Left).unwrap();
        apply_bridge(&mut reg, BridgePair::C, BridgeCommand::Brake).unwrap();
        assert_eq!(reg.value() & 0x3F, 0x31);

        apply_bridge(&mut reg, BridgePair::C, BridgeCommand::Coast).unwrap();
        assert_eq!(reg.value() & 0x3F, 0x01);
    }

    #[test]
    fn two_writes_per_command() {
        let (mut reg, probe) = sim_register(&[]);
        apply_bridge(&mut reg, BridgePair::B, BridgeCommand::Right).unwrap();
        assert_eq!(probe.writes(), vec![0x00, 0x08]);
    }

    #[test]
    fn tokens_are_parsed() {
        let (mut reg, _probe) = sim_register(&[]);
        apply_bridge_tokens(&mut reg, "B", "BRAKE").unwrap();
        assert_eq!(reg.value() & 0x3F, 0x0C);
    }

    #[test]
    fn unknown_tokens_are_rejected_without_writes() {
        let (mut reg, probe) = sim_register(&[]);
        assert!(matches!(
            apply_bridge_tokens(&mut reg, "D", "LEFT"),
            Err(PortError::InvalidBridgeArgs(_))
        ));
        assert!(matches!(
            apply_bridge_tokens(&mut reg, "A", "SPIN"),
            Err(PortError::InvalidBridgeArgs(_))
        ));
        assert!(probe.writes().is_empty());
    }
}
