// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Four-channel drive motor bridge.
//!
//! The drive motor sits on a full bridge whose four legs are fed by independent PWM channels:
//! two "front" legs (FA, FB) and two "back" legs (BA, BB). The gate drivers are active-low, so a
//! ratio of [`MAX_DUTY`] switches a leg off and `MAX_DUTY - duty` drives it at `duty`.
//!
//! | Direction    | Off (`MAX_DUTY`) | Driven (`MAX_DUTY - duty`) |
//! | ------------ | ---------------- | -------------------------- |
//! | Forward      | BA, BB           | FA, FB                     |
//! | Backward     | FA, FB           | BA, BB                     |
//! | BrakeTop     | BA, FB           | FA, BB                     |
//! | BrakeBottom  | FA, BB           | BA, FB                     |
//!
//! The mapping is pure; the `hw::pwm` layer writes the resulting [`ChannelRatios`] to the timer.

use log::warn;

use crate::error::MotorError;

/// Full-scale 16-bit PWM ratio. Also the "off" level for a bridge leg.
pub const MAX_DUTY: u16 = 0xFFFF;

/// Bridge topology requested by the caller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Forward,
    Backward,
    BrakeTop,
    BrakeBottom,
}

impl TryFrom<u8> for Direction {
    type Error = MotorError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Direction::Forward),
            1 => Ok(Direction::Backward),
            2 => Ok(Direction::BrakeTop),
            3 => Ok(Direction::BrakeBottom),
            other => Err(MotorError::InvalidDirection(other)),
        }
    }
}

/// One PWM channel feeding a bridge leg.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Channel {
    FrontA,
    FrontB,
    BackA,
    BackB,
}

/// Ratios for all four bridge legs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChannelRatios {
    pub front_a: u16,
    pub front_b: u16,
    pub back_a: u16,
    pub back_b: u16,
}

impl ChannelRatios {
    /// Every leg off.
    pub const STOPPED: Self = Self {
        front_a: MAX_DUTY,
        front_b: MAX_DUTY,
        back_a: MAX_DUTY,
        back_b: MAX_DUTY,
    };

    /// Map a direction and duty to leg ratios.
    pub fn for_command(direction: Direction, duty: u16) -> Self {
        let on = MAX_DUTY - duty;
        let off = MAX_DUTY;

        match direction {
            Direction::Forward => Self {
                front_a: on,
                front_b: on,
                back_a: off,
                back_b: off,
            },
            Direction::Backward => Self {
                front_a: off,
                front_b: off,
                back_a: on,
                back_b: on,
            },
            Direction::BrakeTop => Self {
                front_a: on,
                front_b: off,
                back_a: off,
                back_b: on,
            },
            Direction::BrakeBottom => Self {
                front_a: off,
                front_b: on,
                back_a: on,
                back_b: off,
            },
        }
    }

    /// Ratio for a single channel.
    #[inline]
    pub fn get(&self, channel: Channel) -> u16 {
        match channel {
            Channel::FrontA => self.front_a,
            Channel::FrontB => self.front_b,
            Channel::BackA => self.back_a,
            Channel::BackB => self.back_b,
        }
    }
}

/// Last command applied to the bridge.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MotorCommand {
    Drive { direction: Direction, duty: u16 },
    /// Fail-safe after a rejected command: all legs off.
    Stopped,
}

/// Stateless bridge mapping plus the last command, kept for diagnostics.
pub struct MotorDriver {
    last: MotorCommand,
}

impl MotorDriver {
    pub fn new() -> Self {
        Self {
            last: MotorCommand::Stopped,
        }
    }

    /// Command a direction and duty, returning the leg ratios to apply.
    pub fn set(&mut self, direction: Direction, duty: u16) -> ChannelRatios {
        self.last = MotorCommand::Drive { direction, duty };
        ChannelRatios::for_command(direction, duty)
    }

    /// Command from a raw direction code. Unknown codes stop the bridge.
    pub fn set_raw(&mut self, direction: u8, duty: u16) -> Result<ChannelRatios, MotorError> {
        match Direction::try_from(direction) {
            Ok(direction) => Ok(self.set(direction, duty)),
            Err(e) => {
                warn!("motor: {}, stopping bridge", e);
                self.stop();
                Err(e)
            }
        }
    }

    /// Switch every leg off.
    pub fn stop(&mut self) -> ChannelRatios {
        self.last = MotorCommand::Stopped;
        ChannelRatios::STOPPED
    }

    #[inline]
    pub fn last_command(&self) -> MotorCommand {
        self.last
    }

    /// Last commanded direction, `None` while stopped.
    pub fn direction(&self) -> Option<Direction> {
        match self.last {
            MotorCommand::Drive { direction, .. } => Some(direction),
            MotorCommand::Stopped => None,
        }
    }

    /// Last commanded duty, zero while stopped.
    pub fn duty(&self) -> u16 {
        match self.last {
            MotorCommand::Drive { duty, .. } => duty,
            MotorCommand::Stopped => 0,
        }
    }

    /// Ratios for the last command.
    pub fn ratios(&self) -> ChannelRatios {
        match self.last {
            MotorCommand::Drive { direction, duty } => ChannelRatios::for_command(direction, duty),
            MotorCommand::Stopped => ChannelRatios::STOPPED,
        }
    }
}

impl Default for MotorDriver {
    fn default() -> Self {
        Self::new()
    }
}
