// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Start-of-integration pulse for the line camera.
//!
//! The SI line is raised on the first SI-timer interrupt after a scan starts and lowered on the
//! second, after which the timer is switched off until the next scan re-arms it.

/// Level of the SI output.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SiLevel {
    Low,
    High,
}

/// Result of one SI-timer interrupt.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SiStep {
    /// Level to drive on the SI pin.
    pub level: SiLevel,
    /// Whether the SI timer keeps running.
    pub timer_enabled: bool,
}

pub struct SiPulse {
    level: SiLevel,
}

impl SiPulse {
    pub const fn new() -> Self {
        Self { level: SiLevel::Low }
    }

    #[inline]
    pub fn level(&self) -> SiLevel {
        self.level
    }

    /// Prepare for a new pulse at scan start.
    #[inline]
    pub fn arm(&mut self) {
        self.level = SiLevel::Low;
    }

    /// SI-timer interrupt: Low → High keeps the timer running, High → Low stops it.
    pub fn on_timer(&mut self) -> SiStep {
        let step = match self.level {
            SiLevel::Low => SiStep {
                level: SiLevel::High,
                timer_enabled: true,
            },
            SiLevel::High => SiStep {
                level: SiLevel::Low,
                timer_enabled: false,
            },
        };
        self.level = step.level;
        step
    }
}

impl Default for SiPulse {
    fn default() -> Self {
        Self::new()
    }
}
