// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-category cut state machine.
//!
//! Each category is either idle or armed with a start position. The cut type
//! decides what a button press does; the registry only applies the result.

use super::button::CutType;

/// State of one category between presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutState {
    Idle,
    Armed { start_ms: u64 },
}

/// What a press resolves to. Every variant leaves the category idle except `Arm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Arm { start_ms: u64 },
    Emit { start_ms: u64, end_ms: u64 },
    Reject { start_ms: u64, end_ms: u64 },
}

impl CutType {
    /// Resolve a press at `position_ms` given the category's current state.
    pub fn press(self, state: CutState, position_ms: u64, window_ms: u64) -> Transition {
        match (self, state) {
            (CutType::Auto, _) => {
                let start_ms = position_ms.saturating_sub(window_ms);
                range(start_ms, position_ms)
            }
            (CutType::Manual, CutState::Idle) => Transition::Arm {
                start_ms: position_ms,
            },
            (CutType::Manual, CutState::Armed { start_ms }) => range(start_ms, position_ms),
        }
    }
}

fn range(start_ms: u64, end_ms: u64) -> Transition {
    if end_ms > start_ms {
        Transition::Emit { start_ms, end_ms }
    } else {
        Transition::Reject { start_ms, end_ms }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_press_emits_look_back_window() {
        assert_eq!(
            CutType::Auto.press(CutState::Idle, 45_000, 10_000),
            Transition::Emit {
                start_ms: 35_000,
                end_ms: 45_000
            }
        );
    }

    #[test]
    fn test_auto_window_clamps_at_zero() {
        assert_eq!(
            CutType::Auto.press(CutState::Idle, 4_000, 10_000),
            Transition::Emit {
                start_ms: 0,
                end_ms: 4_000
            }
        );
    }

    #[test]
    fn test_auto_press_at_zero_is_rejected() {
        assert!(matches!(
            CutType::Auto.press(CutState::Idle, 0, 10_000),
            Transition::Reject { .. }
        ));
    }

    #[test]
    fn test_manual_two_presses() {
        let first = CutType::Manual.press(CutState::Idle, 5_000, 0);
        assert_eq!(first, Transition::Arm { start_ms: 5_000 });

        let second = CutType::Manual.press(CutState::Armed { start_ms: 5_000 }, 12_000, 0);
        assert_eq!(
            second,
            Transition::Emit {
                start_ms: 5_000,
                end_ms: 12_000
            }
        );
    }

    #[test]
    fn test_manual_end_not_after_start_is_rejected() {
        let armed = CutState::Armed { start_ms: 9_000 };
        assert!(matches!(
            CutType::Manual.press(armed, 9_000, 0),
            Transition::Reject { .. }
        ));
        assert!(matches!(
            CutType::Manual.press(armed, 3_000, 0),
            Transition::Reject { .. }
        ));
    }
}
