//! Directional labels produced by the classifier and the validation check.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Next-day price direction. Label 1 is `Up`, label 0 is `Down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Map a binary class label onto a direction. Only `1` is `Up`; every other label is `Down`.
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn label(self) -> u8 {
        match self {
            Direction::Up => 1,
            Direction::Down => 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
        }
    }
}

/// Whether the prediction for the held-out last day matched the known outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationOutcome {
    Correct,
    Incorrect,
}

impl ValidationOutcome {
    pub fn compare(predicted: Direction, actual: Direction) -> Self {
        if predicted == actual {
            ValidationOutcome::Correct
        } else {
            ValidationOutcome::Incorrect
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationOutcome::Correct => write!(f, "Correct"),
            ValidationOutcome::Incorrect => write!(f, "Incorrect"),
        }
    }
}
