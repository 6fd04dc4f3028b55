use serde::{Deserialize, Serialize};

use crate::engine::LogicEngine;

/// Completion counters over the currently visible questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percentage: u32,
}

impl Progress {
    pub fn new(current: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            (current as f64 / total as f64 * 100.0).round() as u32
        };
        Self {
            current,
            total,
            percentage,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current == self.total
    }
}

impl LogicEngine {
    pub fn progress(&self) -> Progress {
        let visible = self.visible_questions();
        let answered = visible
            .iter()
            .filter(|question| self.is_answered(&question.id))
            .count();
        Progress::new(answered, visible.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(Progress::new(1, 3).percentage, 33);
        assert_eq!(Progress::new(2, 3).percentage, 67);
        assert_eq!(Progress::new(1, 8).percentage, 13);
    }

    #[test]
    fn empty_questionnaire_reports_zero() {
        let progress = Progress::new(0, 0);
        assert_eq!(progress.percentage, 0);
        assert!(progress.is_complete());
    }
}
