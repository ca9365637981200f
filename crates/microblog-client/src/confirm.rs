//! Confirmation capability.
//!
//! Operations that would destroy local data (overwriting an identity or a
//! saved attachment) ask a [`Confirm`] implementation first. The terminal
//! prompt lives in the binary; the library only sees the answer.

/// Synchronous yes/no question.
pub trait Confirm {
    /// Ask `question`; true means proceed.
    fn confirm(&mut self, question: &str) -> bool;
}

/// Answers every question the same way.
///
/// Used for non-interactive runs (`--yes`) and in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&mut self, _question: &str) -> bool {
        self.0
    }
}

/// Replays scripted answers and records the questions asked.
///
/// Answers `false` once the script runs out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConfirm {
    answers: Vec<bool>,
    asked: Vec<String>,
}

impl ScriptedConfirm {
    /// Create with answers given in the order they will be used.
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        let mut answers: Vec<bool> = answers.into_iter().collect();
        answers.reverse();
        Self { answers, asked: Vec::new() }
    }

    /// Questions asked so far, oldest first.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, question: &str) -> bool {
        self.asked.push(question.to_string());
        self.answers.pop().unwrap_or(false)
    }
}

impl<C: Confirm + ?Sized> Confirm for &mut C {
    fn confirm(&mut self, question: &str) -> bool {
        (**self).confirm(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_answers_in_order_then_decline() {
        let mut confirm = ScriptedConfirm::new([true, false, true]);

        assert!(confirm.confirm("a"));
        assert!(!confirm.confirm("b"));
        assert!(confirm.confirm("c"));
        assert!(!confirm.confirm("d"));
        assert_eq!(confirm.asked(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn fixed_answer() {
        assert!(FixedAnswer(true).confirm("?"));
        assert!(!FixedAnswer(false).confirm("?"));
    }
}
