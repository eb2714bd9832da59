//! Yes/no prompts on the terminal.

use crate::models::RosterData;
use std::io::{self, BufRead, Write};

/// Asks `question` on `output` and reads one answer line from `input`.
///
/// Only `y` or `yes` (any case) count as agreement; end of input counts as no.
pub fn ask_yes_no_with<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<bool> {
    write!(output, "{question} [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Asks on the terminal. I/O failures count as no.
#[must_use]
pub fn ask_yes_no(question: &str) -> bool {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    ask_yes_no_with(&mut input, &mut io::stdout(), question).unwrap_or_else(|e| {
        tracing::warn!("Could not read answer: {e}");
        false
    })
}

/// The question shown before a shared roster replaces local data.
#[must_use]
pub fn adoption_question(incoming: &RosterData) -> String {
    format!(
        "This link carries {} members, {} notices, {} ledger entries and {} meetings.\n\
         Adopt the shared data and overwrite yours?",
        incoming.members.len(),
        incoming.notices.len(),
        incoming.finances.len(),
        incoming.meetings.len(),
    )
}

/// Terminal prompt for adopting a shared roster.
#[must_use]
pub fn confirm_adoption(incoming: &RosterData) -> bool {
    ask_yes_no(&adoption_question(incoming))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::sample_roster;
    use std::io::Cursor;

    fn answer(text: &str) -> bool {
        let mut output = Vec::new();
        let result = ask_yes_no_with(&mut Cursor::new(text), &mut output, "Proceed?").unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Proceed? [y/N] ");
        result
    }

    #[test]
    fn test_only_yes_agrees() {
        assert!(answer("y\n"));
        assert!(answer(" YES \n"));
        assert!(!answer("n\n"));
        assert!(!answer("\n"));
        assert!(!answer(""));
        assert!(!answer("sure\n"));
    }

    #[test]
    fn test_adoption_question_counts_records() {
        let question = adoption_question(&sample_roster());
        assert!(question.contains("4 members, 2 notices, 2 ledger entries and 1 meetings"));
    }
}
