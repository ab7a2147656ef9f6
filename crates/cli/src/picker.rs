use std::io::{self, Write};

use phoenix_core::{Candidate, CandidatePicker};

/// Numbered stdin prompt for choosing among catalog candidates.
pub struct StdinPicker;

impl CandidatePicker for StdinPicker {
    fn pick(&self, candidates: &[Candidate]) -> Option<usize> {
        for (index, candidate) in candidates.iter().enumerate() {
            let blurb = if candidate.summary.is_empty() {
                String::new()
            } else {
                let mut text: String = candidate.summary.chars().take(80).collect();
                if candidate.summary.chars().count() > 80 {
                    text.push_str("...");
                }
                format!("  {text}")
            };
            println!("{:>3}. {}{blurb}", index + 1, candidate.name);
        }
        print!("Select a game (empty to abort): ");
        io::stdout().flush().ok()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line).ok()?;
        let choice: usize = line.trim().parse().ok()?;
        choice.checked_sub(1).filter(|index| *index < candidates.len())
    }
}
