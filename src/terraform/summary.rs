//! Parsing of the resource-count line Terraform prints on completion.
//!
//! `apply` ends with `Apply complete! Resources: 1 added, 0 changed, 0
//! destroyed.` and `destroy` with `Destroy complete! Resources: 1 destroyed.`
//! The counts are informational; a missing or unrecognised line yields
//! `None` rather than an error.

/// Resource counts reported by a completed `apply` or `destroy`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ChangeSummary {
    /// Resources created.
    pub added: usize,
    /// Resources updated in place.
    pub changed: usize,
    /// Resources removed.
    pub destroyed: usize,
}

/// Extracts the change summary from Terraform's stdout.
#[must_use]
pub fn parse_change_summary(stdout: &str) -> Option<ChangeSummary> {
    stdout
        .lines()
        .rev()
        .filter(|line| line.contains("complete!"))
        .find_map(|line| {
            let plain = strip_ansi(line);
            let (_, counts) = plain.split_once("Resources:")?;
            parse_counts(counts)
        })
}

/// Drops ANSI escape sequences such as `ESC[1m` so coloured output parses.
fn strip_ansi(line: &str) -> String {
    let mut plain = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            plain.push(ch);
        }
    }
    plain
}

fn parse_counts(counts: &str) -> Option<ChangeSummary> {
    let mut summary = ChangeSummary::default();
    let mut recognised = false;
    for part in counts.split(',') {
        let mut words = part.trim().trim_end_matches('.').split_whitespace();
        let (Some(number), Some(kind)) = (words.next(), words.next()) else {
            continue;
        };
        let Ok(count) = number.parse::<usize>() else {
            continue;
        };
        let slot = match kind {
            "added" => &mut summary.added,
            "changed" => &mut summary.changed,
            "destroyed" => &mut summary.destroyed,
            _ => continue,
        };
        *slot = count;
        recognised = true;
    }
    recognised.then_some(summary)
}
