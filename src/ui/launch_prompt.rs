use std::io::{BufRead, Write};

use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaunchChoice {
    Launch(String),
    Skip,
}

/// The loadout shown as selected: the current one if it still exists, else the first.
pub fn preselected<'a>(loadouts: &'a [String], current: &str) -> Option<&'a String> {
    loadouts
        .iter()
        .find(|name| *name == current)
        .or_else(|| loadouts.first())
}

pub fn render(loadouts: &[String], current: &str) -> String {
    let selected = preselected(loadouts, current);
    let mut out = String::from("Loadout:\n");
    for (i, name) in loadouts.iter().enumerate() {
        let marker = if Some(name) == selected { '*' } else { ' ' };
        out.push_str(&format!(" {} {:>2}) {}\n", marker, i + 1, name));
    }
    out.push_str("Launch [number/name, Enter = *] or skip [s]: ");
    out
}

/// Interprets one line of input.
///
/// Empty input takes the preselected loadout, `s`/`skip` skips, and a number or an exact name
/// picks that loadout. Anything else skips.
pub fn resolve_choice(input: &str, loadouts: &[String], current: &str) -> LaunchChoice {
    let input = input.trim();
    if input.is_empty() {
        return preselected(loadouts, current)
            .map_or(LaunchChoice::Skip, |name| LaunchChoice::Launch(name.clone()));
    }
    if input.eq_ignore_ascii_case("s") || input.eq_ignore_ascii_case("skip") {
        return LaunchChoice::Skip;
    }
    if let Some(name) = loadouts.iter().find(|name| *name == input) {
        return LaunchChoice::Launch(name.clone());
    }
    if let Some(name) = input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| loadouts.get(i))
    {
        return LaunchChoice::Launch(name.clone());
    }
    warn!("Unknown loadout '{}', skipping launch", input);
    LaunchChoice::Skip
}

/// Terminal rendition of the launch dialog.
pub fn prompt<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    loadouts: &[String],
    current: &str,
) -> LaunchChoice {
    if loadouts.is_empty() {
        return LaunchChoice::Skip;
    }
    if write!(output, "{}", render(loadouts, current))
        .and_then(|_| output.flush())
        .is_err()
    {
        return LaunchChoice::Skip;
    }

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => LaunchChoice::Skip,
        Ok(_) => resolve_choice(&line, loadouts, current),
    }
}
