//! Profile names from an AWS shared config file.

const DEFAULT_PROFILE: &str = "default";
const PROFILE_PREFIX: &str = "profile";

/// Profile names declared by `[default]` and `[profile NAME]` headers, in
/// file order, each listed once.
///
/// Parsing is tolerant: keys, blank lines, other section kinds such as
/// `[sso-session x]` and malformed headers are skipped.
pub fn parse_profile_names(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for line in content.lines() {
        let Some(name) = section_profile(strip_comment(line).trim()) else {
            continue;
        };
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

fn strip_comment(line: &str) -> &str {
    match line.find(['#', ';']) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn section_profile(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?.trim();

    if inner == DEFAULT_PROFILE {
        return Some(DEFAULT_PROFILE);
    }

    let rest = inner.strip_prefix(PROFILE_PREFIX)?;
    // "[profilex]" is not a profile header
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let name = rest.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        None
    } else {
        Some(name)
    }
}
