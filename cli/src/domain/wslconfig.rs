//! `.wslconfig` INI handling for the `[wsl2] kernel` key.
//!
//! Line-based so that comments, ordering and unrelated keys survive an
//! update untouched. Section and key names match case-insensitively, as WSL
//! reads them.

pub const WSL2_SECTION: &str = "wsl2";
pub const KERNEL_KEY: &str = "kernel";

/// Read `key` from `[section]`, unquoted and with `\\` unescaped.
///
/// Returns `None` when the key is missing or empty.
#[must_use]
pub fn read_value(text: &str, section: &str, key: &str) -> Option<String> {
    let mut in_section = false;
    let mut found = None;
    for line in text.lines() {
        if let Some(name) = section_name(line) {
            in_section = name.eq_ignore_ascii_case(section);
            continue;
        }
        if !in_section {
            continue;
        }
        match key_value(line) {
            Some((k, v)) if k.eq_ignore_ascii_case(key) => found = Some(unescape(unquote(v))),
            _ => {}
        }
    }
    found.filter(|v| !v.is_empty())
}

/// Set `key = value` inside `[section]`, returning the new file content.
///
/// Replaces the first matching key in place, appends the key to an existing
/// section, or appends a new section at the end of the file.
#[must_use]
pub fn upsert_value(text: &str, section: &str, key: &str, value: &str) -> String {
    let entry = format!("{key} = {}", escape(value));
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();

    let mut section_start = None;
    let mut section_end = lines.len();
    for (i, line) in lines.iter().enumerate() {
        match (section_name(line), section_start) {
            (Some(name), None) if name.eq_ignore_ascii_case(section) => section_start = Some(i),
            (Some(_), Some(_)) => {
                section_end = i;
                break;
            }
            _ => {}
        }
    }

    match section_start {
        Some(start) => {
            let existing = (start + 1..section_end).find(|&i| {
                key_value(&lines[i]).is_some_and(|(k, _)| k.eq_ignore_ascii_case(key))
            });
            if let Some(i) = existing {
                lines[i] = entry;
            } else {
                // Insert after the section's last non-blank line.
                let insert_at = (start + 1..section_end)
                    .rev()
                    .find(|&i| !lines[i].trim().is_empty())
                    .map_or(start + 1, |i| i + 1);
                lines.insert(insert_at, entry);
            }
        }
        None => {
            if lines.last().is_some_and(|l| !l.trim().is_empty()) {
                lines.push(String::new());
            }
            lines.push(format!("[{section}]"));
            lines.push(entry);
        }
    }

    let mut out = lines.join(line_ending(text));
    out.push_str(line_ending(text));
    out
}

fn section_name(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .map(str::trim)
}

fn key_value(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(['#', ';']) {
        return None;
    }
    let (k, v) = trimmed.split_once('=')?;
    Some((k.trim(), v.trim()))
}

fn unquote(v: &str) -> &str {
    v.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(v)
}

fn unescape(v: &str) -> String {
    v.replace("\\\\", "\\")
}

fn escape(v: &str) -> String {
    v.replace('\\', "\\\\")
}

fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") { "\r\n" } else { "\n" }
}
