//! Search-term highlighting inside rendered markup
//!
//! Matches are wrapped in `<mark class="search-highlight">`. Only text between
//! tags is searched, entities are matched by the character they stand for and
//! never split, and every wrapper can be removed again with
//! [`clear_highlights`], restoring the markup byte for byte.

pub const HIGHLIGHT_OPEN: &str = r#"<mark class="search-highlight">"#;
pub const HIGHLIGHT_CLOSE: &str = "</mark>";

/// Highlight `term` in `html`, replacing any earlier highlights
///
/// Terms shorter than `min_chars` only clear existing highlights.
pub fn highlight_terms(html: &str, term: &str, min_chars: usize) -> String {
    let cleared = clear_highlights(html);
    let needle: Vec<char> = term.chars().map(fold_case).collect();
    if needle.is_empty() || needle.len() < min_chars {
        return cleared;
    }

    let mut out = String::with_capacity(cleared.len() + 64);
    let mut rest = cleared.as_str();

    while let Some(tag_start) = rest.find('<') {
        highlight_text(&rest[..tag_start], &needle, &mut out);
        let tag_end = rest[tag_start..]
            .find('>')
            .map(|end| tag_start + end + 1)
            .unwrap_or(rest.len());
        out.push_str(&rest[tag_start..tag_end]);
        rest = &rest[tag_end..];
    }
    highlight_text(rest, &needle, &mut out);

    out
}

/// Remove every highlight wrapper, keeping the wrapped text
pub fn clear_highlights(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find(HIGHLIGHT_OPEN) {
        out.push_str(&rest[..start]);
        let inner = &rest[start + HIGHLIGHT_OPEN.len()..];
        match inner.find(HIGHLIGHT_CLOSE) {
            Some(end) => {
                out.push_str(&inner[..end]);
                rest = &inner[end + HIGHLIGHT_CLOSE.len()..];
            }
            None => {
                out.push_str(inner);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    out
}

/// Wrap matches within one run of text (no tags)
fn highlight_text(text: &str, needle: &[char], out: &mut String) {
    if text.is_empty() {
        return;
    }

    let units = split_units(text);
    let mut i = 0;

    while i < units.len() {
        let end = i + needle.len();
        let is_match = end <= units.len()
            && units[i..end]
                .iter()
                .zip(needle)
                .all(|((_, ch), n)| ch.map(fold_case) == Some(*n));

        if is_match {
            out.push_str(HIGHLIGHT_OPEN);
            for (raw, _) in &units[i..end] {
                out.push_str(raw);
            }
            out.push_str(HIGHLIGHT_CLOSE);
            i = end;
        } else {
            out.push_str(units[i].0);
            i += 1;
        }
    }
}

/// Split text into characters, keeping each entity as one unit
///
/// Unknown entities are kept opaque and never match.
fn split_units(text: &str) -> Vec<(&str, Option<char>)> {
    let mut units = Vec::with_capacity(text.len());
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        if rest.starts_with('&') {
            if let Some(len) = entity_len(rest) {
                let raw = &rest[..len];
                units.push((raw, decode_entity(&raw[1..len - 1])));
                pos += len;
                continue;
            }
        }

        let Some(c) = rest.chars().next() else {
            break;
        };
        let len = c.len_utf8();
        units.push((&rest[..len], Some(c)));
        pos += len;
    }

    units
}

/// Length of `&name;` at the start of `s`, if it is entity-shaped
fn entity_len(s: &str) -> Option<usize> {
    let semi = s.find(';')?;
    let name = &s[1..semi];
    let valid = (1..=10).contains(&name.len())
        && name
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_alphanumeric() || (i == 0 && c == '#'));
    valid.then_some(semi + 1)
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
