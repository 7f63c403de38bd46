//! Record repair: corrupted-export recovery.
//!
//! Two corruption classes are handled here. Some exporters serialize an
//! entire CSV row into the FN field, leaving a name full of escaped
//! commas; others stuff labeled key/value pairs ("Phone: ...",
//! "Email: ...") into the NOTE field. Both transforms are pure:
//! `record -> record`, no shared state with the decoder.

use std::sync::LazyLock;

use cardfold_core::record::{ContactRecord, NameParts};
use cardfold_rfc::parse::unescape_text;
use regex::Regex;

/// The raw escaped-comma marker whose survival into FN signals a
/// serialized row.
const COMMA_MARKER: &str = r"\,";

/// Legitimate names almost never carry this many escaped commas.
const MANGLED_THRESHOLD: usize = 5;

#[expect(clippy::unwrap_used, reason = "patterns are compile-time constants")]
static EMAIL_EXACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

#[expect(clippy::unwrap_used, reason = "patterns are compile-time constants")]
static EMAIL_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

#[expect(clippy::unwrap_used, reason = "patterns are compile-time constants")]
static PHONE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d()\s.\-]{7,20}").unwrap());

#[expect(clippy::unwrap_used, reason = "patterns are compile-time constants")]
static URL_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://[^\s,]+").unwrap());

#[expect(clippy::unwrap_used, reason = "patterns are compile-time constants")]
static EMAIL_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^e-?mail[^:]*:").unwrap());

#[expect(clippy::unwrap_used, reason = "patterns are compile-time constants")]
static PHONE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(phone|telephone|tel|mobile|cell)[^:]*:").unwrap());

#[expect(clippy::unwrap_used, reason = "patterns are compile-time constants")]
static URL_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(website|web\s*site|url|home\s*page)[^:]*:").unwrap());

#[expect(clippy::unwrap_used, reason = "patterns are compile-time constants")]
static ORG_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(company|organi[sz]ation|employer)\s*:").unwrap());

#[expect(clippy::unwrap_used, reason = "patterns are compile-time constants")]
static TITLE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(job\s*title|title|position)\s*:").unwrap());

#[expect(clippy::unwrap_used, reason = "patterns are compile-time constants")]
static GIVEN_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^first\s*name\s*:").unwrap());

#[expect(clippy::unwrap_used, reason = "patterns are compile-time constants")]
static FAMILY_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(last\s*name|surname|family\s*name)\s*:").unwrap());

#[expect(clippy::unwrap_used, reason = "patterns are compile-time constants")]
static GENERIC_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z][\w-]*(\s+[a-z][\w-]*)?\s*:\s*\S").unwrap());

/// Normalizes a phone number: digits only, `+` re-prefixed when the
/// original started with one. Fewer than 7 digits is invalid.
#[must_use]
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    if digits.len() < 7 {
        return None;
    }

    if trimmed.starts_with('+') {
        Some(format!("+{digits}"))
    } else {
        Some(digits)
    }
}

/// Repairs a freshly decoded record's name field.
///
/// A raw FN with [`MANGLED_THRESHOLD`] or more `\,` markers is treated as
/// a serialized CSV row: emails and phones are recovered from its tokens
/// and a replacement name is derived from the first recovered email's
/// local part. A healthy FN is simply unescaped.
#[must_use]
pub fn repair(mut record: ContactRecord) -> ContactRecord {
    if record.full_name.matches(COMMA_MARKER).count() >= MANGLED_THRESHOLD {
        repair_mangled_name(&mut record);
    } else {
        record.full_name = unescape_text(&record.full_name);
    }
    record
}

fn repair_mangled_name(record: &mut ContactRecord) {
    let raw = record.full_name.clone();
    let mut first_email: Option<String> = None;

    for token in raw.split(COMMA_MARKER) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if EMAIL_EXACT.is_match(token) {
            let lowered = token.to_ascii_lowercase();
            record.push_email(&lowered);
            if first_email.is_none() {
                first_email = Some(lowered);
            }
        } else if looks_like_phone(token)
            && let Some(phone) = normalize_phone(token)
        {
            record.push_phone(phone);
        } else {
            // Leftover row fragment, discarded.
        }
    }

    // Without a recovered email there is nothing to derive a name from;
    // the garbage name stays and the filter deals with it.
    if let Some(email) = first_email
        && let Some((local, _)) = email.split_once('@')
        && let Some(derived) = name_from_local_part(local)
    {
        tracing::debug!(uid = %record.uid, name = %derived, "repaired mangled name");
        record.full_name = derived;
    }
}

/// A token is phone-shaped when it has 7-15 digits and at most two
/// characters outside digits, spaces, parens, hyphens, plus, and dots.
fn looks_like_phone(token: &str) -> bool {
    let digit_count = token.chars().filter(char::is_ascii_digit).count();
    if !(7..=15).contains(&digit_count) {
        return false;
    }

    let foreign = token
        .chars()
        .filter(|c| !c.is_ascii_digit() && !matches!(c, ' ' | '(' | ')' | '-' | '+' | '.'))
        .count();
    foreign <= 2
}

/// Derives a display name from an email local part.
fn name_from_local_part(local: &str) -> Option<String> {
    if local.contains(['.', '_']) {
        let parts: Vec<String> = local
            .split(['.', '_'])
            .filter(|s| !s.is_empty())
            .map(title_case)
            .collect();
        if parts.is_empty() {
            return None;
        }
        return Some(parts.join(" "));
    }

    if local.chars().count() > 2 && !local.chars().all(|c| c.is_ascii_digit()) {
        return Some(title_case(local));
    }

    None
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Extracts structured data hidden in the note field.
///
/// Only runs when the note looks labeled; a genuine free-text note is
/// left untouched. Lines that yield nothing are retained verbatim.
#[must_use]
pub fn extract_note_fields(mut record: ContactRecord) -> ContactRecord {
    if record.note.is_empty() || !note_looks_labeled(&record.note) {
        return record;
    }

    let note = std::mem::take(&mut record.note);
    let mut retained: Vec<&str> = Vec::new();
    let mut extracted_any = false;

    for line in note.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if extract_from_line(&mut record, line) {
            extracted_any = true;
        } else {
            retained.push(line);
        }
    }

    if extracted_any {
        record.note = retained.join("\n");
    } else {
        record.note = note;
    }

    record
}

fn note_looks_labeled(note: &str) -> bool {
    note.lines().map(str::trim).any(|line| {
        EMAIL_LABEL.is_match(line)
            || PHONE_LABEL.is_match(line)
            || URL_LABEL.is_match(line)
            || ORG_LABEL.is_match(line)
            || TITLE_LABEL.is_match(line)
            || GIVEN_LABEL.is_match(line)
            || FAMILY_LABEL.is_match(line)
            || GENERIC_LABEL.is_match(line)
    })
}

/// Processes one note line; returns whether anything was extracted.
fn extract_from_line(record: &mut ContactRecord, line: &str) -> bool {
    if EMAIL_LABEL.is_match(line) {
        let mut took = false;
        for m in EMAIL_TOKEN.find_iter(line) {
            record.push_email(m.as_str());
            took = true;
        }
        return took;
    }

    if let Some(m) = PHONE_LABEL.find(line) {
        let remainder = &line[m.end()..];
        let mut took = false;
        for token in PHONE_TOKEN.find_iter(remainder) {
            if let Some(phone) = normalize_phone(token.as_str()) {
                record.push_phone(phone);
                took = true;
            }
        }
        return took;
    }

    if URL_LABEL.is_match(line) {
        let mut took = false;
        for m in URL_TOKEN.find_iter(line) {
            record.push_url(m.as_str());
            took = true;
        }
        return took;
    }

    if let Some(m) = ORG_LABEL.find(line) {
        let remainder = line[m.end()..].trim();
        if remainder.len() > 1 {
            record.push_organization(remainder);
            return true;
        }
        return false;
    }

    if let Some(m) = TITLE_LABEL.find(line) {
        let remainder = line[m.end()..].trim();
        if record.title.is_empty() && !remainder.is_empty() {
            record.title = remainder.to_string();
            return true;
        }
        return false;
    }

    if let Some(m) = GIVEN_LABEL.find(line) {
        let remainder = line[m.end()..].trim();
        if remainder.is_empty() {
            return false;
        }
        let name = record.name.get_or_insert_with(NameParts::default);
        if name.given.is_empty() {
            name.given = remainder.to_string();
            return true;
        }
        return false;
    }

    if let Some(m) = FAMILY_LABEL.find(line) {
        let remainder = line[m.end()..].trim();
        if remainder.is_empty() {
            return false;
        }
        let name = record.name.get_or_insert_with(NameParts::default);
        if name.family.is_empty() {
            name.family = remainder.to_string();
            return true;
        }
        return false;
    }

    // No label matched: scan for unlabeled email or URL shapes.
    let mut took = false;
    for m in EMAIL_TOKEN.find_iter(line) {
        record.push_email(m.as_str());
        took = true;
    }
    for m in URL_TOKEN.find_iter(line) {
        record.push_url(m.as_str());
        took = true;
    }
    took
}
