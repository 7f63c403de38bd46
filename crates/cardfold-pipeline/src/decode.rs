//! Card decoding: raw text to contact records.
//!
//! The wire layer (`cardfold-rfc`) handles unfolding and content-line
//! lexing; this module splits the line stream into blocks and assigns
//! properties to [`ContactRecord`] fields. Each freshly decoded record is
//! run through repair and note extraction before it is returned.

use cardfold_core::record::{ContactRecord, NameParts, PostalAddress, Source};
use cardfold_rfc::parse::{ContentLine, parse_content_line, split_lines, split_structured, unescape_text};

use crate::repair::{extract_note_fields, normalize_phone, repair};

/// Decodes one export into records, in order of appearance.
///
/// Content before the first `BEGIN:VCARD` marker is skipped; a would-be
/// block without a begin marker is simply absent from the result.
#[must_use]
pub fn decode_source(input: &str, source: Source) -> Vec<ContactRecord> {
    let lines = split_lines(input);

    let mut blocks: Vec<Vec<String>> = Vec::new();
    let mut current: Option<Vec<String>> = None;

    for line in lines {
        if line.eq_ignore_ascii_case("BEGIN:VCARD") {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            current = Some(Vec::new());
        } else if let Some(block) = current.as_mut() {
            block.push(line);
        } else {
            // Before the first begin marker.
        }
    }
    if let Some(block) = current.take() {
        blocks.push(block);
    }

    tracing::debug!(blocks = blocks.len(), ?source, "decoded card blocks");

    blocks
        .iter()
        .map(|block| decode_block(block, source))
        .collect()
}

fn decode_block(lines: &[String], source: Source) -> ContactRecord {
    let mut record = ContactRecord::new(uuid::Uuid::new_v4().to_string(), source);

    for (idx, line) in lines.iter().enumerate() {
        let content = match parse_content_line(line, idx + 1) {
            Ok(content) => content,
            Err(error) => {
                tracing::debug!(%error, "skipping unparseable property line");
                continue;
            }
        };

        assign_property(&mut record, &content, line);
    }

    extract_note_fields(repair(record))
}

#[expect(
    clippy::cognitive_complexity,
    reason = "one arm per recognized property; each arm is trivial"
)]
fn assign_property(record: &mut ContactRecord, content: &ContentLine, raw_line: &str) {
    match content.name.as_str() {
        // Structural lines carry no contact data.
        "END" | "VERSION" => {}

        // FN stays raw until repair has checked it for serialized-row
        // corruption (the detector counts literal `\,` markers).
        "FN" => record.full_name = content.value.clone(),

        "N" => {
            let parts = split_structured(&content.value);
            let component = |i: usize| {
                parts
                    .get(i)
                    .map(|s| unescape_text(s).trim().to_string())
                    .unwrap_or_default()
            };
            let name = NameParts {
                family: component(0),
                given: component(1),
                middle: component(2),
                prefix: component(3),
                suffix: component(4),
            };
            if !name.is_empty() {
                record.name = Some(name);
            }
        }

        "TEL" => {
            if let Some(phone) = normalize_phone(&content.value) {
                record.push_phone(phone);
            }
        }

        "EMAIL" => record.push_email(&unescape_text(&content.value)),

        "URL" => record.push_url(&unescape_text(&content.value)),

        "ORG" => {
            for part in split_structured(&content.value) {
                record.push_organization(&unescape_text(part));
            }
        }

        "TITLE" => record.title = unescape_text(&content.value),

        "NOTE" => record.note = unescape_text(&content.value),

        // The whole line is kept so encoding parameters survive verbatim.
        "PHOTO" => record.photo = Some(raw_line.to_string()),

        "BDAY" => record.birthday = Some(content.value.clone()),

        "ADR" => {
            let parts = split_structured(&content.value);
            let component = |i: usize| {
                parts
                    .get(i)
                    .map(|s| unescape_text(s).trim().to_string())
                    .unwrap_or_default()
            };
            record.addresses.push(PostalAddress {
                po_box: component(0),
                extended: component(1),
                street: component(2),
                locality: component(3),
                region: component(4),
                postal_code: component(5),
                country: component(6),
                types: content
                    .param("TYPE")
                    .map(|v| {
                        v.split(',')
                            .map(str::trim)
                            .filter(|t| !t.is_empty())
                            .map(ToString::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            });
        }

        "UID" => record.uid = unescape_text(&content.value),

        name => {
            // Preserve the original line with its value unescaped: the
            // prefix (group, params) is exactly as written in the input.
            let prefix_len = raw_line.len() - content.value.len() - 1;
            let preserved = format!(
                "{}:{}",
                &raw_line[..prefix_len],
                unescape_text(&content.value)
            );
            record.push_extension_line(name, preserved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = "\
BEGIN:VCARD\r\n\
VERSION:3.0\r\n\
FN:Jane Doe\r\n\
N:Doe;Jane;;;\r\n\
EMAIL:Jane@Example.com\r\n\
TEL:+1 (555) 123-4567\r\n\
END:VCARD\r\n";

    #[test]
    fn decode_simple_card() {
        let records = decode_source(SIMPLE, Source::Google);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.full_name, "Jane Doe");
        assert_eq!(record.emails, vec!["jane@example.com"]);
        assert_eq!(record.phones, vec!["+15551234567"]);

        let name = record.name.as_ref().unwrap();
        assert_eq!(name.family, "Doe");
        assert_eq!(name.given, "Jane");
    }

    #[test]
    fn content_before_begin_marker_is_skipped() {
        let input = format!("FN:Orphan Line\r\nEMAIL:lost@example.com\r\n{SIMPLE}");
        let records = decode_source(&input, Source::Google);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].full_name, "Jane Doe");
    }

    #[test]
    fn repeated_properties_accumulate() {
        let input = "\
BEGIN:VCARD\r\n\
FN:Jane Doe\r\n\
EMAIL:a@example.com\r\n\
EMAIL:b@example.com\r\n\
EMAIL:a@example.com\r\n\
END:VCARD\r\n";
        let records = decode_source(input, Source::Google);
        assert_eq!(records[0].emails, vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn unparseable_line_is_skipped_not_fatal() {
        let input = "\
BEGIN:VCARD\r\n\
THIS LINE HAS NO COLON\r\n\
FN:Jane Doe\r\n\
EMAIL:jane@example.com\r\n\
END:VCARD\r\n";
        let records = decode_source(input, Source::Google);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].full_name, "Jane Doe");
    }

    #[test]
    fn empty_value_is_legal() {
        let input = "BEGIN:VCARD\r\nFN:\r\nTITLE:\r\nEND:VCARD\r\n";
        let records = decode_source(input, Source::Apple);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].full_name, "");
        assert_eq!(records[0].title, "");
    }

    #[test]
    fn adr_with_type_parameter() {
        let input = "\
BEGIN:VCARD\r\n\
FN:Jane Doe\r\n\
EMAIL:jane@example.com\r\n\
ADR;TYPE=HOME,pref:;;123 Main St;Anytown;CA;12345;USA\r\n\
END:VCARD\r\n";
        let records = decode_source(input, Source::Apple);
        let addr = &records[0].addresses[0];
        assert_eq!(addr.street, "123 Main St");
        assert_eq!(addr.locality, "Anytown");
        assert_eq!(addr.postal_code, "12345");
        assert_eq!(addr.types, vec!["HOME", "pref"]);
    }

    #[test]
    fn unknown_property_preserved_with_group_prefix_intact() {
        let input = "\
BEGIN:VCARD\r\n\
FN:Jane Doe\r\n\
EMAIL:jane@example.com\r\n\
item3.X-ABLABEL:Telegram\r\n\
X-SOCIALPROFILE;TYPE=twitter:https://twitter.com/jane\r\n\
END:VCARD\r\n";
        let records = decode_source(input, Source::Apple);
        let record = &records[0];
        assert!(record.has_extension("X-ABLABEL"));
        assert_eq!(
            record.extensions[0].lines,
            vec!["item3.X-ABLABEL:Telegram"]
        );
        assert!(record.has_extension("X-SOCIALPROFILE"));
        assert_eq!(
            record.extensions[1].lines,
            vec!["X-SOCIALPROFILE;TYPE=twitter:https://twitter.com/jane"]
        );
    }

    #[test]
    fn uid_property_overrides_generated_identifier() {
        let input = "\
BEGIN:VCARD\r\n\
UID:stable-id-1\r\n\
FN:Jane Doe\r\n\
EMAIL:jane@example.com\r\n\
END:VCARD\r\n";
        let records = decode_source(input, Source::Google);
        assert_eq!(records[0].uid, "stable-id-1");
    }

    #[test]
    fn folded_note_line_unfolds_before_assignment() {
        let input = "\
BEGIN:VCARD\r\n\
FN:Jane Doe\r\n\
EMAIL:jane@example.com\r\n\
NOTE:met at the conf\r\n erence last year\r\n\
END:VCARD\r\n";
        let records = decode_source(input, Source::Google);
        assert_eq!(records[0].note, "met at the conference last year");
    }
}
