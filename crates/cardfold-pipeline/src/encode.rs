//! Card encoding: contact records back to wire text.
//!
//! Output is destination-specific. Apple Contacts gets the full record,
//! including the photo line and preserved vendor extensions; Google
//! Contacts gets a lean card without them, since its importer drops or
//! garbles what it does not recognize.

use cardfold_core::record::{ContactRecord, Destination, NameParts, PostalAddress};
use cardfold_rfc::build::{escape_text, fold_line};

const PRODUCT_ID: &str = "-//cardfold//EN";

/// Encodes records into one vCard 3.0 document for the given destination.
///
/// Lines are folded at 75 characters and joined with CRLF; the document
/// ends with a trailing CRLF.
#[must_use]
pub fn encode(records: &[ContactRecord], destination: Destination) -> String {
    let mut out = String::new();
    for record in records {
        encode_record(&mut out, record, destination);
    }
    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(&fold_line(line));
    out.push_str("\r\n");
}

#[expect(
    clippy::cognitive_complexity,
    reason = "property emission order mirrors the card layout"
)]
fn encode_record(out: &mut String, record: &ContactRecord, destination: Destination) {
    push_line(out, "BEGIN:VCARD");
    push_line(out, "VERSION:3.0");
    if destination == Destination::Apple {
        push_line(out, &format!("PRODID:{PRODUCT_ID}"));
    }

    if !record.uid.is_empty() {
        push_line(out, &format!("UID:{}", escape_text(&record.uid)));
    }

    let display_name = if record.full_name.trim().is_empty() {
        "Unknown"
    } else {
        record.full_name.trim()
    };
    push_line(out, &format!("FN:{}", escape_text(display_name)));
    push_line(out, &format!("N:{}", structured_name(record, display_name)));

    for email in &record.emails {
        push_line(out, &format!("EMAIL:{}", escape_text(email)));
    }
    for phone in &record.phones {
        push_line(out, &format!("TEL:{}", escape_text(phone)));
    }
    for url in &record.urls {
        push_line(out, &format!("URL:{}", escape_text(url)));
    }

    if record.has_organization() {
        let org = record
            .organizations
            .iter()
            .map(|o| escape_text(o))
            .collect::<Vec<_>>()
            .join(";");
        push_line(out, &format!("ORG:{org}"));
    }
    if !record.title.trim().is_empty() {
        push_line(out, &format!("TITLE:{}", escape_text(record.title.trim())));
    }
    if !record.note.trim().is_empty() {
        push_line(out, &format!("NOTE:{}", escape_text(&record.note)));
    }
    if let Some(birthday) = &record.birthday {
        push_line(out, &format!("BDAY:{birthday}"));
    }

    for address in &record.addresses {
        push_line(out, &encode_address(address));
    }

    if destination == Destination::Apple {
        if let Some(photo_line) = &record.photo {
            // Preserved verbatim: the original parameters (ENCODING,
            // TYPE) must survive untouched.
            push_line(out, photo_line);
        }
        for extension in &record.extensions {
            for line in &extension.lines {
                push_line(out, line);
            }
        }
    }

    push_line(out, "END:VCARD");
}

/// Formats the N property value, synthesizing components from the display
/// name when no structured name was decoded.
fn structured_name(record: &ContactRecord, display_name: &str) -> String {
    let name = record
        .name
        .clone()
        .unwrap_or_else(|| synthesize_name(display_name));
    format!(
        "{};{};{};{};{}",
        escape_text(&name.family),
        escape_text(&name.given),
        escape_text(&name.middle),
        escape_text(&name.prefix),
        escape_text(&name.suffix),
    )
}

/// Splits a display name on whitespace: last token becomes the family
/// name, first the given name, anything between the middle names. A
/// single token is given-name only.
fn synthesize_name(display_name: &str) -> NameParts {
    let tokens: Vec<&str> = display_name.split_whitespace().collect();
    match tokens.as_slice() {
        [] => NameParts::default(),
        [only] => NameParts {
            given: (*only).to_string(),
            ..NameParts::default()
        },
        [given, middle @ .., family] => NameParts {
            family: (*family).to_string(),
            given: (*given).to_string(),
            middle: middle.join(" "),
            ..NameParts::default()
        },
    }
}

fn encode_address(address: &PostalAddress) -> String {
    let mut line = String::from("ADR");
    if !address.types.is_empty() {
        line.push_str(";TYPE=");
        line.push_str(&address.types.join(","));
    }
    line.push(':');
    line.push_str(&format!(
        "{};{};{};{};{};{};{}",
        escape_text(&address.po_box),
        escape_text(&address.extended),
        escape_text(&address.street),
        escape_text(&address.locality),
        escape_text(&address.region),
        escape_text(&address.postal_code),
        escape_text(&address.country),
    ));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardfold_core::record::{ExtensionProperty, PostalAddress, Source};

    fn record(name: &str) -> ContactRecord {
        let mut r = ContactRecord::new("uid-1", Source::Google);
        r.full_name = name.to_string();
        r
    }

    fn lines(document: &str) -> Vec<&str> {
        document.split("\r\n").filter(|l| !l.is_empty()).collect()
    }

    #[test]
    fn minimal_card_layout() {
        let mut r = record("Jane Doe");
        r.push_email("jane@example.org");

        let doc = encode(&[r], Destination::Google);
        assert_eq!(
            lines(&doc),
            vec![
                "BEGIN:VCARD",
                "VERSION:3.0",
                "UID:uid-1",
                "FN:Jane Doe",
                "N:Doe;Jane;;;",
                "EMAIL:jane@example.org",
                "END:VCARD",
            ]
        );
    }

    #[test]
    fn apple_card_carries_prodid() {
        let doc = encode(&[record("Jane Doe")], Destination::Apple);
        assert!(doc.contains("PRODID:-//cardfold//EN\r\n"));
    }

    #[test]
    fn google_card_has_no_prodid() {
        let doc = encode(&[record("Jane Doe")], Destination::Google);
        assert!(!doc.contains("PRODID"));
    }

    #[test]
    fn empty_name_falls_back_to_placeholder() {
        let doc = encode(&[record("   ")], Destination::Google);
        assert!(doc.contains("FN:Unknown\r\n"));
        assert!(doc.contains("N:;Unknown;;;\r\n"));
    }

    #[test]
    fn decoded_structured_name_wins_over_synthesis() {
        let mut r = record("Dr. Jane van der Doe");
        r.name = Some(NameParts {
            family: "van der Doe".to_string(),
            given: "Jane".to_string(),
            prefix: "Dr.".to_string(),
            ..NameParts::default()
        });
        let doc = encode(&[r], Destination::Google);
        assert!(doc.contains("N:van der Doe;Jane;;Dr.;\r\n"));
    }

    #[test]
    fn three_token_name_synthesis() {
        let doc = encode(&[record("Jane van Doe")], Destination::Google);
        assert!(doc.contains("N:Doe;Jane;van;;\r\n"));
    }

    #[test]
    fn special_characters_escaped_in_values() {
        let mut r = record("Doe, Jane");
        r.note = "line one\nline two; with semicolon".to_string();
        r.push_phone("+15551234567".to_string());
        let doc = encode(&[r], Destination::Google);
        assert!(doc.contains("FN:Doe\\, Jane\r\n"));
        assert!(doc.contains("NOTE:line one\\nline two\\; with semicolon\r\n"));
    }

    #[test]
    fn photo_and_extensions_only_for_apple() {
        let mut r = record("Jane Doe");
        r.photo = Some("PHOTO;ENCODING=b;TYPE=JPEG:AAAA".to_string());
        r.extensions.push(ExtensionProperty {
            name: "X-ABLABEL".to_string(),
            lines: vec!["item1.X-ABLABEL:Telegram".to_string()],
        });

        let apple = encode(std::slice::from_ref(&r), Destination::Apple);
        assert!(apple.contains("PHOTO;ENCODING=b;TYPE=JPEG:AAAA\r\n"));
        assert!(apple.contains("item1.X-ABLABEL:Telegram\r\n"));

        let google = encode(&[r], Destination::Google);
        assert!(!google.contains("PHOTO"));
        assert!(!google.contains("X-ABLABEL"));
    }

    #[test]
    fn organization_joined_with_semicolons() {
        let mut r = record("Jane Doe");
        r.push_organization("Acme Corp");
        r.push_organization("R&D");
        r.title = "Engineer".to_string();
        let doc = encode(&[r], Destination::Google);
        assert!(doc.contains("ORG:Acme Corp;R&D\r\n"));
        assert!(doc.contains("TITLE:Engineer\r\n"));
    }

    #[test]
    fn address_with_types() {
        let mut r = record("Jane Doe");
        r.addresses.push(PostalAddress {
            street: "123 Main St".to_string(),
            locality: "Anytown".to_string(),
            postal_code: "12345".to_string(),
            country: "USA".to_string(),
            types: vec!["HOME".to_string(), "pref".to_string()],
            ..PostalAddress::default()
        });
        let doc = encode(&[r], Destination::Google);
        assert!(doc.contains("ADR;TYPE=HOME,pref:;;123 Main St;Anytown;;12345;USA\r\n"));
    }

    #[test]
    fn long_line_is_folded() {
        let mut r = record("Jane Doe");
        r.note = "x".repeat(120);
        let doc = encode(&[r], Destination::Google);
        assert!(doc.contains("\r\n "));
        for line in doc.split("\r\n") {
            assert!(line.chars().count() <= 75, "overlong line: {line}");
        }
    }

    #[test]
    fn every_card_is_terminated() {
        let doc = encode(
            &[record("Jane Doe"), record("John Smith")],
            Destination::Google,
        );
        assert_eq!(doc.matches("BEGIN:VCARD").count(), 2);
        assert_eq!(doc.matches("END:VCARD").count(), 2);
        assert!(doc.ends_with("END:VCARD\r\n"));
    }
}
