//! Quality filter: keep/discard classification.
//!
//! The rules form an ordered cascade, first match wins. Order matters for
//! the reported reason (diagnostics compare run to run), so the cascade is
//! an explicit slice of (reason, predicate) pairs rather than nested
//! conditionals. Every rule is a pure discard predicate; no rule
//! re-enables a record discarded by an earlier one.

use cardfold_core::record::{ContactRecord, NameParts};

/// The outcome of classifying one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the record survives the filter.
    pub keep: bool,
    /// Human-readable discard reason; empty when kept. Diagnostics only,
    /// never logic.
    pub reason: &'static str,
}

impl Verdict {
    const KEEP: Self = Self {
        keep: true,
        reason: "",
    };

    const fn discard(reason: &'static str) -> Self {
        Self {
            keep: false,
            reason,
        }
    }
}

/// Name suffixes that mark a domain name rather than a person.
const DOMAIN_SUFFIXES: &[&str] = &[
    ".com", ".org", ".net", ".io", ".co", ".uk", ".de", ".nl",
];

/// Name prefixes that mark leaked field labels or exporter metadata.
const METADATA_PREFIXES: &[&str] = &[
    "Work:",
    "Home:",
    "Email:",
    "E-mail",
    "Organization:",
    "Note:",
    "Home Page:",
    "First Name:",
    "Research",
    "SOURCE:",
    "US-\"",
    "android-",
    "Normal",
    "My Contacts",
];

/// Names that are placeholders or role accounts, never people.
const GENERIC_NAMES: &[&str] = &[
    "help",
    "hello",
    "admin",
    "support",
    "info",
    "contact",
    "service",
    "team",
    "sales",
    "marketing",
    "noreply",
    "no-reply",
    "donotreply",
    "test",
    "demo",
    "example",
    "sample",
    "default",
    "user",
    "guest",
    "anonymous",
    "unknown",
    "temp",
    "temporary",
];

/// Email domains of large corporations; contacts carrying only such an
/// address are almost always stale imports, not people one knows.
const CORPORATE_DOMAINS: &[&str] = &[
    "google.com",
    "twitter.com",
    "x.com",
    "googlegroups.com",
    "facebook.com",
    "meta.com",
    "microsoft.com",
    "amazon.com",
    "apple.com",
    "netflix.com",
    "uber.com",
    "airbnb.com",
    "linkedin.com",
    "salesforce.com",
    "oracle.com",
];

/// Substrings marking automated service mailboxes.
const SERVICE_PATTERNS: &[&str] = &[
    "noreply",
    "no-reply",
    "donotreply",
    "notification",
    "alert",
    "info@",
    "support@",
    "admin@",
    "webmaster@",
    "newsletter",
    "updates@",
    "news@",
    "mailer@",
    "daemon@",
    "postmaster@",
];

struct Rule {
    reason: &'static str,
    applies: fn(&ContactRecord) -> bool,
}

/// The cascade, in evaluation order. The order is part of the contract.
const RULES: &[Rule] = &[
    Rule {
        reason: "no name",
        applies: |r| fname(r).is_empty(),
    },
    Rule {
        reason: "email address used as name",
        applies: |r| fname(r).contains('@') && fname(r).contains('.'),
    },
    Rule {
        reason: "mangled or garbage name",
        applies: |r| fname(r).contains(['\\', '{', '}', '[', ']', '<', '>']),
    },
    Rule {
        reason: "address data leaked into name",
        applies: |r| fname(r).contains('"'),
    },
    Rule {
        reason: "oversized garbage name",
        applies: |r| fname(r).chars().count() > 50,
    },
    Rule {
        reason: "phone number used as name",
        applies: name_is_phone,
    },
    Rule {
        reason: "gibberish name",
        applies: name_is_gibberish,
    },
    Rule {
        reason: "name too short to verify",
        applies: |r| (1..=3).contains(&fname(r).chars().count()) && r.phones.is_empty(),
    },
    Rule {
        reason: "bare handle without phone",
        applies: |r| {
            fname(r).starts_with(|c: char| c.is_ascii_lowercase())
                && !fname(r).contains(' ')
                && r.phones.is_empty()
        },
    },
    Rule {
        reason: "initials only",
        applies: |r| {
            let words: Vec<&str> = fname(r).split_whitespace().collect();
            words.len() >= 2 && words.iter().all(|w| w.chars().count() <= 2)
        },
    },
    Rule {
        reason: "metadata in name",
        applies: name_has_parenthesized_number,
    },
    Rule {
        reason: "domain name as name",
        applies: |r| {
            let lowered = fname(r).to_ascii_lowercase();
            DOMAIN_SUFFIXES.iter().any(|s| lowered.ends_with(s))
        },
    },
    Rule {
        reason: "metadata prefix in name",
        applies: |r| METADATA_PREFIXES.iter().any(|p| fname(r).starts_with(p)),
    },
    Rule {
        reason: "generic placeholder name",
        applies: name_is_generic_word,
    },
    Rule {
        reason: "short single name, only email",
        applies: |r| {
            single_word(r)
                && fname(r).chars().count() <= 6
                && !r.emails.is_empty()
                && r.phones.is_empty()
                && !r.has_organization()
                && r.title.trim().is_empty()
                && !r.has_address()
                && r.birthday.is_none()
                && !verified_name_pair(r)
        },
    },
    Rule {
        reason: "single name with only an email",
        applies: |r| {
            single_word(r)
                && !verified_name_pair(r)
                && !r.emails.is_empty()
                && r.phones.is_empty()
                && r.urls.is_empty()
        },
    },
    Rule {
        reason: "given name duplicated as family name",
        applies: |r| {
            r.name.as_ref().is_some_and(|n| {
                n.has_given_and_family()
                    && !n.given.contains(' ')
                    && !n.family.contains(' ')
                    && n.given.eq_ignore_ascii_case(&n.family)
            })
        },
    },
    Rule {
        reason: "name only, no contact method",
        applies: |r| {
            r.phones.is_empty()
                && r.emails.is_empty()
                && r.urls.is_empty()
                && !r.has_address()
                && !r.has_organization()
                && r.title.trim().is_empty()
                && r.note.trim().is_empty()
                && r.photo.is_none()
                && r.birthday.is_none()
        },
    },
    Rule {
        reason: "URL only",
        applies: |r| {
            !r.urls.is_empty()
                && r.phones.is_empty()
                && r.emails.is_empty()
                && !r.has_organization()
                && r.title.trim().is_empty()
        },
    },
    Rule {
        reason: "bare LinkedIn link only",
        applies: |r| {
            !r.urls.is_empty()
                && r.urls.iter().all(|u| u.contains("linkedin"))
                && r.phones.is_empty()
                && r.emails.is_empty()
                && !r.has_organization()
                && r.title.trim().is_empty()
        },
    },
    Rule {
        reason: "stale corporate import",
        applies: |r| {
            !r.emails.is_empty()
                && r.phones.is_empty()
                && r.emails.iter().all(|e| {
                    e.rsplit_once('@')
                        .is_some_and(|(_, domain)| CORPORATE_DOMAINS.contains(&domain))
                })
        },
    },
    Rule {
        reason: "service mailbox",
        applies: service_mailbox,
    },
    Rule {
        reason: "no name and no organization",
        applies: |r| fname(r).is_empty() && r.organizations.is_empty(),
    },
];

/// Classifies one record. Pure: two calls on an unmodified record always
/// agree.
#[must_use]
pub fn classify(record: &ContactRecord) -> Verdict {
    if telegram_immune(record) {
        return Verdict::KEEP;
    }

    for rule in RULES {
        if (rule.applies)(record) {
            return Verdict::discard(rule.reason);
        }
    }

    Verdict::KEEP
}

/// A record with a Telegram item label is kept unconditionally: the label
/// proves a live messaging relationship regardless of how thin the rest
/// of the card is.
fn telegram_immune(record: &ContactRecord) -> bool {
    record
        .extensions
        .iter()
        .filter(|e| e.name.contains("ABLABEL"))
        .any(|e| {
            e.lines
                .iter()
                .any(|l| l.to_ascii_lowercase().contains("telegram"))
        })
}

fn fname(record: &ContactRecord) -> &str {
    record.full_name.trim()
}

fn single_word(record: &ContactRecord) -> bool {
    !fname(record).contains(char::is_whitespace)
}

/// Whether the structured name is a verified first+last pair.
fn verified_name_pair(record: &ContactRecord) -> bool {
    record
        .name
        .as_ref()
        .is_some_and(NameParts::has_given_and_family)
}

fn name_is_phone(record: &ContactRecord) -> bool {
    let stripped: String = fname(record)
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')' | '+'))
        .collect();
    stripped.chars().count() >= 7 && stripped.chars().all(|c| c.is_ascii_digit())
}

/// A single alphanumeric token mixing letters and digits is gibberish,
/// unless it is shaped like a handle: letters followed by 1-4 digits.
fn name_is_gibberish(record: &ContactRecord) -> bool {
    let name = fname(record);
    if name.contains(' ') || name.is_empty() {
        return false;
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }

    let has_letter = name.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = name.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return false;
    }

    !is_handle_shaped(name)
}

/// Letters followed by 1-4 digits, e.g. "kees83".
fn is_handle_shaped(name: &str) -> bool {
    let letter_count = name.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    let digits = &name[letter_count..];
    letter_count > 0
        && (1..=4).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
}

fn name_has_parenthesized_number(record: &ContactRecord) -> bool {
    let name = fname(record);
    let mut rest = name;
    while let Some(open) = rest.find('(') {
        let after = &rest[open + 1..];
        if let Some(close) = after.find(')') {
            let inner = &after[..close];
            if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
                return true;
            }
            rest = &after[close + 1..];
        } else {
            return false;
        }
    }
    false
}

fn name_is_generic_word(record: &ContactRecord) -> bool {
    let matches_list = |s: &str| {
        !s.is_empty() && GENERIC_NAMES.iter().any(|g| s.eq_ignore_ascii_case(g))
    };

    if matches_list(fname(record)) {
        return true;
    }
    record
        .name
        .as_ref()
        .is_some_and(|n| matches_list(&n.given) || matches_list(&n.family))
}

/// Service mailbox: every email matches a service pattern, no phone, and
/// exactly one of given/family is populated. A record with no structured
/// name at all does not trigger this rule.
fn service_mailbox(record: &ContactRecord) -> bool {
    if record.emails.is_empty() || !record.phones.is_empty() {
        return false;
    }

    let all_service = record.emails.iter().all(|email| {
        let local = email.split('@').next().unwrap_or_default();
        SERVICE_PATTERNS
            .iter()
            .any(|p| local.contains(p) || email.contains(p))
    });
    if !all_service {
        return false;
    }

    record
        .name
        .as_ref()
        .is_some_and(|n| !n.given.is_empty() ^ !n.family.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardfold_core::record::{ExtensionProperty, PostalAddress, Source};

    fn record(name: &str) -> ContactRecord {
        let mut r = ContactRecord::new("r1", Source::Google);
        r.full_name = name.to_string();
        r
    }

    fn assert_discarded(record: &ContactRecord, reason: &str) {
        let verdict = classify(record);
        assert!(!verdict.keep, "expected discard, kept: {record:?}");
        assert_eq!(verdict.reason, reason);
    }

    #[test]
    fn keeps_complete_record() {
        let mut r = record("Jane Doe");
        r.push_email("jane@example.org");
        r.push_phone("5551234567".to_string());
        let verdict = classify(&r);
        assert!(verdict.keep);
        assert_eq!(verdict.reason, "");
    }

    #[test]
    fn classify_is_deterministic() {
        let mut r = record("Support");
        r.push_email("support@company.com");
        assert_eq!(classify(&r), classify(&r));
    }

    #[test]
    fn discards_empty_name() {
        assert_discarded(&record("   "), "no name");
    }

    #[test]
    fn discards_email_as_name() {
        let mut r = record("jane@example.org");
        r.push_phone("5551234567".to_string());
        assert_discarded(&r, "email address used as name");
    }

    #[test]
    fn discards_mangled_name() {
        let mut r = record(r"Jane \n Doe");
        r.push_phone("5551234567".to_string());
        assert_discarded(&r, "mangled or garbage name");
    }

    #[test]
    fn discards_quoted_name() {
        let mut r = record("\"42 Main St\" Doe");
        r.push_phone("5551234567".to_string());
        assert_discarded(&r, "address data leaked into name");
    }

    #[test]
    fn discards_oversized_name() {
        let mut r = record(&"long name ".repeat(8));
        r.push_phone("5551234567".to_string());
        assert_discarded(&r, "oversized garbage name");
    }

    #[test]
    fn discards_phone_as_name() {
        let mut r = record("+31 (6) 1234-5678");
        r.push_phone("5551234567".to_string());
        assert_discarded(&r, "phone number used as name");
    }

    #[test]
    fn discards_gibberish_token() {
        // Spec scenario: fails the letters+digits handle exemption.
        let r = record("D7k5wt3q46");
        assert_discarded(&r, "gibberish name");
    }

    #[test]
    fn handle_shaped_name_passes_gibberish_rule() {
        let mut r = record("kees83");
        r.push_phone("5551234567".to_string());
        r.push_email("kees83@example.org");
        assert!(classify(&r).keep);
    }

    #[test]
    fn discards_too_short_name_without_phone() {
        let mut r = record("Jo");
        r.push_email("jo@personal.example");
        r.push_url("https://jo.example");
        assert_discarded(&r, "name too short to verify");
    }

    #[test]
    fn short_name_with_phone_survives_length_rule() {
        let mut r = record("Jo");
        r.push_phone("5551234567".to_string());
        assert!(classify(&r).keep);
    }

    #[test]
    fn discards_bare_handle_without_phone() {
        let mut r = record("wanderer_88b");
        r.push_email("wanderer@personal.example");
        r.push_url("https://w.example");
        assert_discarded(&r, "bare handle without phone");
    }

    #[test]
    fn discards_initials_only() {
        let mut r = record("J. D.");
        r.push_phone("5551234567".to_string());
        assert_discarded(&r, "initials only");
    }

    #[test]
    fn discards_parenthesized_number() {
        let mut r = record("Maria (38)");
        r.push_phone("5551234567".to_string());
        assert_discarded(&r, "metadata in name");
    }

    #[test]
    fn discards_domain_suffix_regardless_of_contact_methods() {
        // Spec scenario 6.
        let mut r = record("Guru.com");
        r.push_email("sales@guru.example");
        r.push_phone("5551234567".to_string());
        assert_discarded(&r, "domain name as name");
    }

    #[test]
    fn discards_metadata_prefix() {
        let mut r = record("Work: Amsterdam office");
        r.push_phone("5551234567".to_string());
        assert_discarded(&r, "metadata prefix in name");
    }

    #[test]
    fn generic_name_fires_before_service_email() {
        // Spec scenario 5: "Support" hits the generic-name rule, not the
        // service-mailbox rule further down.
        let mut r = record("Support");
        r.push_email("support@company.com");
        assert_discarded(&r, "generic placeholder name");
    }

    #[test]
    fn generic_family_name_also_fires() {
        let mut r = record("Aname Surname");
        r.name = Some(NameParts {
            given: "Aname".to_string(),
            family: "Unknown".to_string(),
            ..NameParts::default()
        });
        r.push_phone("5551234567".to_string());
        assert_discarded(&r, "generic placeholder name");
    }

    #[test]
    fn discards_short_single_name_with_only_email() {
        let mut r = record("Wimke");
        r.push_email("wimke@personal.example");
        r.push_url("https://wimke.example");
        assert_discarded(&r, "short single name, only email");
    }

    #[test]
    fn discards_single_name_email_no_url() {
        let mut r = record("Annemarie");
        r.push_email("annemarie@personal.example");
        assert_discarded(&r, "single name with only an email");
    }

    #[test]
    fn verified_pair_exempts_single_word_rules() {
        let mut r = record("Cher");
        r.name = Some(NameParts {
            given: "Cher".to_string(),
            family: "Sarkisian".to_string(),
            ..NameParts::default()
        });
        r.push_email("cher@example.org");
        r.push_url("https://cher.example");
        assert!(classify(&r).keep);
    }

    #[test]
    fn discards_duplicated_name_token() {
        let mut r = record("Martin Martin");
        r.name = Some(NameParts {
            given: "Martin".to_string(),
            family: "martin".to_string(),
            ..NameParts::default()
        });
        r.push_phone("5551234567".to_string());
        assert_discarded(&r, "given name duplicated as family name");
    }

    #[test]
    fn discards_record_with_no_contact_method() {
        assert_discarded(&record("Jane Doe"), "name only, no contact method");
    }

    #[test]
    fn note_counts_as_contact_method() {
        let mut r = record("Jane Doe");
        r.note = "met at the gym".to_string();
        assert!(classify(&r).keep);
    }

    #[test]
    fn populated_address_counts_as_contact_method() {
        let mut r = record("Jane Doe");
        r.addresses.push(PostalAddress {
            street: "123 Main St".to_string(),
            ..PostalAddress::default()
        });
        assert!(classify(&r).keep);
    }

    #[test]
    fn discards_url_only_record() {
        let mut r = record("Jane Doe");
        r.push_url("https://jane.example");
        assert_discarded(&r, "URL only");
    }

    #[test]
    fn url_with_title_survives() {
        let mut r = record("Jane Doe");
        r.push_url("https://jane.example");
        r.title = "Engineer".to_string();
        assert!(classify(&r).keep);
    }

    #[test]
    fn discards_all_corporate_emails_without_phone() {
        let mut r = record("Jane Doe");
        r.push_email("jane@google.com");
        r.push_email("jane@linkedin.com");
        assert_discarded(&r, "stale corporate import");
    }

    #[test]
    fn corporate_email_with_phone_survives() {
        let mut r = record("Jane Doe");
        r.push_email("jane@google.com");
        r.push_phone("5551234567".to_string());
        assert!(classify(&r).keep);
    }

    #[test]
    fn mixed_domains_survive_corporate_rule() {
        let mut r = record("Jane Doe");
        r.push_email("jane@google.com");
        r.push_email("jane@personal.example");
        assert!(classify(&r).keep);
    }

    #[test]
    fn discards_service_mailbox_with_half_name() {
        let mut r = record("Acme Newsletter");
        r.name = Some(NameParts {
            given: "Acme".to_string(),
            ..NameParts::default()
        });
        r.push_email("newsletter@acme.example");
        assert_discarded(&r, "service mailbox");
    }

    #[test]
    fn service_mailbox_rule_needs_structured_name() {
        // The exactly-one-of gate: no structured name, no trigger.
        let mut r = record("Acme Newsletter");
        r.push_email("newsletter@acme.example");
        assert!(classify(&r).keep);
    }

    #[test]
    fn service_mailbox_rule_skips_full_pairs() {
        let mut r = record("Jane Doe");
        r.name = Some(NameParts {
            given: "Jane".to_string(),
            family: "Doe".to_string(),
            ..NameParts::default()
        });
        r.push_email("jane.alert@example.org");
        assert!(classify(&r).keep);
    }

    #[test]
    fn telegram_label_is_immune() {
        let mut r = record("x");
        r.extensions.push(ExtensionProperty {
            name: "X-ABLABEL".to_string(),
            lines: vec!["item5.X-ABLABEL:Telegram".to_string()],
        });
        let verdict = classify(&r);
        assert!(verdict.keep);
        assert_eq!(verdict.reason, "");
    }

    #[test]
    fn non_label_extension_is_not_immune() {
        let mut r = record("x");
        r.extensions.push(ExtensionProperty {
            name: "X-SOCIALPROFILE".to_string(),
            lines: vec!["X-SOCIALPROFILE:https://t.me/telegramuser".to_string()],
        });
        assert!(!classify(&r).keep);
    }
}
