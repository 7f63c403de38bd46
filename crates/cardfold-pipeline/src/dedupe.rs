//! Duplicate detection and merging.
//!
//! Two exports of the same address book overlap heavily; this stage folds
//! records that describe the same person into one. Matching is on strong
//! identity signals only (shared email, shared phone, or a confident name
//! match), never on fuzzy similarity.

use cardfold_core::record::ContactRecord;

/// Lowercases and strips a display name down to its letters.
///
/// Digits, punctuation, and diacritic-free symbols are dropped; runs of
/// whitespace collapse to one space. "José van der Berg" and
/// "josé  van der berg." normalize identically.
fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;

    for c in name.chars() {
        if c.is_alphabetic() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(c.to_lowercase());
        } else {
            pending_space = true;
        }
    }

    out
}

/// Whether two records describe the same person.
///
/// True when they share an email, share a phone, have equal normalized
/// display names of at least two words each, or both carry structured
/// names whose given and family components match after normalization.
#[must_use]
pub fn are_same(a: &ContactRecord, b: &ContactRecord) -> bool {
    if a.emails.iter().any(|e| b.emails.contains(e)) {
        return true;
    }
    if a.phones.iter().any(|p| b.phones.contains(p)) {
        return true;
    }

    let name_a = normalize_name(&a.full_name);
    let name_b = normalize_name(&b.full_name);
    if !name_a.is_empty()
        && name_a == name_b
        && name_a.split(' ').count() >= 2
    {
        return true;
    }

    if let (Some(na), Some(nb)) = (a.name.as_ref(), b.name.as_ref())
        && na.has_given_and_family()
        && nb.has_given_and_family()
        && normalize_name(&na.given) == normalize_name(&nb.given)
        && normalize_name(&na.family) == normalize_name(&nb.family)
    {
        return true;
    }

    false
}

/// Folds duplicates into their first appearance.
///
/// Greedy left-to-right: each unabsorbed record absorbs every later
/// unabsorbed record it matches. Because merging adds emails and phones,
/// an absorbed record can transitively connect the survivor to records it
/// did not originally match. Returns the surviving records in original
/// order and the number of merges performed.
#[must_use]
pub fn consolidate(records: Vec<ContactRecord>) -> (Vec<ContactRecord>, usize) {
    let mut records = records;
    let mut absorbed = vec![false; records.len()];
    let mut merged_count = 0;

    for i in 0..records.len() {
        if absorbed[i] {
            continue;
        }
        for j in (i + 1)..records.len() {
            if absorbed[j] {
                continue;
            }
            if are_same(&records[i], &records[j]) {
                let donor = records[j].clone();
                merge(&mut records[i], &donor);
                absorbed[j] = true;
                merged_count += 1;
                tracing::debug!(
                    survivor = %records[i].uid,
                    donor = %donor.uid,
                    "merged duplicate record"
                );
            }
        }
    }

    let survivors = records
        .into_iter()
        .zip(absorbed)
        .filter_map(|(record, gone)| (!gone).then_some(record))
        .collect();

    (survivors, merged_count)
}

/// Merges `donor` into `survivor`, asymmetrically: the survivor keeps what
/// it has and fills its gaps from the donor. List fields are unioned.
fn merge(survivor: &mut ContactRecord, donor: &ContactRecord) {
    for email in &donor.emails {
        survivor.push_email(email);
    }
    for phone in &donor.phones {
        survivor.push_phone(phone.clone());
    }
    for url in &donor.urls {
        survivor.push_url(url);
    }
    for org in &donor.organizations {
        survivor.push_organization(org);
    }

    for address in &donor.addresses {
        let already_present = survivor.addresses.iter().any(|a| {
            a.street == address.street
                && a.locality == address.locality
                && a.postal_code == address.postal_code
        });
        if !already_present {
            survivor.addresses.push(address.clone());
        }
    }

    match (&mut survivor.name, &donor.name) {
        (None, Some(name)) => survivor.name = Some(name.clone()),
        (Some(ours), Some(theirs)) => {
            if ours.given.is_empty() {
                ours.given = theirs.given.clone();
            }
            if ours.family.is_empty() {
                ours.family = theirs.family.clone();
            }
        }
        _ => {}
    }

    // A strictly longer display name is assumed to be the more complete
    // one ("Jane Doe" loses to "Jane van der Doe").
    if donor.full_name.chars().count() > survivor.full_name.chars().count() {
        survivor.full_name = donor.full_name.clone();
    }

    if survivor.title.trim().is_empty() && !donor.title.trim().is_empty() {
        survivor.title = donor.title.clone();
    }
    if survivor.note.trim().is_empty() && !donor.note.trim().is_empty() {
        survivor.note = donor.note.clone();
    }
    if survivor.birthday.is_none() {
        survivor.birthday.clone_from(&donor.birthday);
    }
    if survivor.photo.is_none() {
        survivor.photo.clone_from(&donor.photo);
    }

    // Vendor extensions are only adopted for property names the survivor
    // lacks entirely; duplicating label groups corrupts Apple imports.
    for extension in &donor.extensions {
        if !survivor.has_extension(&extension.name) {
            survivor.extensions.push(extension.clone());
        }
    }
}
