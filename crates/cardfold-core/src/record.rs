//! Contact record model.
//!
//! One `ContactRecord` corresponds to one vCard block. The schema is fixed
//! except for `extensions`, which preserves unrecognized vendor properties
//! as their original raw lines for lossless re-emission.

/// Which export a record was read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Source {
    /// Google Contacts export.
    #[default]
    Google,
    /// Apple Contacts export.
    Apple,
}

/// Which importer an output document is formatted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Google Contacts import: no PRODID, no PHOTO, no vendor extensions.
    Google,
    /// Apple Contacts import: PRODID, PHOTO, and vendor extensions emitted.
    Apple,
}

/// Decomposed name (N property).
///
/// All components are optional; an empty string means absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParts {
    /// Family name (surname).
    pub family: String,
    /// Given name (first name).
    pub given: String,
    /// Middle names, space-joined.
    pub middle: String,
    /// Honorific prefix (e.g., "Dr.").
    pub prefix: String,
    /// Honorific suffix (e.g., "Jr.").
    pub suffix: String,
}

impl NameParts {
    /// Returns whether every component is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.family.is_empty()
            && self.given.is_empty()
            && self.middle.is_empty()
            && self.prefix.is_empty()
            && self.suffix.is_empty()
    }

    /// Returns whether both given and family names are populated.
    #[must_use]
    pub fn has_given_and_family(&self) -> bool {
        !self.given.is_empty() && !self.family.is_empty()
    }
}

/// Postal address (ADR property): seven positional components plus type tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalAddress {
    /// Post office box.
    pub po_box: String,
    /// Extended address (apartment, suite).
    pub extended: String,
    /// Street address.
    pub street: String,
    /// Locality (city).
    pub locality: String,
    /// Region (state or province).
    pub region: String,
    /// Postal code.
    pub postal_code: String,
    /// Country name.
    pub country: String,
    /// TYPE parameter values (e.g., "home", "work").
    pub types: Vec<String>,
}

impl PostalAddress {
    /// Returns whether every positional component is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.po_box.is_empty()
            && self.extended.is_empty()
            && self.street.is_empty()
            && self.locality.is_empty()
            && self.region.is_empty()
            && self.postal_code.is_empty()
            && self.country.is_empty()
    }
}

/// An unrecognized property preserved for round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionProperty {
    /// Uppercased property name (e.g., "X-ABLABEL").
    pub name: String,
    /// Original lines in order of appearance, values unescaped.
    pub lines: Vec<String>,
}

/// One contact record, the unit of work for the whole pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactRecord {
    /// Opaque stable identifier; provenance only, never business logic.
    pub uid: String,
    /// Which export the record came from.
    pub source: Source,
    /// Free-text full name (FN). Held raw (still escaped) between decode
    /// and repair so the mangled-CSV detector can see `\,` markers.
    pub full_name: String,
    /// Decomposed name (N), independent of `full_name`.
    pub name: Option<NameParts>,
    /// Normalized lowercase addresses, first-appearance order, no duplicates.
    pub emails: Vec<String>,
    /// Normalized digit strings (optionally `+`-prefixed), no duplicates.
    pub phones: Vec<String>,
    /// Employer/division names in order of appearance.
    pub organizations: Vec<String>,
    /// Free-text job title.
    pub title: String,
    /// Free-text note; may hold structured data until extraction runs.
    pub note: String,
    /// Link strings in order of appearance, no duplicates.
    pub urls: Vec<String>,
    /// Postal addresses in order of appearance.
    pub addresses: Vec<PostalAddress>,
    /// Date-like string, passed through verbatim.
    pub birthday: Option<String>,
    /// Embedded or linked image reference, passed through verbatim.
    pub photo: Option<String>,
    /// Unrecognized properties, preserved in order of first appearance.
    pub extensions: Vec<ExtensionProperty>,
}

impl ContactRecord {
    /// Creates an empty record with the given identifier and source.
    #[must_use]
    pub fn new(uid: impl Into<String>, source: Source) -> Self {
        Self {
            uid: uid.into(),
            source,
            ..Self::default()
        }
    }

    /// Adds an email if its lowercased form is not already present.
    pub fn push_email(&mut self, email: &str) {
        let normalized = email.trim().to_ascii_lowercase();
        if !normalized.is_empty() && !self.emails.contains(&normalized) {
            self.emails.push(normalized);
        }
    }

    /// Adds an already-normalized phone if not already present.
    pub fn push_phone(&mut self, phone: String) {
        if !phone.is_empty() && !self.phones.contains(&phone) {
            self.phones.push(phone);
        }
    }

    /// Adds a URL if not already present.
    pub fn push_url(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() && !self.urls.iter().any(|u| u == url) {
            self.urls.push(url.to_string());
        }
    }

    /// Adds an organization if not already present (exact match).
    pub fn push_organization(&mut self, org: &str) {
        let org = org.trim();
        if !org.is_empty() && !self.organizations.iter().any(|o| o == org) {
            self.organizations.push(org.to_string());
        }
    }

    /// Appends a raw line to the named extension property, creating the
    /// entry on first appearance.
    pub fn push_extension_line(&mut self, name: &str, line: String) {
        if let Some(entry) = self.extensions.iter_mut().find(|e| e.name == name) {
            entry.lines.push(line);
        } else {
            self.extensions.push(ExtensionProperty {
                name: name.to_string(),
                lines: vec![line],
            });
        }
    }

    /// Returns whether the record has an extension property with this name.
    #[must_use]
    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|e| e.name == name)
    }

    /// Returns whether any organization entry is non-blank.
    #[must_use]
    pub fn has_organization(&self) -> bool {
        self.organizations.iter().any(|o| !o.trim().is_empty())
    }

    /// Returns whether any address has at least one populated component.
    #[must_use]
    pub fn has_address(&self) -> bool {
        self.addresses.iter().any(|a| !a.is_empty())
    }
}
