//! Phone number canonicalization.
//!
//! Numbers are reduced to E.164 (`+<calling code><national significant number>`) so that
//! the same number typed with spaces, a trunk zero, or an explicit country code compares
//! equal. Parsing and validity come from the libphonenumber metadata shipped with the
//! `phonenumber` crate; input is screened for stray characters before it reaches the
//! parser, which would otherwise read letters as vanity digits.

use std::fmt;
use std::hash::{Hash, Hasher};

use phonenumber::{country, Mode, ParseError, PhoneNumber};
use serde::Serialize;

/// How a number written without `+` is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionHint {
    Region(country::Id),
    CallingCode(u16),
}

impl RegionHint {
    /// Resolve an ISO region (`IN`, `us`) or an assigned calling code (`+91`, `91`).
    pub fn parse(hint: &str) -> Option<Self> {
        let hint = hint.trim();
        let code = hint.strip_prefix('+').unwrap_or(hint);
        if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) {
            let code = code.parse::<u16>().ok().filter(|code| *code < 1000)?;
            return calling_code_is_assigned(code).then_some(RegionHint::CallingCode(code));
        }

        if hint.len() != 2 {
            return None;
        }
        hint.to_ascii_uppercase()
            .parse::<country::Id>()
            .ok()
            .map(RegionHint::Region)
    }

    fn parse_national(self, digits: &str) -> Result<PhoneNumber, ParseError> {
        match self {
            RegionHint::Region(id) => phonenumber::parse(Some(id), digits),
            RegionHint::CallingCode(code) => phonenumber::parse(None, format!("+{code}{digits}")),
        }
    }
}

// Calling codes are prefix-free, so a filler number parses back to `code` only when it is assigned.
fn calling_code_is_assigned(code: u16) -> bool {
    phonenumber::parse(None, format!("+{code}0000000"))
        .map(|number| number.code().value() == code)
        .unwrap_or(false)
}

/// Comparison-ready phone number. Equality and hashing use the E.164 text only.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalPhone {
    #[serde(skip)]
    region: Option<country::Id>,
    e164: String,
}

impl CanonicalPhone {
    pub fn as_str(&self) -> &str {
        &self.e164
    }

    /// Region the number belongs to, when its calling code maps to one.
    pub fn region(&self) -> Option<country::Id> {
        self.region
    }

    pub fn into_string(self) -> String {
        self.e164
    }
}

impl PartialEq for CanonicalPhone {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for CanonicalPhone {}

impl Hash for CanonicalPhone {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

impl fmt::Display for CanonicalPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.e164)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhoneError {
    #[error("phone number is empty")]
    Empty,
    #[error("phone number contains characters other than digits and separators")]
    InvalidCharacters,
    #[error("unsupported region or calling code '{0}'")]
    UnknownRegion(String),
    #[error("unassigned international calling code")]
    UnknownCallingCode,
    #[error("not a valid phone number for its region")]
    InvalidNumber,
}

/// Canonicalize `raw`, using `region_or_calling_code` unless `raw` carries its own `+cc`.
pub fn normalize(raw: &str, region_or_calling_code: &str) -> Result<CanonicalPhone, PhoneError> {
    let (international, digits) = strip_formatting(raw)?;

    let parsed = if international {
        phonenumber::parse(None, format!("+{digits}"))
    } else {
        let hint = RegionHint::parse(region_or_calling_code).ok_or_else(|| {
            PhoneError::UnknownRegion(region_or_calling_code.trim().to_string())
        })?;
        hint.parse_national(&digits)
    };

    let number = parsed.map_err(|error| match error {
        ParseError::InvalidCountryCode => PhoneError::UnknownCallingCode,
        _ => PhoneError::InvalidNumber,
    })?;
    if !phonenumber::is_valid(&number) {
        return Err(PhoneError::InvalidNumber);
    }

    Ok(CanonicalPhone {
        region: number.country().id(),
        e164: number.format().mode(Mode::E164).to_string(),
    })
}

/// Returns whether the number was written in international form, plus its bare digits.
fn strip_formatting(raw: &str) -> Result<(bool, String), PhoneError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PhoneError::Empty);
    }

    let (plus, body) = match trimmed.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let mut digits = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' | '/' => {}
            _ => return Err(PhoneError::InvalidCharacters),
        }
    }

    if digits.is_empty() {
        return Err(PhoneError::Empty);
    }

    if plus {
        return Ok((true, digits));
    }

    match digits.strip_prefix("00") {
        Some(rest) if !rest.is_empty() => Ok((true, rest.to_string())),
        _ => Ok((false, digits)),
    }
}
