//! Registration codes issued to newly created accounts.
//!
//! A well-formed code is the numeric part (1..=999, printed without leading
//! zeros) followed by the batch letters in spreadsheet-column form:
//! `1A` ... `999A`, `1B` ... `999Z`, `1AA`, `1AB`, and so on. The pair
//! `(batch, numeric)` is a bijection of the 1-based issue ordinal.
//!
//! When numbering cannot be derived the allocator issues a [`FallbackCode`]
//! (`ERR-<unix millis>`) instead. Fallback codes never match the well-formed
//! shape, so operators can find and reissue them later.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Number of numeric parts issued before the batch letters advance.
pub const BATCH_SIZE: u64 = 999;

const ALPHABET_LEN: u64 = 26;
const FALLBACK_PREFIX: &str = "ERR-";

/// Largest batch index whose ordinals still fit in a `u64`.
const MAX_BATCH_INDEX: u64 = u64::MAX / BATCH_SIZE - 1;

/// Errors raised when constructing or parsing registration codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationCodeError {
    /// The input was empty once trimmed.
    #[error("registration code must not be empty")]
    Empty,
    /// The input matches neither the issued nor the fallback shape.
    #[error("registration code `{0}` is not well formed")]
    Malformed(String),
    /// The numeric part fell outside `1..=999`.
    #[error("numeric part must be between 1 and {BATCH_SIZE}, got {0}")]
    NumericOutOfRange(u64),
    /// The batch letters encode an index beyond the supported range.
    #[error("batch letters `{0}` exceed the supported range")]
    BatchOverflow(String),
    /// Ordinals start at one.
    #[error("registration ordinals start at 1")]
    ZeroOrdinal,
    /// The fallback timestamp is not a representable instant.
    #[error("fallback timestamp `{0}` is out of range")]
    FallbackTimestamp(String),
}

/// Numeric part of a registration code, always within `1..=999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumericPart(u16);

impl NumericPart {
    /// Validate a numeric part.
    ///
    /// # Examples
    /// ```
    /// use registrar::domain::NumericPart;
    ///
    /// assert_eq!(NumericPart::new(999).map(NumericPart::get), Ok(999));
    /// assert!(NumericPart::new(0).is_err());
    /// ```
    pub fn new(value: u64) -> Result<Self, RegistrationCodeError> {
        if !(1..=BATCH_SIZE).contains(&value) {
            return Err(RegistrationCodeError::NumericOutOfRange(value));
        }
        u16::try_from(value)
            .map(Self)
            .map_err(|_| RegistrationCodeError::NumericOutOfRange(value))
    }

    /// Raw numeric value.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for NumericPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zero-based index of a letter batch: `0 -> A`, `25 -> Z`, `26 -> AA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchIndex(u64);

impl BatchIndex {
    /// Wrap a batch index.
    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    /// Raw zero-based index.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Bijective base-26 rendering of the index.
    ///
    /// # Examples
    /// ```
    /// use registrar::domain::BatchIndex;
    ///
    /// assert_eq!(BatchIndex::new(0).letters(), "A");
    /// assert_eq!(BatchIndex::new(25).letters(), "Z");
    /// assert_eq!(BatchIndex::new(26).letters(), "AA");
    /// assert_eq!(BatchIndex::new(27).letters(), "AB");
    /// ```
    pub fn letters(self) -> String {
        let mut remaining = self.0;
        let mut reversed = Vec::new();
        loop {
            // The remainder is below 26, so the narrowing cannot truncate.
            let digit = (remaining % ALPHABET_LEN) as u8;
            reversed.push(char::from(b'A' + digit));
            remaining /= ALPHABET_LEN;
            if remaining == 0 {
                break;
            }
            remaining -= 1;
        }
        reversed.into_iter().rev().collect()
    }

    /// Parse spreadsheet-column letters back into an index.
    pub fn from_letters(letters: &str) -> Result<Self, RegistrationCodeError> {
        if letters.is_empty() {
            return Err(RegistrationCodeError::Malformed(letters.to_owned()));
        }

        let mut value: u64 = 0;
        for byte in letters.bytes() {
            if !byte.is_ascii_uppercase() {
                return Err(RegistrationCodeError::Malformed(letters.to_owned()));
            }
            let digit = u64::from(byte - b'A') + 1;
            value = value
                .checked_mul(ALPHABET_LEN)
                .and_then(|shifted| shifted.checked_add(digit))
                .ok_or_else(|| RegistrationCodeError::BatchOverflow(letters.to_owned()))?;
        }

        let index = value - 1;
        if index > MAX_BATCH_INDEX {
            return Err(RegistrationCodeError::BatchOverflow(letters.to_owned()));
        }
        Ok(Self(index))
    }
}

impl fmt::Display for BatchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters())
    }
}

/// A well-formed registration code such as `1A` or `999AB`.
///
/// Ordering follows issue order: batch first, then numeric part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssignedCode {
    batch: BatchIndex,
    numeric: NumericPart,
}

impl AssignedCode {
    /// Combine a batch and numeric part.
    pub fn new(batch: BatchIndex, numeric: NumericPart) -> Self {
        Self { batch, numeric }
    }

    /// Derive the code for the account created after `count` existing ones.
    ///
    /// The next ordinal is `count + 1`; its numeric part is that ordinal
    /// modulo 999 with 0 mapped to 999, and the batch is `count / 999`.
    ///
    /// # Examples
    /// ```
    /// use registrar::domain::AssignedCode;
    ///
    /// assert_eq!(AssignedCode::for_count(0).to_string(), "1A");
    /// assert_eq!(AssignedCode::for_count(998).to_string(), "999A");
    /// assert_eq!(AssignedCode::for_count(999).to_string(), "1B");
    /// ```
    pub fn for_count(count: u64) -> Self {
        // (count + 1) mod 999 with 0 -> 999 equals count mod 999 + 1, which
        // cannot overflow at u64::MAX.
        let numeric = (count % BATCH_SIZE) + 1;
        Self {
            batch: BatchIndex(count / BATCH_SIZE),
            // Always within 1..=999.
            numeric: NumericPart(numeric as u16),
        }
    }

    /// Derive the code for a 1-based issue ordinal.
    pub fn from_ordinal(ordinal: u64) -> Result<Self, RegistrationCodeError> {
        ordinal
            .checked_sub(1)
            .map(Self::for_count)
            .ok_or(RegistrationCodeError::ZeroOrdinal)
    }

    /// The 1-based issue ordinal this code represents.
    ///
    /// # Examples
    /// ```
    /// use registrar::domain::AssignedCode;
    ///
    /// let code: AssignedCode = "1B".parse().expect("valid code");
    /// assert_eq!(code.ordinal(), 1000);
    /// ```
    pub fn ordinal(&self) -> u64 {
        self.batch
            .get()
            .saturating_mul(BATCH_SIZE)
            .saturating_add(u64::from(self.numeric.get()))
    }

    /// Letter batch of this code.
    pub fn batch(&self) -> BatchIndex {
        self.batch
    }

    /// Numeric part of this code.
    pub fn numeric(&self) -> NumericPart {
        self.numeric
    }
}

impl fmt::Display for AssignedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.numeric, self.batch)
    }
}

static ASSIGNED_RE: OnceLock<Regex> = OnceLock::new();
static FALLBACK_RE: OnceLock<Regex> = OnceLock::new();

fn assigned_regex() -> &'static Regex {
    ASSIGNED_RE.get_or_init(|| {
        Regex::new("^([1-9][0-9]{0,2})([A-Z]+)$")
            .unwrap_or_else(|error| panic!("assigned code regex failed to compile: {error}"))
    })
}

fn fallback_regex() -> &'static Regex {
    FALLBACK_RE.get_or_init(|| {
        Regex::new("^ERR-([0-9]{1,19})$")
            .unwrap_or_else(|error| panic!("fallback code regex failed to compile: {error}"))
    })
}

impl FromStr for AssignedCode {
    type Err = RegistrationCodeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let captures = assigned_regex()
            .captures(raw)
            .ok_or_else(|| RegistrationCodeError::Malformed(raw.to_owned()))?;
        let (Some(digits), Some(letters)) = (captures.get(1), captures.get(2)) else {
            return Err(RegistrationCodeError::Malformed(raw.to_owned()));
        };

        let numeric = digits
            .as_str()
            .parse::<u64>()
            .map_err(|_| RegistrationCodeError::Malformed(raw.to_owned()))?;
        Ok(Self::new(
            BatchIndex::from_letters(letters.as_str())?,
            NumericPart::new(numeric)?,
        ))
    }
}

/// Placeholder issued when a registration number could not be derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FallbackCode {
    issued_at: DateTime<Utc>,
}

impl FallbackCode {
    /// Build a fallback code stamped with `issued_at`.
    ///
    /// Sub-millisecond precision is dropped so the code survives a round trip
    /// through its string form.
    pub fn new(issued_at: DateTime<Utc>) -> Self {
        let millis = issued_at.timestamp_millis();
        Self {
            issued_at: DateTime::from_timestamp_millis(millis).unwrap_or(issued_at),
        }
    }

    /// Instant the fallback was issued.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

impl fmt::Display for FallbackCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{FALLBACK_PREFIX}{}", self.issued_at.timestamp_millis())
    }
}

impl FromStr for FallbackCode {
    type Err = RegistrationCodeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let millis = fallback_regex()
            .captures(raw)
            .and_then(|captures| captures.get(1))
            .ok_or_else(|| RegistrationCodeError::Malformed(raw.to_owned()))?
            .as_str();
        let issued_at = millis
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| RegistrationCodeError::FallbackTimestamp(millis.to_owned()))?;
        Ok(Self { issued_at })
    }
}

/// Code stored on a user record: either issued normally or a fallback.
///
/// Serialises as its string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RegistrationCode {
    /// Well-formed code derived from the issue ordinal.
    Assigned(AssignedCode),
    /// Degraded placeholder awaiting reconciliation.
    Fallback(FallbackCode),
}

impl RegistrationCode {
    /// Parse either code shape.
    ///
    /// # Examples
    /// ```
    /// use registrar::domain::RegistrationCode;
    ///
    /// assert!(!RegistrationCode::parse("12C").expect("assigned").is_fallback());
    /// assert!(RegistrationCode::parse("ERR-1700000000000").expect("fallback").is_fallback());
    /// assert!(RegistrationCode::parse("012C").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, RegistrationCodeError> {
        if raw.trim().is_empty() {
            return Err(RegistrationCodeError::Empty);
        }
        if raw.starts_with(FALLBACK_PREFIX) {
            return raw.parse().map(Self::Fallback);
        }
        raw.parse().map(Self::Assigned)
    }

    /// Whether this code is a fallback placeholder.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// The well-formed code, if one was issued.
    pub fn assigned(&self) -> Option<&AssignedCode> {
        match self {
            Self::Assigned(code) => Some(code),
            Self::Fallback(_) => None,
        }
    }
}

impl fmt::Display for RegistrationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assigned(code) => code.fmt(f),
            Self::Fallback(code) => code.fmt(f),
        }
    }
}

impl FromStr for RegistrationCode {
    type Err = RegistrationCodeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl From<AssignedCode> for RegistrationCode {
    fn from(value: AssignedCode) -> Self {
        Self::Assigned(value)
    }
}

impl From<FallbackCode> for RegistrationCode {
    fn from(value: FallbackCode) -> Self {
        Self::Fallback(value)
    }
}

impl From<RegistrationCode> for String {
    fn from(value: RegistrationCode) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for RegistrationCode {
    type Error = RegistrationCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
