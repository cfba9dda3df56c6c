// crates/company-contract/src/cnpj.rs
// ============================================================================
// Module: CNPJ Registry Numbers
// Description: Format, check-digit, and allocation helpers for CNPJ values.
// Purpose: Produce well-formed, distinct registry numbers for contract fixtures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A CNPJ is 14 digits: an 8-digit root, a 4-digit branch number, and two
//! mod-11 check digits, written canonically as `NN.NNN.NNN/NNNN-DD`.
//! The remote API enforces the format; the suite only needs to produce values
//! that pass (or deliberately fail) that check.
//!
//! ## Invariants
//! - A constructed [`Cnpj`] always carries matching check digits.
//! - [`CnpjAllocator`] never yields the same value twice.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of digits in a CNPJ.
pub const CNPJ_DIGITS: usize = 14;
/// Largest 8-digit root.
pub const MAX_ROOT: u32 = 99_999_999;
/// Largest 4-digit branch number.
pub const MAX_BRANCH: u16 = 9_999;
/// Canonical formatted length (`NN.NNN.NNN/NNNN-DD`).
const FORMATTED_LEN: usize = 18;
/// Weights for the first check digit.
const FIRST_CHECK_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
/// Weights for the second check digit.
const SECOND_CHECK_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
/// Span of roots handed to per-run allocators (keeps roots 8 digits wide).
const RUN_ROOT_SPAN: u128 = 90_000_000;
/// Smallest root handed to per-run allocators.
const RUN_ROOT_FLOOR: u32 = 10_000_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CNPJ parsing and allocation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CnpjError {
    /// Input is neither `NN.NNN.NNN/NNNN-DD` nor 14 bare digits.
    #[error("malformed cnpj: {0}")]
    Malformed(String),
    /// Check digits do not match the first 12 digits.
    #[error("cnpj check digits do not match: {0}")]
    CheckDigits(String),
    /// Root exceeds 8 digits.
    #[error("cnpj root out of range: {0}")]
    RootOutOfRange(u32),
    /// Branch number is zero or exceeds 4 digits.
    #[error("cnpj branch out of range: {0}")]
    BranchOutOfRange(u16),
    /// Allocator has handed out every branch for its root.
    #[error("cnpj allocator exhausted for root {0:08}")]
    Exhausted(u32),
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// A check-digit-valid CNPJ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cnpj {
    /// All 14 digits, check digits last.
    digits: [u8; CNPJ_DIGITS],
}

impl Cnpj {
    /// Builds a CNPJ from its root and branch number, computing check digits.
    ///
    /// # Errors
    ///
    /// Returns [`CnpjError`] when the root or branch is out of range.
    pub fn from_parts(root: u32, branch: u16) -> Result<Self, CnpjError> {
        if root > MAX_ROOT {
            return Err(CnpjError::RootOutOfRange(root));
        }
        if branch == 0 || branch > MAX_BRANCH {
            return Err(CnpjError::BranchOutOfRange(branch));
        }
        let mut base = [0u8; 12];
        write_digits(&mut base[.. 8], u64::from(root));
        write_digits(&mut base[8 ..], u64::from(branch));
        let check = check_digits(&base);
        let mut digits = [0u8; CNPJ_DIGITS];
        digits[.. 12].copy_from_slice(&base);
        digits[12 ..].copy_from_slice(&check);
        Ok(Self {
            digits,
        })
    }

    /// Parses a formatted or bare CNPJ and validates its check digits.
    ///
    /// # Errors
    ///
    /// Returns [`CnpjError`] when the input is malformed or the check digits
    /// do not match.
    pub fn parse(value: &str) -> Result<Self, CnpjError> {
        let digits = extract_digits(value)?;
        let mut base = [0u8; 12];
        base.copy_from_slice(&digits[.. 12]);
        if check_digits(&base) != digits[12 ..] {
            return Err(CnpjError::CheckDigits(value.to_string()));
        }
        Ok(Self {
            digits,
        })
    }

    /// Returns the 8-digit root.
    #[must_use]
    pub fn root(&self) -> u32 {
        self.digits[.. 8].iter().fold(0u32, |acc, digit| acc * 10 + u32::from(*digit))
    }

    /// Returns the 4-digit branch number.
    #[must_use]
    pub fn branch(&self) -> u16 {
        self.digits[8 .. 12].iter().fold(0u16, |acc, digit| acc * 10 + u16::from(*digit))
    }

    /// Returns the canonical `NN.NNN.NNN/NNNN-DD` form.
    #[must_use]
    pub fn formatted(&self) -> String {
        let mut out = String::with_capacity(FORMATTED_LEN);
        for (index, digit) in self.digits.iter().enumerate() {
            match index {
                2 | 5 => out.push('.'),
                8 => out.push('/'),
                12 => out.push('-'),
                _ => {}
            }
            out.push(char::from(b'0' + digit));
        }
        out
    }
}

impl fmt::Display for Cnpj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

/// Hands out distinct CNPJs sharing one root, one branch number at a time.
#[derive(Debug, Clone)]
pub struct CnpjAllocator {
    /// Root shared by every allocated value.
    root: u32,
    /// Branch number handed out next.
    next_branch: u16,
}

impl CnpjAllocator {
    /// Creates an allocator for a fixed root, starting at branch `0001`.
    ///
    /// # Errors
    ///
    /// Returns [`CnpjError::RootOutOfRange`] when the root exceeds 8 digits.
    pub const fn new(root: u32) -> Result<Self, CnpjError> {
        if root > MAX_ROOT {
            return Err(CnpjError::RootOutOfRange(root));
        }
        Ok(Self {
            root,
            next_branch: 1,
        })
    }

    /// Derives an allocator whose root is unique to a run start time.
    #[must_use]
    pub fn for_run(started_at_ms: u128) -> Self {
        let offset = u32::try_from(started_at_ms % RUN_ROOT_SPAN).unwrap_or_default();
        Self {
            root: RUN_ROOT_FLOOR + offset,
            next_branch: 1,
        }
    }

    /// Returns the root shared by allocated values.
    #[must_use]
    pub const fn root(&self) -> u32 {
        self.root
    }

    /// Allocates the next CNPJ.
    ///
    /// # Errors
    ///
    /// Returns [`CnpjError::Exhausted`] once all 9999 branches are used.
    pub fn allocate(&mut self) -> Result<Cnpj, CnpjError> {
        if self.next_branch > MAX_BRANCH {
            return Err(CnpjError::Exhausted(self.root));
        }
        let cnpj = Cnpj::from_parts(self.root, self.next_branch)?;
        self.next_branch += 1;
        Ok(cnpj)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when `value` has the `NN.NNN.NNN/NNNN-DD` shape.
///
/// Check digits are not verified; see [`Cnpj::parse`].
#[must_use]
pub fn is_well_formed(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != FORMATTED_LEN {
        return false;
    }
    bytes.iter().enumerate().all(|(index, byte)| match index {
        2 | 6 => *byte == b'.',
        10 => *byte == b'/',
        15 => *byte == b'-',
        _ => byte.is_ascii_digit(),
    })
}

/// Computes both check digits for the first 12 digits.
#[must_use]
pub fn check_digits(base: &[u8; 12]) -> [u8; 2] {
    let first = check_digit(base, &FIRST_CHECK_WEIGHTS);
    let mut extended = [0u8; 13];
    extended[.. 12].copy_from_slice(base);
    extended[12] = first;
    let second = check_digit(&extended, &SECOND_CHECK_WEIGHTS);
    [first, second]
}

/// Mod-11 check digit over `digits` with positional `weights`.
fn check_digit(digits: &[u8], weights: &[u32]) -> u8 {
    let sum: u32 =
        digits.iter().zip(weights).map(|(digit, weight)| u32::from(*digit) * weight).sum();
    let remainder = sum % 11;
    if remainder < 2 { 0 } else { u8::try_from(11 - remainder).unwrap_or_default() }
}

/// Writes `value` as zero-padded decimal digits into `out`.
fn write_digits(out: &mut [u8], mut value: u64) {
    for slot in out.iter_mut().rev() {
        *slot = u8::try_from(value % 10).unwrap_or_default();
        value /= 10;
    }
}

/// Extracts the 14 digits from a formatted or bare CNPJ string.
fn extract_digits(value: &str) -> Result<[u8; CNPJ_DIGITS], CnpjError> {
    let bare = value.len() == CNPJ_DIGITS && value.bytes().all(|byte| byte.is_ascii_digit());
    if !bare && !is_well_formed(value) {
        return Err(CnpjError::Malformed(value.to_string()));
    }
    let mut digits = [0u8; CNPJ_DIGITS];
    for (slot, byte) in digits.iter_mut().zip(value.bytes().filter(u8::is_ascii_digit)) {
        *slot = byte - b'0';
    }
    Ok(digits)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "cnpj_tests.rs"]
mod tests;
