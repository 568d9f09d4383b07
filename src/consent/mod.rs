//! Decoding and querying of TCF consent strings.
//!
//! The [`Consent`] type hides the differences between the two supported
//! wire versions behind a uniform query surface, while the version-specific
//! records in [`v1`] and [`v2`] keep every decoded field accessible.

use crate::cmp::CmpList;
use crate::consent::v1::{ConsentV1, TCF_V1_VERSION};
use crate::consent::v2::{ConsentV2, PubRestrictionEntry, TCF_V2_VERSION};
use crate::core::{base64, ConsentReader};
use std::collections::BTreeSet;
use std::io;
use std::str::FromStr;
use thiserror::Error;

pub use crate::core::RangeEntry;

pub mod v1;
pub mod v2;

/// A set of 1-based IDs decoded from a bitfield.
pub type IdSet = BTreeSet<u16>;

/// The error type for consent string decoding operations.
#[derive(Error, Debug)]
pub enum ConsentDecodeError {
    /// The CORE segment contains a character outside the URL-safe base64
    /// alphabet.
    #[error("unable to decode core segment")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// A field read ran past the end of the decoded data.
    ///
    /// This usually occurs when the input string is truncated.
    #[error("unable to read consent data")]
    OutOfBounds(#[from] io::Error),
    /// The version announced by the string is not a supported TCF version.
    #[error("unsupported TCF version {found}")]
    UnsupportedVersion { found: u8 },
}

fn decode_core_segment(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    // everything before the first dot is the CORE segment; any further
    // segment uses its own encoding and is not parsed here
    let core = s.split_once('.').map_or(s, |(core, _)| core);
    base64::decode(core)
}

fn contains_id(ids: &IdSet, id: i32) -> bool {
    u16::try_from(id).map(|id| ids.contains(&id)).unwrap_or(false)
}

fn bitstring<F>(len: u16, bit: F) -> String
where
    F: Fn(u16) -> bool,
{
    (1..=len).map(|id| if bit(id) { '1' } else { '0' }).collect()
}

/// How a vendor section encodes its members.
#[derive(Debug, Eq, PartialEq)]
pub enum VendorEncoding {
    /// One bit per vendor ID, 1-based, up to the maximum vendor ID.
    BitField(IdSet),
    /// A list of single IDs and inclusive ID ranges.
    Range(Vec<RangeEntry>),
}

/// One vendor section of a consent string: the bound of its vendor ID space
/// and the encoded member set.
#[derive(Debug, Eq, PartialEq)]
pub struct VendorSet {
    pub max_vendor_id: u16,
    pub encoding: VendorEncoding,
}

impl VendorSet {
    /// Whether the vendor with the given ID is a member. Vendor ID 0 is
    /// never a member.
    pub fn contains(&self, vendor_id: u16) -> bool {
        if vendor_id == 0 {
            return false;
        }

        match &self.encoding {
            VendorEncoding::BitField(ids) => ids.contains(&vendor_id),
            VendorEncoding::Range(entries) => entries.iter().any(|e| e.contains(vendor_id)),
        }
    }

    /// Like [`contains`](Self::contains), for IDs coming from an untyped
    /// query. IDs outside the 16-bit vendor space are never members.
    pub fn has_vendor(&self, vendor_id: i32) -> bool {
        u16::try_from(vendor_id)
            .map(|id| self.contains(id))
            .unwrap_or(false)
    }

    /// Renders the membership as one `0`/`1` character per vendor ID, from
    /// ID 1 up to the maximum vendor ID.
    pub fn bitstring(&self) -> String {
        bitstring(self.max_vendor_id, |id| self.contains(id))
    }
}

/// A decoded TCF consent string of any supported version.
///
/// This is the main entry point of the crate: parse a consent string with
/// [`FromStr`], then query it without caring which wire version it was
/// encoded with. The version-specific records stay reachable through the
/// variants whenever per-version fields are needed.
#[derive(Debug, Eq, PartialEq)]
pub enum Consent {
    V1(ConsentV1),
    V2(ConsentV2),
}

impl FromStr for Consent {
    type Err = ConsentDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b = decode_core_segment(s)?;

        // a buffer too short to announce a version is reported the same way
        // as an unknown version
        let version = ConsentReader::new(&b)
            .read_fixed_integer::<u8>(6)
            .unwrap_or(0);

        match version {
            TCF_V1_VERSION => Ok(Self::V1(ConsentReader::new(&b).parse()?)),
            TCF_V2_VERSION => Ok(Self::V2(ConsentReader::new(&b).parse()?)),
            found => Err(ConsentDecodeError::UnsupportedVersion { found }),
        }
    }
}

impl Consent {
    /// The TCF version of the decoded string.
    pub fn version(&self) -> u8 {
        match self {
            Self::V1(_) => TCF_V1_VERSION,
            Self::V2(_) => TCF_V2_VERSION,
        }
    }

    /// The ID of the Consent Management Platform that produced the string.
    ///
    /// TCF 1.0 strings do not retain the CMP ID, so this is only available
    /// for version 2.
    pub fn cmp_id(&self) -> Option<u16> {
        match self {
            Self::V1(_) => None,
            Self::V2(c) => Some(c.cmp_id),
        }
    }

    /// Whether the string was produced by a CMP present in the given list
    /// of valid CMPs.
    ///
    /// False when the list has not been loaded, and always false for
    /// TCF 1.0 strings since they do not retain the CMP ID.
    pub fn is_cmp_valid(&self, cmp_list: &CmpList) -> bool {
        self.cmp_id()
            .map(|id| cmp_list.contains(id))
            .unwrap_or(false)
    }

    /// Whether the user consented to the purpose with the given ID.
    pub fn has_consented_purpose(&self, purpose_id: i32) -> bool {
        match self {
            Self::V1(c) => c.has_consented_purpose(purpose_id),
            Self::V2(c) => c.has_consented_purpose(purpose_id),
        }
    }

    /// The purpose consents rendered as a string of 24 `0`/`1` characters.
    pub fn consent_purpose_bitstring(&self) -> String {
        match self {
            Self::V1(c) => c.consent_purpose_bitstring(),
            Self::V2(c) => c.consent_purpose_bitstring(),
        }
    }

    /// Whether legitimate interest was established for the purpose with the
    /// given ID.
    ///
    /// TCF 1.0 strings carry no legitimate interest information, so this is
    /// always true for version 1.
    pub fn has_consented_legitimate_interest_for_purpose(&self, purpose_id: i32) -> bool {
        match self {
            Self::V1(c) => c.has_consented_legitimate_interest_for_purpose(purpose_id),
            Self::V2(c) => c.has_consented_legitimate_interest_for_purpose(purpose_id),
        }
    }

    /// Whether the user consented to the vendor with the given ID.
    pub fn has_user_consented(&self, vendor_id: i32) -> bool {
        match self {
            Self::V1(c) => c.has_user_consented(vendor_id),
            Self::V2(c) => c.has_user_consented(vendor_id),
        }
    }

    /// Whether the vendor with the given ID may operate under legitimate
    /// interest.
    ///
    /// TCF 1.0 strings carry no legitimate interest information, so this is
    /// always true for version 1.
    pub fn has_user_legitimate_interest(&self, vendor_id: i32) -> bool {
        match self {
            Self::V1(c) => c.has_user_legitimate_interest(vendor_id),
            Self::V2(c) => c.has_user_legitimate_interest(vendor_id),
        }
    }

    /// The vendor consents rendered as one `0`/`1` character per vendor ID,
    /// up to the maximum vendor ID of the consent section.
    pub fn consent_bitstring(&self) -> String {
        match self {
            Self::V1(c) => c.consent_bitstring(),
            Self::V2(c) => c.consent_bitstring(),
        }
    }

    /// The vendor legitimate interests rendered the same way as
    /// [`consent_bitstring`](Self::consent_bitstring). Always empty for
    /// TCF 1.0 strings.
    pub fn interests_bitstring(&self) -> String {
        match self {
            Self::V1(c) => c.interests_bitstring(),
            Self::V2(c) => c.interests_bitstring(),
        }
    }

    /// The publisher restrictions of a TCF 2.0 string, in the order they
    /// were encoded. Always empty for TCF 1.0 strings.
    pub fn publisher_restrictions(&self) -> &[PubRestrictionEntry] {
        match self {
            Self::V1(_) => &[],
            Self::V2(c) => &c.publisher_restrictions,
        }
    }
}
