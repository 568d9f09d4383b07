use crate::consent::{
    bitstring, contains_id, decode_core_segment, ConsentDecodeError, IdSet, VendorEncoding,
    VendorSet,
};
use crate::core::{ConsentReader, FromConsentReader, RangeEntry};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::iter::repeat_with;
use std::str::FromStr;

pub(crate) const TCF_V2_VERSION: u8 = 2;

// See https://github.com/InteractiveAdvertisingBureau/GDPR-Transparency-and-Consent-Framework/blob/master/TCFv2/IAB%20Tech%20Lab%20-%20Consent%20string%20and%20vendor%20list%20formats%20v2.md
#[derive(Debug, Eq, PartialEq)]
pub struct ConsentV2 {
    pub cmp_id: u16,
    pub consent_language: String,
    pub vendor_list_version: u16,
    pub policy_version: u8,
    pub is_service_specific: bool,
    pub use_non_standard_stacks: bool,
    pub special_feature_optins: IdSet,
    pub purpose_consents: IdSet,
    pub purpose_legitimate_interests: IdSet,
    pub purpose_one_treatment: bool,
    pub publisher_country_code: String,
    pub vendor_consents: VendorSet,
    pub vendor_legitimate_interests: VendorSet,
    pub publisher_restrictions: Vec<PubRestrictionEntry>,
}

impl FromStr for ConsentV2 {
    type Err = ConsentDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b = decode_core_segment(s)?;
        ConsentReader::new(&b).parse()
    }
}

impl FromConsentReader for ConsentV2 {
    type Err = ConsentDecodeError;

    fn from_consent_reader(r: &mut ConsentReader) -> Result<Self, Self::Err> {
        let version = r.read_fixed_integer(6)?;
        if version != TCF_V2_VERSION {
            return Err(ConsentDecodeError::UnsupportedVersion { found: version });
        }

        // created and last updated timestamps hold no consent state
        r.skip(72)?;
        let cmp_id = r.read_fixed_integer(12)?;
        // CMP version and consent screen
        r.skip(18)?;
        let consent_language = r.read_string(2)?;
        let vendor_list_version = r.read_fixed_integer(12)?;
        let policy_version = r.read_fixed_integer(6)?;
        let is_service_specific = r.read_bool()?;
        let use_non_standard_stacks = r.read_bool()?;
        let special_feature_optins = r.read_fixed_bitfield(12)?;
        let purpose_consents = r.read_fixed_bitfield(24)?;
        let purpose_legitimate_interests = r.read_fixed_bitfield(24)?;
        let purpose_one_treatment = r.read_bool()?;
        let publisher_country_code = r.read_string(2)?;
        let vendor_consents = parse_vendor_section(r)?;
        let vendor_legitimate_interests = parse_vendor_section(r)?;
        let publisher_restrictions = parse_publisher_restrictions(r)?;

        Ok(Self {
            cmp_id,
            consent_language,
            vendor_list_version,
            policy_version,
            is_service_specific,
            use_non_standard_stacks,
            special_feature_optins,
            purpose_consents,
            purpose_legitimate_interests,
            purpose_one_treatment,
            publisher_country_code,
            vendor_consents,
            vendor_legitimate_interests,
            publisher_restrictions,
        })
    }
}

fn parse_vendor_section(r: &mut ConsentReader) -> Result<VendorSet, ConsentDecodeError> {
    let max_vendor_id = r.read_fixed_integer::<u16>(16)?;
    let is_range = r.read_bool()?;

    let encoding = if is_range {
        let num_entries = r.read_fixed_integer::<u16>(12)? as usize;
        VendorEncoding::Range(r.read_range_entries(num_entries)?)
    } else {
        VendorEncoding::BitField(r.read_fixed_bitfield(max_vendor_id as usize)?)
    };

    Ok(VendorSet {
        max_vendor_id,
        encoding,
    })
}

fn parse_publisher_restrictions(
    r: &mut ConsentReader,
) -> Result<Vec<PubRestrictionEntry>, ConsentDecodeError> {
    let num_restrictions = r.read_fixed_integer::<u16>(12)? as usize;

    repeat_with(|| {
        let purpose_id = r.read_fixed_integer::<u8>(6)?;
        let restriction_type = RestrictionType::from_u8(r.read_fixed_integer(2)?)
            .unwrap_or(RestrictionType::Undefined);
        let num_entries = r.read_fixed_integer::<u16>(12)? as usize;
        let range_entries = r.read_range_entries(num_entries)?;

        Ok(PubRestrictionEntry {
            purpose_id,
            restriction_type,
            range_entries,
        })
    })
    .take(num_restrictions)
    .collect()
}

/// One publisher restriction of a TCF 2.0 string: the publisher overrides
/// how the listed vendors may process the given purpose.
#[derive(Debug, Eq, PartialEq)]
pub struct PubRestrictionEntry {
    pub purpose_id: u8,
    pub restriction_type: RestrictionType,
    pub range_entries: Vec<RangeEntry>,
}

#[derive(Debug, Eq, PartialEq, FromPrimitive)]
pub enum RestrictionType {
    NotAllowed = 0,
    RequireConsent = 1,
    RequireLegitimateInterest = 2,
    Undefined = 3,
}

impl ConsentV2 {
    /// Whether the user consented to the purpose with the given ID.
    pub fn has_consented_purpose(&self, purpose_id: i32) -> bool {
        contains_id(&self.purpose_consents, purpose_id)
    }

    /// The purpose consents rendered as a string of 24 `0`/`1` characters.
    pub fn consent_purpose_bitstring(&self) -> String {
        bitstring(24, |id| self.purpose_consents.contains(&id))
    }

    /// Whether legitimate interest was established for the purpose with the
    /// given ID.
    pub fn has_consented_legitimate_interest_for_purpose(&self, purpose_id: i32) -> bool {
        contains_id(&self.purpose_legitimate_interests, purpose_id)
    }

    /// Whether the user consented to the vendor with the given ID.
    pub fn has_user_consented(&self, vendor_id: i32) -> bool {
        self.vendor_consents.has_vendor(vendor_id)
    }

    /// Whether the vendor with the given ID may operate under legitimate
    /// interest.
    pub fn has_user_legitimate_interest(&self, vendor_id: i32) -> bool {
        self.vendor_legitimate_interests.has_vendor(vendor_id)
    }

    /// The vendor consents rendered as one `0`/`1` character per vendor ID,
    /// up to the maximum vendor ID of the consent section.
    pub fn consent_bitstring(&self) -> String {
        self.vendor_consents.bitstring()
    }

    /// The vendor legitimate interests rendered as one `0`/`1` character per
    /// vendor ID, up to the maximum vendor ID of the legitimate interest
    /// section.
    pub fn interests_bitstring(&self) -> String {
        self.vendor_legitimate_interests.bitstring()
    }
}
