use crate::consent::{
    bitstring, contains_id, decode_core_segment, ConsentDecodeError, IdSet, VendorEncoding,
    VendorSet,
};
use crate::core::{ConsentReader, FromConsentReader};
use std::str::FromStr;

pub(crate) const TCF_V1_VERSION: u8 = 1;

// See https://github.com/InteractiveAdvertisingBureau/GDPR-Transparency-and-Consent-Framework/blob/master/Consent%20string%20and%20vendor%20list%20formats%20v1.1%20Final.md
#[derive(Debug, Eq, PartialEq)]
pub struct ConsentV1 {
    pub consent_language: String,
    pub vendor_list_version: u16,
    pub purposes_allowed: IdSet,
    pub default_consent: bool,
    pub vendor_consents: VendorSet,
}

impl FromStr for ConsentV1 {
    type Err = ConsentDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b = decode_core_segment(s)?;
        ConsentReader::new(&b).parse()
    }
}

impl FromConsentReader for ConsentV1 {
    type Err = ConsentDecodeError;

    fn from_consent_reader(r: &mut ConsentReader) -> Result<Self, Self::Err> {
        let version = r.read_fixed_integer(6)?;
        if version != TCF_V1_VERSION {
            return Err(ConsentDecodeError::UnsupportedVersion { found: version });
        }

        // created, last updated, CMP ID, CMP version and consent screen
        // hold no consent state, discard them in one go
        r.skip(102)?;

        let consent_language = r.read_string(2)?;
        let vendor_list_version = r.read_fixed_integer(12)?;
        let purposes_allowed = r.read_fixed_bitfield(24)?;
        let (default_consent, vendor_consents) = Self::parse_vendor_consents(r)?;

        Ok(Self {
            consent_language,
            vendor_list_version,
            purposes_allowed,
            default_consent,
            vendor_consents,
        })
    }
}

impl ConsentV1 {
    /// Whether the user consented to the purpose with the given ID.
    pub fn has_consented_purpose(&self, purpose_id: i32) -> bool {
        contains_id(&self.purposes_allowed, purpose_id)
    }

    /// The purpose consents rendered as a string of 24 `0`/`1` characters.
    pub fn consent_purpose_bitstring(&self) -> String {
        bitstring(24, |id| self.purposes_allowed.contains(&id))
    }

    /// Always true, as TCF 1.0 strings carry no legitimate interest
    /// information.
    pub fn has_consented_legitimate_interest_for_purpose(&self, _purpose_id: i32) -> bool {
        true
    }

    /// Whether the user consented to the vendor with the given ID.
    pub fn has_user_consented(&self, vendor_id: i32) -> bool {
        self.vendor_consents.has_vendor(vendor_id)
    }

    /// Always true, as TCF 1.0 strings carry no legitimate interest
    /// information.
    pub fn has_user_legitimate_interest(&self, _vendor_id: i32) -> bool {
        true
    }

    /// The vendor consents rendered as one `0`/`1` character per vendor ID,
    /// up to the maximum vendor ID of the string.
    pub fn consent_bitstring(&self) -> String {
        self.vendor_consents.bitstring()
    }

    /// Always empty, as TCF 1.0 strings carry no legitimate interest
    /// information.
    pub fn interests_bitstring(&self) -> String {
        String::new()
    }

    fn parse_vendor_consents(
        r: &mut ConsentReader,
    ) -> Result<(bool, VendorSet), ConsentDecodeError> {
        let max_vendor_id = r.read_fixed_integer::<u16>(16)?;
        let is_range = r.read_bool()?;

        Ok(if is_range {
            // range section, preceded by the fallback consent value
            let default_consent = r.read_bool()?;
            let num_entries = r.read_fixed_integer::<u16>(12)? as usize;
            let entries = r.read_range_entries(num_entries)?;

            (
                default_consent,
                VendorSet {
                    max_vendor_id,
                    encoding: VendorEncoding::Range(entries),
                },
            )
        } else {
            // bitfield section
            let ids = r.read_fixed_bitfield(max_vendor_id as usize)?;

            (
                false,
                VendorSet {
                    max_vendor_id,
                    encoding: VendorEncoding::BitField(ids),
                },
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RangeEntry;
    use test_case::test_case;

    const V1_BITFIELD: &str = "BOlLbqtOlLbqtAVABADECg-AAAApp7v______9______9uz_Ov_v_f__33e8__9v_l_7_-___u_-3zd4u_1vf99yfm1-7etr3tp_87ues2_Xur__79__3z3_9phP78k89r7337Ew-v02";
    const V1_BITFIELD_CONSENT_BITSTRING: &str = "111101110111111111111111111111111111111111111111111110111111111111111111111111111111111111111110110111011001111111100111010111111111110111111111101111111111111111111011111011101111011110011111111111111110110111111111110010111111111101111111111111011111111111111111110111011111111111011011111001101110111100010111011111111010110111101111111110111110111001001111110011011010111111011101101111010110110101111011110110110100111111111110011101110111001111010110011011011111101011110111010101111111111111111101111110111111111111111011111001111011111111111110110100110000100111111101111110010010011110011110110101111101111011111011111101100010011000011111010111111010011011";
    const V1_RANGE: &str = "BAAAAAAAAAAAAAAAAAENAIoAAAAMiACgACAGUAKABG";
    const V1_RANGE_DEFAULT: &str = "BAAAAAAAAAAAAAAAAAENAIoAAAAMjABABU";

    #[test]
    fn parse_bitfield() {
        let actual = ConsentV1::from_str(V1_BITFIELD).unwrap();

        assert_eq!(actual.consent_language, "DE");
        assert_eq!(actual.vendor_list_version, 160);
        assert_eq!(actual.purposes_allowed, [1, 2, 3, 4, 5].into());
        assert!(!actual.default_consent);
        assert_eq!(actual.vendor_consents.max_vendor_id, 666);
        assert!(matches!(
            actual.vendor_consents.encoding,
            VendorEncoding::BitField(_)
        ));
    }

    #[test]
    fn parse_range() {
        let actual = ConsentV1::from_str(V1_RANGE).unwrap();
        let expected = ConsentV1 {
            consent_language: "EN".to_string(),
            vendor_list_version: 8,
            purposes_allowed: [1, 3].into(),
            default_consent: false,
            vendor_consents: VendorSet {
                max_vendor_id: 200,
                encoding: VendorEncoding::Range(vec![
                    RangeEntry {
                        is_group: true,
                        start_vendor_id: 1,
                        end_vendor_id: 50,
                    },
                    RangeEntry {
                        is_group: true,
                        start_vendor_id: 40,
                        end_vendor_id: 70,
                    },
                ]),
            },
        };

        assert_eq!(actual, expected);
    }

    #[test_case(-1 => false)]
    #[test_case(0 => false)]
    #[test_case(1 => true)]
    #[test_case(5 => true)]
    #[test_case(20 => false)]
    #[test_case(10_000 => false)]
    fn bitfield_purpose_consent(purpose_id: i32) -> bool {
        ConsentV1::from_str(V1_BITFIELD)
            .unwrap()
            .has_consented_purpose(purpose_id)
    }

    #[test]
    fn bitfield_purpose_bitstring() {
        let consent = ConsentV1::from_str(V1_BITFIELD).unwrap();

        assert_eq!(
            consent.consent_purpose_bitstring(),
            "111110000000000000000000"
        );
    }

    #[test_case(-1 => false)]
    #[test_case(0 => false)]
    #[test_case(1 => true)]
    #[test_case(2 => true)]
    #[test_case(50 => true)]
    #[test_case(99 => false)]
    #[test_case(150 => true)]
    #[test_case(204 => false)]
    #[test_case(250 => true)]
    #[test_case(300 => false)]
    #[test_case(665 => true)]
    #[test_case(666 => true)]
    #[test_case(667 => false)]
    #[test_case(10_000 => false)]
    fn bitfield_vendor_consent(vendor_id: i32) -> bool {
        ConsentV1::from_str(V1_BITFIELD)
            .unwrap()
            .has_user_consented(vendor_id)
    }

    #[test]
    fn bitfield_consent_bitstring() {
        let consent = ConsentV1::from_str(V1_BITFIELD).unwrap();

        assert_eq!(consent.consent_bitstring(), V1_BITFIELD_CONSENT_BITSTRING);
    }

    #[test]
    fn legitimate_interest_is_constant_true() {
        let consent = ConsentV1::from_str(V1_BITFIELD).unwrap();

        for id in 1..=24 {
            assert!(consent.has_consented_legitimate_interest_for_purpose(id));
        }
        for id in 1..=1000 {
            assert!(consent.has_user_legitimate_interest(id));
        }
        assert!(consent.has_consented_legitimate_interest_for_purpose(10_000));
        assert!(consent.has_user_legitimate_interest(-1));
    }

    #[test]
    fn interests_bitstring_is_empty() {
        let consent = ConsentV1::from_str(V1_BITFIELD).unwrap();

        assert_eq!(consent.interests_bitstring(), "");
    }

    #[test_case(0 => false)]
    #[test_case(1 => true)]
    #[test_case(45 => true)]
    #[test_case(50 => true)]
    #[test_case(55 => true)]
    #[test_case(70 => true)]
    #[test_case(71 => false)]
    #[test_case(200 => false)]
    fn range_vendor_consent(vendor_id: i32) -> bool {
        ConsentV1::from_str(V1_RANGE)
            .unwrap()
            .has_user_consented(vendor_id)
    }

    #[test]
    fn range_consent_bitstring() {
        let consent = ConsentV1::from_str(V1_RANGE).unwrap();
        let expected = "1".repeat(70) + &"0".repeat(130);

        assert_eq!(consent.consent_bitstring(), expected);
    }

    #[test]
    fn range_default_consent() {
        let actual = ConsentV1::from_str(V1_RANGE_DEFAULT).unwrap();

        assert!(actual.default_consent);
        assert_eq!(
            actual.vendor_consents.encoding,
            VendorEncoding::Range(vec![RangeEntry {
                is_group: false,
                start_vendor_id: 42,
                end_vendor_id: 42,
            }])
        );
        assert!(actual.has_user_consented(42));
        assert!(!actual.has_user_consented(41));
        assert!(!actual.has_user_consented(43));
    }

    #[test_case("CAAAAA" => matches ConsentDecodeError::UnsupportedVersion { found: 2 } ; "v2 string")]
    #[test_case("DAAAAA" => matches ConsentDecodeError::UnsupportedVersion { found: 3 } ; "v3 string")]
    #[test_case("B" => matches ConsentDecodeError::OutOfBounds(_) ; "version only")]
    #[test_case("BOlLbqt" => matches ConsentDecodeError::OutOfBounds(_) ; "truncated")]
    #[test_case("" => matches ConsentDecodeError::OutOfBounds(_) ; "empty string")]
    #[test_case("!!!" => matches ConsentDecodeError::InvalidEncoding(_) ; "not base64")]
    fn error(s: &str) -> ConsentDecodeError {
        ConsentV1::from_str(s).unwrap_err()
    }
}
