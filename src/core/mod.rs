use bitstream_io::{BigEndian, BitRead, BitReader, Numeric};
use std::collections::BTreeSet;
use std::io;
use std::iter::repeat_with;

pub mod base64;

/// A type that can be parsed from a stream of consent string bits.
pub trait FromConsentReader: Sized {
    type Err;

    fn from_consent_reader(r: &mut ConsentReader) -> Result<Self, Self::Err>;
}

/// One entry of a range-encoded vendor section, covering either a single
/// vendor ID or an inclusive interval of IDs.
#[derive(Debug, Eq, PartialEq)]
pub struct RangeEntry {
    pub is_group: bool,
    pub start_vendor_id: u16,
    pub end_vendor_id: u16,
}

impl RangeEntry {
    pub fn contains(&self, vendor_id: u16) -> bool {
        (self.start_vendor_id..=self.end_vendor_id).contains(&vendor_id)
    }
}

/// Big-endian, MSB-first cursor over the decoded bytes of a consent
/// string segment.
///
/// Every read consumes exactly the requested number of bits and fails
/// with an I/O error when the buffer runs out.
pub struct ConsentReader<'a> {
    bit_reader: BitReader<&'a [u8], BigEndian>,
}

impl<'a> ConsentReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bit_reader: BitReader::endian(bytes, BigEndian),
        }
    }

    pub fn parse<F>(&mut self) -> Result<F, <F as FromConsentReader>::Err>
    where
        F: FromConsentReader,
    {
        FromConsentReader::from_consent_reader(self)
    }

    pub fn read_bool(&mut self) -> io::Result<bool> {
        self.bit_reader.read_bit()
    }

    pub fn read_fixed_integer<N: Numeric>(&mut self, bits: u32) -> io::Result<N> {
        self.bit_reader.read(bits)
    }

    /// Reads `chars` characters of 6 bits each, mapped onto the uppercase
    /// alphabet starting at `A`.
    pub fn read_string(&mut self, chars: usize) -> io::Result<String> {
        repeat_with(|| self.read_fixed_integer::<u8>(6))
            .take(chars)
            .map(|r| r.map(|n| (n + 65) as char))
            .collect::<Result<String, _>>()
    }

    /// Reads `bits` booleans and collects the 1-based positions of the
    /// set ones.
    pub fn read_fixed_bitfield(&mut self, bits: usize) -> io::Result<BTreeSet<u16>> {
        let mut result = BTreeSet::new();
        for i in 1..=bits {
            let b = self.read_bool()?;
            if b {
                result.insert(i as u16);
            }
        }

        Ok(result)
    }

    pub fn read_range_entries(&mut self, count: usize) -> io::Result<Vec<RangeEntry>> {
        repeat_with(|| {
            let is_group = self.read_bool()?;
            let start_vendor_id = self.read_fixed_integer::<u16>(16)?;
            let end_vendor_id = if is_group {
                self.read_fixed_integer::<u16>(16)?
            } else {
                start_vendor_id
            };

            Ok(RangeEntry {
                is_group,
                start_vendor_id,
                end_vendor_id,
            })
        })
        .take(count)
        .collect()
    }

    pub fn skip(&mut self, bits: u32) -> io::Result<()> {
        self.bit_reader.skip(bits)
    }
}
