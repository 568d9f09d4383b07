use bitstream_io::{BigEndian, BitWrite, BitWriter};
use thiserror::Error;

/// The error type for failures to decode a consent string segment.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid character {0}")]
    InvalidCharacter(u8),
}

/// Custom base64 implementation, 6-bits aligned, no padding,
/// using the URL Safe Base64 dictionary.
///
/// Consent strings are not byte aligned, so every character carries
/// exactly 6 bits and the trailing partial byte is zero filled.
pub fn decode(s: &str) -> Result<Vec<u8>, DecodeError> {
    // output buffer is never larger than the input string, so pre-allocate
    // enough bytes to avoid a realloc
    let mut buffer = Vec::with_capacity(s.len());
    let mut bw = BitWriter::endian(&mut buffer, BigEndian);

    // write 6 bits for every decoded character
    for b in s.bytes() {
        let value = base64_value(b).ok_or(DecodeError::InvalidCharacter(b))?;
        bw.write(6, value).expect("write into vec should not fail");
    }

    // write remaining value if we're not 8-bit aligned at this point
    let (n, value) = bw.into_unwritten();
    if n > 0 {
        let n = 8 - n;
        let value = value << n;
        buffer.push(value);
    }

    Ok(buffer)
}

fn base64_value(b: u8) -> Option<u8> {
    match b {
        b'A'..=b'Z' => Some(b - b'A'),
        b'a'..=b'z' => Some(b - b'a' + 26),
        b'0'..=b'9' => Some(b - b'0' + 52),
        b'-' => Some(62),
        b'_' => Some(63),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(b'A' => Some(0))]
    #[test_case(b'Z' => Some(25))]
    #[test_case(b'a' => Some(26))]
    #[test_case(b'z' => Some(51))]
    #[test_case(b'0' => Some(52))]
    #[test_case(b'9' => Some(61))]
    #[test_case(b'-' => Some(62) ; "dash")]
    #[test_case(b'_' => Some(63) ; "underscore")]
    #[test_case(b'=' => None ; "equal")]
    #[test_case(b'#' => None ; "sharp")]
    #[test_case(b'.' => None ; "dot")]
    fn base64_value_map(b: u8) -> Option<u8> {
        base64_value(b)
    }

    #[test_case("BOEFEAy" => vec![4, 225, 5, 16, 12, 128] ; "tcf v1 header")]
    #[test_case("COxR03k" => vec![8, 236, 81, 211, 121, 0] ; "tcf v2 header")]
    #[test_case("BAAg" => vec![4, 0, 32] ; "three bytes")]
    #[test_case("A" => vec![0] ; "single char pads to one byte")]
    #[test_case("H_" => vec![31, 240] ; "underscore value")]
    #[test_case("-_" => vec![251, 240] ; "url safe chars")]
    #[test_case("" => is empty ; "empty string")]
    fn test_decode(s: &str) -> Vec<u8> {
        decode(s).unwrap()
    }

    #[test_case("===" => matches DecodeError::InvalidCharacter(b'=') ; "padding chars")]
    #[test_case("   " => matches DecodeError::InvalidCharacter(b' ') ; "whitespaces")]
    #[test_case("AB!" => matches DecodeError::InvalidCharacter(b'!') ; "bang")]
    fn error(s: &str) -> DecodeError {
        decode(s).unwrap_err()
    }
}
