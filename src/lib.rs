//! This crate is an implementation of the IAB Transparency and Consent Framework (TCF)
//! [Consent String Specification](https://github.com/InteractiveAdvertisingBureau/GDPR-Transparency-and-Consent-Framework).
//!
//! At the moment, it has the ability to decode the CORE segment of version 1.0 and
//! version 2.0 consent strings.
//!
//! NOTE: This is not an official IAB library.
//!
//! # Parsing consent strings
//!
//! A TCF consent string is made of a mandatory CORE segment, optionally followed by
//! further `.`-separated segments.
//!
//! The [`Consent`] type parses the CORE segment of either version and answers consent
//! queries uniformly.
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use std::str::FromStr;
//! use iab_tcf::Consent;
//!
//! let s = "COxR03kOxR1CqBcABCENAgCMAP_AAH_AAAqIF3EXySoGY2thI2YVFxBEIYwfJxyigMgChgQIsSwNQIeFLBoGLiAAHBGYJAQAGBAEEACBAQIkHGBMCQAAgAgBiRCMQEGMCzNIBIBAggEbY0FACCVmHkHSmZCY7064O__QLuIJEFQMAkSBAIACLECIQwAQDiAAAYAlAAABAhIaAAgIWBQEeAAAACAwAAgAAABBAAACAAQAAICIAAABAAAgAiAQAAAAGgIQAACBABACRIAAAEANCAAgiCEAQg4EAo4AAA";
//! let consent = Consent::from_str(s)?;
//!
//! assert_eq!(consent.version(), 2);
//! assert_eq!(consent.cmp_id(), Some(92));
//! assert!(consent.has_consented_purpose(1));
//! assert!(consent.has_user_consented(10));
//! # Ok(())
//! # }
//! ```
//!
//! # Validating the CMP
//!
//! The IAB maintains a JSON registry of approved Consent Management Platforms. The
//! [`cmp::CmpList`] type holds the IDs of that registry and tells whether the CMP
//! that produced a string is registered.
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use std::str::FromStr;
//! use iab_tcf::cmp::CmpList;
//! use iab_tcf::Consent;
//!
//! let consent = Consent::from_str("COytyllOytyllCrAAAENAiCMAFVAACqAAAAAF3QAgAFABkAAoioAAA")?;
//!
//! let cmp_list = CmpList::from_ids([171]);
//! assert_eq!(consent.cmp_id(), Some(171));
//! assert!(consent.is_cmp_valid(&cmp_list));
//! # Ok(())
//! # }
//! ```
//!
//! # Error handling
//!
//! This crate is conservative with regard to how it handles decoding failure. If the
//! CORE segment of a string cannot be fully decoded, then it is considered as an
//! error.
//!
//! This is done to avoid obtaining erroneous user consent information from potentially
//! corrupted payloads.
//!
pub mod cmp;
pub mod consent;
pub(crate) mod core;

pub use consent::{Consent, ConsentDecodeError};
