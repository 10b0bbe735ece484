use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Record types this client decodes typed rdata for.
///
/// The type determines how the `RDATA` field of a resource record is
/// interpreted; everything else in a record uses a shared format. Codes
/// outside the supported set still parse — they fall back to
/// `Unknown(code)` and their rdata stays opaque — because a response may
/// legitimately interleave record types we do not care about, and skipping
/// them requires knowing their envelope only.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum RecordType {
    A,     // 1 a host address
    NS,    // 2 an authoritative name server
    CNAME, // 5 the canonical name for an alias
    MX,    // 15 mail exchange
    TXT,   // 16 text strings
    AAAA,  // 28 an IPv6 host address, RFC 3596
    // Fallback
    Unknown(u16),
}

impl From<u16> for RecordType {
    fn from(input: u16) -> Self {
        match input {
            1 => Self::A,
            2 => Self::NS,
            5 => Self::CNAME,
            15 => Self::MX,
            16 => Self::TXT,
            28 => Self::AAAA,
            _ => Self::Unknown(input),
        }
    }
}

impl From<RecordType> for u16 {
    fn from(value: RecordType) -> Self {
        match value {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
            RecordType::Unknown(n) => n,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::NS => write!(f, "NS"),
            RecordType::CNAME => write!(f, "CNAME"),
            RecordType::MX => write!(f, "MX"),
            RecordType::TXT => write!(f, "TXT"),
            RecordType::AAAA => write!(f, "AAAA"),
            // RFC 3597 notation for types without a mnemonic
            RecordType::Unknown(n) => write!(f, "TYPE{n}"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown record type {0:?}")]
pub struct UnknownTypeName(pub String);

impl FromStr for RecordType {
    type Err = UnknownTypeName;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "NS" => Ok(Self::NS),
            "CNAME" => Ok(Self::CNAME),
            "MX" => Ok(Self::MX),
            "TXT" => Ok(Self::TXT),
            "AAAA" => Ok(Self::AAAA),
            _ => Err(UnknownTypeName(input.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u16_round_trip() {
        for code in [1u16, 2, 5, 15, 16, 28, 41, 252] {
            assert_eq!(u16::from(RecordType::from(code)), code);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("aaaa".parse::<RecordType>().unwrap(), RecordType::AAAA);
        assert_eq!("Mx".parse::<RecordType>().unwrap(), RecordType::MX);
        assert!("SRV".parse::<RecordType>().is_err());
    }

    #[test]
    fn test_display_unknown() {
        assert_eq!(RecordType::Unknown(41).to_string(), "TYPE41");
    }
}
