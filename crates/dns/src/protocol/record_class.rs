use crate::error::ParseError;

/// Record classes, RFC 1035 §3.2.4. Unlike record types there is no
/// opaque fallback: a class outside this set is a decode error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum RecordClass {
    IN, // 1 the Internet
    CH, // 3 the CHAOS class
    HS, // 4 Hesiod
}

impl TryFrom<u16> for RecordClass {
    type Error = ParseError;

    fn try_from(input: u16) -> Result<Self, Self::Error> {
        match input {
            1 => Ok(Self::IN),
            3 => Ok(Self::CH),
            4 => Ok(Self::HS),
            _ => Err(ParseError::UnknownClass(input)),
        }
    }
}

impl From<RecordClass> for u16 {
    fn from(value: RecordClass) -> Self {
        match value {
            RecordClass::IN => 1,
            RecordClass::CH => 3,
            RecordClass::HS => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for code in [1u16, 3, 4] {
            assert_eq!(u16::from(RecordClass::try_from(code).unwrap()), code);
        }
    }

    #[test]
    fn test_unknown_class_fails() {
        assert_eq!(RecordClass::try_from(2), Err(ParseError::UnknownClass(2)));
    }
}
