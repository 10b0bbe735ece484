use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};
use thiserror::Error;

/// Practical ceiling for an encoded name, terminating zero included.
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_LABEL_LEN: usize = 63;

/// A domain name as an ordered list of labels, root-most label last.
///
/// The text form is the labels joined by `.` with a trailing dot. The wire
/// form is length-prefixed labels closed by a zero length, or cut short by
/// a compression pointer; `wire_len` records how many bytes the name
/// occupied in the buffer it was decoded from (two for a lone pointer),
/// which is what callers advance their cursor by. It is fixed when the
/// name is built and never recomputed.
#[derive(Debug, Clone)]
pub struct DomainName {
    labels: Vec<String>,
    wire_len: usize,
}

impl DomainName {
    pub fn new(labels: Vec<String>) -> Self {
        // One length byte per label plus the terminating zero.
        let wire_len = labels.iter().map(|label| label.len() + 1).sum::<usize>() + 1;
        Self { labels, wire_len }
    }

    pub(crate) fn from_parsed(labels: Vec<String>, wire_len: usize) -> Self {
        Self { labels, wire_len }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Bytes this name consumed in its original buffer; for names built
    /// locally, the size of the uncompressed encoding.
    pub fn wire_len(&self) -> usize {
        self.wire_len
    }

    /// Uncompressed wire encoding. Pointers are never emitted: this client
    /// only encodes outgoing queries, which carry a single name.
    pub fn encode(&self, out: &mut BytesMut) {
        for label in &self.labels {
            out.put_u8(label.len() as u8);
            out.put_slice(label.as_bytes());
        }
        out.put_u8(0);
    }

    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = BytesMut::with_capacity(self.labels.len() * 5);
        self.encode(&mut out);
        out.to_vec()
    }
}

// Equality is over labels only: the same name decoded from a compressed
// and an uncompressed encoding must compare equal.
impl PartialEq for DomainName {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels
    }
}

impl Eq for DomainName {}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            return write!(f, ".");
        }
        for label in &self.labels {
            write!(f, "{label}.")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid domain name: {0}")]
pub struct InvalidDomainName(pub String);

impl FromStr for DomainName {
    type Err = InvalidDomainName;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let labels: Vec<String> = input
            .split('.')
            .filter(|label| !label.is_empty())
            .map(str::to_owned)
            .collect();

        for label in &labels {
            if label.len() > MAX_LABEL_LEN || !label.is_ascii() {
                return Err(InvalidDomainName(input.to_owned()));
            }
        }

        let name = DomainName::new(labels);
        if name.wire_len() > MAX_NAME_LEN {
            return Err(InvalidDomainName(input.to_owned()));
        }
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_has_trailing_dot() {
        let name: DomainName = "www.example.com".parse().unwrap();
        assert_eq!(name.to_string(), "www.example.com.");
    }

    #[test]
    fn test_trailing_dot_in_input_is_ignored() {
        let with: DomainName = "example.com.".parse().unwrap();
        let without: DomainName = "example.com".parse().unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_root_name() {
        let root: DomainName = ".".parse().unwrap();
        assert_eq!(root.to_string(), ".");
        assert_eq!(root.to_wire(), vec![0]);
    }

    #[test]
    fn test_encode() {
        let name: DomainName = "www.example.com".parse().unwrap();
        assert_eq!(
            name.to_wire(),
            vec![
                3, b'w', b'w', b'w', 7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o',
                b'm', 0,
            ]
        );
        assert_eq!(name.wire_len(), 17);
    }

    #[test]
    fn test_oversized_label_is_rejected() {
        let label = "a".repeat(64);
        assert!(format!("{label}.com").parse::<DomainName>().is_err());
    }

    #[test]
    fn test_oversized_name_is_rejected() {
        let name = vec!["a".repeat(63); 4].join(".");
        assert!(name.parse::<DomainName>().is_err());
    }
}
