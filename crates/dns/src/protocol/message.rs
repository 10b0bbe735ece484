use bytes::{BufMut, Bytes, BytesMut};

use crate::error::ParseError;
use crate::parser::DnsParser;

use super::header::{Flags, Header};
use super::name::DomainName;
use super::question::Question;
use super::record::Record;
use super::record_class::RecordClass;
use super::record_type::RecordType;

/// A complete DNS message: header, exactly one question and the three
/// record sections. Messages with any other question count do not decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u16,
    pub flags: Flags,
    pub question: Question,
    pub answers: Vec<Record>,
    pub authorities: Vec<Record>,
    pub additionals: Vec<Record>,
}

impl Message {
    /// Builds an outgoing query. The transaction ID is drawn once here and
    /// stays with the message for its whole life; the resolver resends the
    /// identical message to every server it walks.
    pub fn query(name: DomainName, qtype: RecordType, recursion_desired: bool) -> Self {
        Self {
            id: rand::random(),
            flags: Flags {
                query: true,
                recursion_desired,
                ..Flags::default()
            },
            question: Question {
                name,
                qtype,
                qclass: RecordClass::IN,
            },
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
        }
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, ParseError> {
        DnsParser::new(buf).parse_message()
    }

    pub fn to_bytes(&self) -> Bytes {
        let header = Header {
            id: self.id,
            flags: self.flags.clone(),
            question_count: 1,
            answer_count: self.answers.len() as u16,
            authority_count: self.authorities.len() as u16,
            additional_count: self.additionals.len() as u16,
        };

        let mut out = BytesMut::with_capacity(512);
        out.put_slice(&<[u8; 12]>::from(header));
        self.question.encode(&mut out);
        for record in &self.answers {
            record.encode(&mut out);
        }
        for record in &self.authorities {
            record.encode(&mut out);
        }
        for record in &self.additionals {
            record.encode(&mut out);
        }
        out.freeze()
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use super::*;
    use crate::protocol::record::RecordData;

    fn name(input: &str) -> DomainName {
        input.parse().unwrap()
    }

    #[test]
    fn test_query_shape() {
        let message = Message::query(name("example.com"), RecordType::A, false);
        assert!(message.flags.query);
        assert!(!message.flags.recursion_desired);
        assert!(message.answers.is_empty());
        assert!(message.authorities.is_empty());
        assert!(message.additionals.is_empty());
    }

    #[test]
    fn test_query_round_trip() {
        let message = Message::query(name("www.example.com"), RecordType::AAAA, true);
        let decoded = Message::from_bytes(&message.to_bytes()).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_response_round_trip_with_all_supported_types() {
        let mut message = Message::query(name("example.com"), RecordType::A, false);
        message.flags = Flags {
            query: false,
            authoritative_answer: true,
            ..Flags::default()
        };
        message.answers = vec![
            Record::new(
                name("example.com"),
                RecordClass::IN,
                300,
                RecordData::A(Ipv4Addr::new(93, 184, 216, 34)),
            ),
            Record::new(
                name("example.com"),
                RecordClass::IN,
                300,
                RecordData::Aaaa(Ipv6Addr::LOCALHOST),
            ),
            Record::new(
                name("example.com"),
                RecordClass::IN,
                600,
                RecordData::Txt("v=spf1 -all".into()),
            ),
        ];
        message.authorities = vec![Record::new(
            name("example.com"),
            RecordClass::IN,
            172800,
            RecordData::Ns(name("ns1.example.com")),
        )];
        message.additionals = vec![Record::new(
            name("example.com"),
            RecordClass::IN,
            600,
            RecordData::Mx {
                preference: 10,
                exchange: name("mail.example.com"),
            },
        )];

        let decoded = Message::from_bytes(&message.to_bytes()).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_decode_rejects_multiple_questions() {
        let mut raw = Vec::new();
        let header = Header {
            id: 1,
            question_count: 2,
            ..Header::default()
        };
        raw.extend_from_slice(&<[u8; 12]>::from(header));
        assert_eq!(
            Message::from_bytes(&raw),
            Err(ParseError::QuestionCount(2))
        );
    }

    #[test]
    fn test_decode_rejects_zero_questions() {
        let header = Header::default();
        let raw: [u8; 12] = header.into();
        assert_eq!(Message::from_bytes(&raw), Err(ParseError::QuestionCount(0)));
    }

    #[test]
    fn test_truncated_message_fails_before_sections() {
        // TC set, and section counts deliberately absurd: decode must
        // report truncation without ever trying to parse the sections.
        let header = Header {
            id: 7,
            flags: Flags::from(0x8200_u16),
            question_count: 1,
            answer_count: u16::MAX,
            ..Header::default()
        };
        let raw: [u8; 12] = header.into();
        assert_eq!(Message::from_bytes(&raw), Err(ParseError::Truncated));
    }

    #[test]
    fn test_ids_are_random_per_query() {
        let ids: Vec<u16> = (0..16)
            .map(|_| Message::query(name("example.com"), RecordType::A, false).id)
            .collect();
        assert!(ids.windows(2).any(|pair| pair[0] != pair[1]));
    }
}
