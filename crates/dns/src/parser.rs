use crate::error::ParseError;
use crate::protocol::header::{Flags, Header};
use crate::protocol::message::Message;
use crate::protocol::name::{DomainName, MAX_NAME_LEN};
use crate::protocol::question::Question;
use crate::protocol::record::{Record, RecordData, RecordMeta};
use crate::protocol::record_class::RecordClass;
use crate::protocol::record_type::RecordType;

const POINTER_MASK: u8 = 0b1100_0000;

/// Cursor over a complete DNS message.
///
/// The cursor always holds the whole message, not just the section being
/// read, because compressed domain names may reference any earlier offset
/// in it (https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.4).
#[derive(Debug)]
pub struct DnsParser<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> DnsParser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn advance(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        let end = self
            .position
            .checked_add(n)
            .filter(|end| *end <= self.buf.len())
            .ok_or(ParseError::UnexpectedEof(self.position))?;
        let out = &self.buf[self.position..end];
        self.position = end;
        Ok(out)
    }

    fn advance_n<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.advance(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.advance_n::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ParseError> {
        Ok(u16::from_be_bytes(self.advance_n::<2>()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, ParseError> {
        Ok(u32::from_be_bytes(self.advance_n::<4>()?))
    }

    /// Header section format https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
    pub fn parse_header(&mut self) -> Result<Header, ParseError> {
        Ok(Header {
            id: self.read_u16()?,
            flags: Flags::from(self.read_u16()?),
            question_count: self.read_u16()?,
            answer_count: self.read_u16()?,
            authority_count: self.read_u16()?,
            additional_count: self.read_u16()?,
        })
    }

    /// Decodes a domain name starting at the current position.
    ///
    /// A compression pointer re-enters the decoder at the offset it names,
    /// and the cursor resumes right behind the pointer once the name is
    /// complete. Every pointer must target an offset strictly below the
    /// pointer byte itself and below any previously followed pointer, so a
    /// chase can never revisit a position; names are further capped at 255
    /// encoded bytes.
    pub fn parse_name(&mut self) -> Result<DomainName, ParseError> {
        let start = self.position;
        let mut labels = Vec::new();
        let mut decoded_len = 0usize;
        // Set once the first pointer is followed: where to resume reading,
        // and the ceiling the next pointer target has to stay below.
        let mut resume: Option<usize> = None;
        let mut bound: Option<usize> = None;

        loop {
            let len_position = self.position;
            let length = self.read_u8()?;

            if length == 0 {
                break;
            }

            if length & POINTER_MASK == POINTER_MASK {
                let low = self.read_u8()? as usize;
                let target = ((length & !POINTER_MASK) as usize) << 8 | low;
                if resume.is_none() {
                    resume = Some(self.position);
                }
                if target >= bound.unwrap_or(len_position) {
                    return Err(ParseError::BadPointer {
                        at: len_position,
                        target,
                    });
                }
                bound = Some(target);
                self.position = target;
                continue;
            }

            if length & POINTER_MASK != 0 {
                // 0x40 and 0x80 prefixes are reserved by the RFC.
                return Err(ParseError::BadLabel(length));
            }

            decoded_len += length as usize + 1;
            if decoded_len >= MAX_NAME_LEN {
                return Err(ParseError::NameTooLong);
            }

            let label = self.advance(length as usize)?;
            labels.push(String::from_utf8_lossy(label).into_owned());
        }

        // The encoded length seen by the caller is the span consumed in the
        // original buffer, up to and including the first pointer if any.
        let wire_len = match resume {
            Some(position) => {
                self.position = position;
                position - start
            }
            None => self.position - start,
        };

        Ok(DomainName::from_parsed(labels, wire_len))
    }

    /// Question section format https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.2
    pub fn parse_question(&mut self) -> Result<Question, ParseError> {
        Ok(Question {
            name: self.parse_name()?,
            qtype: RecordType::from(self.read_u16()?),
            qclass: RecordClass::try_from(self.read_u16()?)?,
        })
    }

    /// Resource record format https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.3
    ///
    /// The shared envelope is decoded first; the raw rdata is then
    /// reinterpreted according to the record type. Types outside the
    /// supported set are kept opaque, which lets the cursor skip exactly
    /// `rdlength` bytes and stay in sync for the records that follow.
    pub fn parse_record(&mut self) -> Result<Record, ParseError> {
        let name = self.parse_name()?;
        let rtype = RecordType::from(self.read_u16()?);
        let class = RecordClass::try_from(self.read_u16()?)?;
        let ttl = self.read_u32()? as i32;
        let rdlength = self.read_u16()? as usize;
        let rdata_start = self.position;
        let rdata = self.advance(rdlength)?;

        let data = match rtype {
            RecordType::A => {
                if rdlength != 4 {
                    return Err(ParseError::BadRdLength {
                        rtype,
                        len: rdlength,
                    });
                }
                let mut octets = [0u8; 4];
                octets.copy_from_slice(rdata);
                RecordData::A(octets.into())
            }
            RecordType::AAAA => {
                if rdlength != 16 {
                    return Err(ParseError::BadRdLength {
                        rtype,
                        len: rdlength,
                    });
                }
                let mut octets = [0u8; 16];
                octets.copy_from_slice(rdata);
                RecordData::Aaaa(octets.into())
            }
            // Names inside rdata may point anywhere in the message, so
            // they are parsed with a fresh cursor over the full buffer.
            RecordType::NS => RecordData::Ns(self.name_at(rdata_start)?),
            RecordType::CNAME => RecordData::Cname(self.name_at(rdata_start)?),
            RecordType::MX => {
                let mut inner = DnsParser {
                    buf: self.buf,
                    position: rdata_start,
                };
                RecordData::Mx {
                    preference: inner.read_u16()?,
                    exchange: inner.parse_name()?,
                }
            }
            RecordType::TXT => RecordData::Txt(String::from_utf8_lossy(rdata).into_owned()),
            RecordType::Unknown(code) => RecordData::Other {
                code,
                data: rdata.to_vec(),
            },
        };

        let meta = RecordMeta {
            name,
            rtype,
            class,
            ttl,
            rdlength,
        };

        Ok(Record { meta, data })
    }

    fn name_at(&self, position: usize) -> Result<DomainName, ParseError> {
        let mut inner = DnsParser {
            buf: self.buf,
            position,
        };
        inner.parse_name()
    }

    /// Decodes a complete message.
    ///
    /// Fails with [`ParseError::Truncated`] before any section is parsed
    /// when the TC bit is set: the section counts of a truncated reply
    /// cannot be trusted, and the caller retries over TCP anyway.
    pub fn parse_message(&mut self) -> Result<Message, ParseError> {
        let header = self.parse_header()?;

        if header.flags.truncation {
            return Err(ParseError::Truncated);
        }
        if header.question_count != 1 {
            return Err(ParseError::QuestionCount(header.question_count));
        }

        let question = self.parse_question()?;

        let mut answers = Vec::new();
        for _ in 0..header.answer_count {
            answers.push(self.parse_record()?);
        }
        let mut authorities = Vec::new();
        for _ in 0..header.authority_count {
            authorities.push(self.parse_record()?);
        }
        let mut additionals = Vec::new();
        for _ in 0..header.additional_count {
            additionals.push(self.parse_record()?);
        }

        Ok(Message {
            id: header.id,
            flags: header.flags,
            question,
            answers,
            authorities,
            additionals,
        })
    }
}
