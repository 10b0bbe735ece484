use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::{BufMut, BytesMut};

use super::name::DomainName;
use super::record_class::RecordClass;
use super::record_type::RecordType;

/// The envelope every resource record shares, RFC 1035 §4.1.3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMeta {
    pub name: DomainName,
    pub rtype: RecordType,
    pub class: RecordClass,
    pub ttl: i32,
    pub rdlength: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub meta: RecordMeta,
    pub data: RecordData,
}

/// Typed rdata. `Other` keeps the raw bytes of any type outside the
/// supported set so the record can be carried (and skipped) losslessly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Ns(DomainName),
    Cname(DomainName),
    Mx {
        preference: u16,
        exchange: DomainName,
    },
    Txt(String),
    Other {
        code: u16,
        data: Vec<u8>,
    },
}

impl RecordData {
    pub fn rtype(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::Aaaa(_) => RecordType::AAAA,
            RecordData::Ns(_) => RecordType::NS,
            RecordData::Cname(_) => RecordType::CNAME,
            RecordData::Mx { .. } => RecordType::MX,
            RecordData::Txt(_) => RecordType::TXT,
            RecordData::Other { code, .. } => RecordType::Unknown(*code),
        }
    }

    /// Uncompressed rdata bytes. Names are re-encoded literally even when
    /// the record was decoded from a compressed form.
    pub fn rdata(&self) -> Vec<u8> {
        match self {
            RecordData::A(address) => address.octets().to_vec(),
            RecordData::Aaaa(address) => address.octets().to_vec(),
            RecordData::Ns(target) => target.to_wire(),
            RecordData::Cname(target) => target.to_wire(),
            RecordData::Mx {
                preference,
                exchange,
            } => {
                let mut out = preference.to_be_bytes().to_vec();
                out.extend_from_slice(&exchange.to_wire());
                out
            }
            RecordData::Txt(text) => text.as_bytes().to_vec(),
            RecordData::Other { data, .. } => data.clone(),
        }
    }
}

impl Record {
    pub fn new(name: DomainName, class: RecordClass, ttl: i32, data: RecordData) -> Self {
        let meta = RecordMeta {
            name,
            rtype: data.rtype(),
            class,
            ttl,
            rdlength: data.rdata().len(),
        };
        Self { meta, data }
    }

    /// Size of the encoded record: the envelope (name + type + class +
    /// ttl + rdlength) followed by the rdata.
    pub fn encoded_len(&self) -> usize {
        self.meta.name.wire_len() + 2 + 2 + 4 + 2 + self.meta.rdlength
    }

    /// The rdlength written out is recomputed from the typed data, not
    /// copied from the envelope: rdata decoded from a compressed name is
    /// re-encoded literally and may differ in size.
    pub fn encode(&self, out: &mut BytesMut) {
        self.meta.name.encode(out);
        out.put_u16(self.meta.rtype.into());
        out.put_u16(self.meta.class.into());
        out.put_i32(self.meta.ttl);
        let rdata = self.data.rdata();
        out.put_u16(rdata.len() as u16);
        out.put_slice(&rdata);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fills_envelope() {
        let record = Record::new(
            "example.com".parse().unwrap(),
            RecordClass::IN,
            3600,
            RecordData::A(Ipv4Addr::new(93, 184, 216, 34)),
        );
        assert_eq!(record.meta.rtype, RecordType::A);
        assert_eq!(record.meta.rdlength, 4);
        assert_eq!(record.encoded_len(), 13 + 10 + 4);
    }

    #[test]
    fn test_encode_mx() {
        let record = Record::new(
            "example.com".parse().unwrap(),
            RecordClass::IN,
            600,
            RecordData::Mx {
                preference: 10,
                exchange: "mail.example.com".parse().unwrap(),
            },
        );

        let mut out = BytesMut::new();
        record.encode(&mut out);
        assert_eq!(out.len(), record.encoded_len());
        // preference sits in the first two rdata bytes
        let rdata_at = out.len() - record.meta.rdlength;
        assert_eq!(&out[rdata_at..rdata_at + 2], &[0, 10]);
    }
}
