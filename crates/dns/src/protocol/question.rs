use bytes::{BufMut, BytesMut};

use super::name::DomainName;
use super::record_class::RecordClass;
use super::record_type::RecordType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: DomainName,
    pub qtype: RecordType,
    pub qclass: RecordClass,
}

impl Question {
    pub fn encode(&self, out: &mut BytesMut) {
        self.name.encode(out);
        out.put_u16(self.qtype.into());
        out.put_u16(self.qclass.into());
    }
}
