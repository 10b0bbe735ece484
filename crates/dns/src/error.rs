use thiserror::Error;

use crate::protocol::name::DomainName;
use crate::protocol::record_type::RecordType;

/// A response that cannot be decoded into a [`Message`](crate::protocol::message::Message).
///
/// `Truncated` is special: it is not a malformed message but a signal that
/// the same exchange has to be repeated over TCP, and the resolver
/// dispatches on it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("message is truncated")]
    Truncated,

    #[error("message ends unexpectedly at offset {0}")]
    UnexpectedEof(usize),

    #[error("expected exactly one question, found {0}")]
    QuestionCount(u16),

    #[error("unsupported record class {0}")]
    UnknownClass(u16),

    #[error("invalid label length byte {0:#04x}")]
    BadLabel(u8),

    #[error("compression pointer at offset {at} does not point backwards (target {target})")]
    BadPointer { at: usize, target: usize },

    #[error("domain name longer than 255 bytes")]
    NameTooLong,

    #[error("invalid rdata length {len} for {rtype} record")]
    BadRdLength { rtype: RecordType, len: usize },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("timed out waiting for a reply")]
    Timeout,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal failure of one resolution session.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("no name server to continue with")]
    NoNextServer,

    #[error("name server {0} could not be resolved")]
    NsUnresolved(DomainName),

    #[error("query exceeded {0} referrals")]
    TooManyHops(usize),

    #[error("nested lookups exceeded depth {0}")]
    TooDeep(usize),
}
