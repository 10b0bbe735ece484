use std::net::{IpAddr, SocketAddr};

use tracing::{debug, warn};

use crate::error::{ParseError, ResolveError};
use crate::protocol::message::Message;
use crate::protocol::name::DomainName;
use crate::protocol::record::{Record, RecordData};
use crate::protocol::record_type::RecordType;
use crate::transport::{Protocol, Transport, DNS_PORT};

/// Upper bound on nested lookups (CNAME chases, glueless NS addresses).
pub const MAX_SUBQUERY_DEPTH: usize = 8;

/// Upper bound on referrals followed within one session.
pub const MAX_HOPS: usize = 30;

/// Receives the resolution transcript.
///
/// One `question` call per hop, one `record` call per reported record.
/// This is program output, not logging: the trace is part of the client's
/// contract and tests assert on it line by line.
pub trait TraceSink {
    fn question(&mut self, protocol: Protocol, server: IpAddr, qtype: RecordType, name: &DomainName);
    fn record(&mut self, server: IpAddr, rtype: RecordType, ttl: i32, value: &str);
}

/// Prints `Q`/`A` trace lines to stdout.
#[derive(Debug, Default)]
pub struct StdoutTrace;

impl TraceSink for StdoutTrace {
    fn question(&mut self, protocol: Protocol, server: IpAddr, qtype: RecordType, name: &DomainName) {
        println!("Q {protocol} {server} {qtype} {name}");
    }

    fn record(&mut self, server: IpAddr, rtype: RecordType, ttl: i32, value: &str) {
        println!("A {server} {rtype} {ttl} {value}");
    }
}

/// One iterative resolution session.
///
/// The session keeps the address it was started at (the root anchor) for
/// the whole walk: CNAME chases and glueless NS lookups restart there as
/// independent nested sessions, inheriting nothing else but the protocol
/// mode. The query message is built once and resent unchanged — same
/// transaction ID, same question — to every server along the way.
pub struct Session<'a> {
    transport: &'a mut dyn Transport,
    sink: &'a mut dyn TraceSink,
    root: IpAddr,
    server: IpAddr,
    protocol: Protocol,
    query: Message,
    depth: usize,
}

impl<'a> Session<'a> {
    pub fn new(
        transport: &'a mut dyn Transport,
        sink: &'a mut dyn TraceSink,
        root: IpAddr,
        name: DomainName,
        qtype: RecordType,
        protocol: Protocol,
    ) -> Self {
        Self {
            transport,
            sink,
            root,
            server: root,
            protocol,
            query: Message::query(name, qtype, false),
            depth: 0,
        }
    }

    /// Walks the hierarchy until the question is answered or no further
    /// referral is possible.
    pub fn run(&mut self) -> Result<Record, ResolveError> {
        for _ in 0..MAX_HOPS {
            let response = self.exchange()?;
            if let Some(record) = self.evaluate(&response)? {
                return Ok(record);
            }
            self.server = self.next_server(&response)?;
        }
        Err(ResolveError::TooManyHops(MAX_HOPS))
    }

    /// One request/response round against the current server.
    ///
    /// A truncated UDP reply upgrades the whole session to TCP and repeats
    /// the exchange against the same server; that is still the same hop
    /// and no second `Q` line is emitted. Truncation over TCP, like every
    /// other decode failure, is fatal.
    fn exchange(&mut self) -> Result<Message, ResolveError> {
        let question = &self.query.question;
        self.sink
            .question(self.protocol, self.server, question.qtype, &question.name);

        let address = SocketAddr::new(self.server, DNS_PORT);
        let request = self.query.to_bytes();
        let reply = self.transport.exchange(address, self.protocol, &request)?;

        match Message::from_bytes(&reply) {
            Err(ParseError::Truncated) if self.protocol == Protocol::Udp => {
                debug!(server = %self.server, "truncated reply, retrying over tcp");
                self.protocol = Protocol::Tcp;
                let reply = self.transport.exchange(address, Protocol::Tcp, &request)?;
                Ok(Message::from_bytes(&reply)?)
            }
            result => Ok(result?),
        }
    }

    /// Works through the answer section. Returns the final record when at
    /// least one answer could be handled, `None` when the response only
    /// refers us onwards (including an answer section that carries nothing
    /// but unsupported types).
    fn evaluate(&mut self, response: &Message) -> Result<Option<Record>, ResolveError> {
        if response.answers.is_empty() {
            return Ok(None);
        }

        let wanted = self.query.question.qtype;
        let mut answered: Option<Record> = None;

        for record in &response.answers {
            if record.meta.rtype == wanted {
                let Some(value) = typed_value(record) else {
                    continue;
                };
                self.sink
                    .record(self.server, record.meta.rtype, record.meta.ttl, &value);
                if answered.is_none() {
                    answered = Some(record.clone());
                }
            } else if let RecordData::Cname(target) = &record.data {
                self.sink.record(
                    self.server,
                    RecordType::CNAME,
                    record.meta.ttl,
                    &target.to_string(),
                );

                // The same response often carries the address of the alias
                // target; only without one do we chase it from the root.
                let hit = response.answers.iter().find(|candidate| {
                    matches!(candidate.data, RecordData::A(_)) && candidate.meta.name == *target
                });
                if let Some(address) = hit {
                    if let Some(value) = typed_value(address) {
                        self.sink.record(
                            self.server,
                            address.meta.rtype,
                            address.meta.ttl,
                            &value,
                        );
                    }
                    return Ok(Some(address.clone()));
                }

                match self.subquery(target.clone(), wanted) {
                    Ok(record) => {
                        if answered.is_none() {
                            answered = Some(record);
                        }
                    }
                    Err(error) => {
                        // A dead alias does not spoil the other answers.
                        warn!(alias = %target, %error, "cname chase failed");
                    }
                }
            }
        }

        Ok(answered)
    }

    /// Picks the server for the next hop out of a referral.
    ///
    /// Tie-break is strictly first-in-section-order: the first NS record
    /// in the authority section, then the first A record in the additional
    /// section owned by that name server (the glue). Without glue the name
    /// server's address is resolved in a nested session; if even that
    /// fails there is nowhere left to go.
    fn next_server(&mut self, response: &Message) -> Result<IpAddr, ResolveError> {
        let referral = response.authorities.iter().find_map(|record| {
            match &record.data {
                RecordData::Ns(target) => Some((record, target)),
                _ => None,
            }
        });

        let Some((ns_record, target)) = referral else {
            // No delegation at all: fall back to the first address offered.
            for record in &response.additionals {
                if let RecordData::A(address) = record.data {
                    self.sink.record(
                        self.server,
                        RecordType::A,
                        record.meta.ttl,
                        &address.to_string(),
                    );
                    return Ok(IpAddr::V4(address));
                }
            }
            return Err(ResolveError::NoNextServer);
        };

        self.sink.record(
            self.server,
            RecordType::NS,
            ns_record.meta.ttl,
            &target.to_string(),
        );

        for record in &response.additionals {
            if let RecordData::A(address) = record.data {
                if record.meta.name == *target {
                    self.sink.record(
                        self.server,
                        RecordType::A,
                        record.meta.ttl,
                        &address.to_string(),
                    );
                    return Ok(IpAddr::V4(address));
                }
            }
        }

        debug!(name_server = %target, "referral without glue");
        match self.subquery(target.clone(), RecordType::A) {
            Ok(Record {
                data: RecordData::A(address),
                ..
            }) => Ok(IpAddr::V4(address)),
            Ok(_) => Err(ResolveError::NsUnresolved(target.clone())),
            Err(error) => {
                warn!(name_server = %target, %error, "glueless ns lookup failed");
                Err(ResolveError::NsUnresolved(target.clone()))
            }
        }
    }

    /// Runs a nested session from the root anchor and blocks on it. Its
    /// trace goes through the same sink, so nested hops show up inline.
    fn subquery(&mut self, name: DomainName, qtype: RecordType) -> Result<Record, ResolveError> {
        if self.depth >= MAX_SUBQUERY_DEPTH {
            return Err(ResolveError::TooDeep(MAX_SUBQUERY_DEPTH));
        }
        debug!(%name, %qtype, depth = self.depth + 1, "starting nested lookup");

        let mut nested = Session {
            transport: &mut *self.transport,
            sink: &mut *self.sink,
            root: self.root,
            server: self.root,
            protocol: self.protocol,
            query: Message::query(name, qtype, false),
            depth: self.depth + 1,
        };
        nested.run()
    }
}

fn typed_value(record: &Record) -> Option<String> {
    match &record.data {
        RecordData::A(address) => Some(address.to_string()),
        RecordData::Aaaa(address) => Some(address.to_string()),
        RecordData::Ns(target) => Some(target.to_string()),
        RecordData::Cname(target) => Some(target.to_string()),
        RecordData::Mx {
            preference,
            exchange,
        } => Some(format!("{preference} {exchange}")),
        RecordData::Txt(text) => Some(text.clone()),
        RecordData::Other { .. } => None,
    }
}
