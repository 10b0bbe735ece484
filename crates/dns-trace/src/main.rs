mod cli;

use std::io::{self, BufRead, Write};
use std::time::Duration;

use cli::ClientArgs;
use dns::protocol::name::DomainName;
use dns::protocol::record_type::RecordType;
use dns::resolver::{Session, StdoutTrace};
use dns::transport::{NetTransport, Protocol};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = ClientArgs::from_env();
    let protocol = if args.tcp { Protocol::Tcp } else { Protocol::Udp };
    let mut transport = NetTransport::new(
        Duration::from_secs(args.timeout),
        args.tcp_timeout.map(Duration::from_secs),
    );
    debug!(server = %args.server, %protocol, "ready for requests");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }
        // EOF (or an unreadable line) ends the program.
        let Some(Ok(line)) = lines.next() else {
            break;
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        let (rrtype, qname) = match fields.as_slice() {
            [rrtype, qname] => (*rrtype, *qname),
            [] => continue,
            _ => {
                println!("expected a request of the form: RRTYPE NAME");
                continue;
            }
        };

        let qtype = match rrtype.parse::<RecordType>() {
            Ok(qtype) => qtype,
            Err(error) => {
                println!("{error}");
                continue;
            }
        };
        let name = match qname.parse::<DomainName>() {
            Ok(name) => name,
            Err(error) => {
                println!("{error}");
                continue;
            }
        };

        // One session per request; a failed query never takes the
        // prompt down with it.
        let mut sink = StdoutTrace;
        let mut session = Session::new(&mut transport, &mut sink, args.server, name, qtype, protocol);
        if let Err(error) = session.run() {
            println!("query failed: {error}");
        }
    }
}
