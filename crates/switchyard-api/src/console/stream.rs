// Expect-style conversation over a byte stream.
//
// A console is an exclusive, ordered exchange: write a line, then block
// until a pattern shows up in the device output. Everything before the
// match is handed back to the caller and dropped from the buffer; anything
// after it stays buffered for the next `expect`.

use std::time::Duration;

use regex::Regex;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::error::Error;

/// Output captured by a successful [`Console::expect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expected {
    /// Device output preceding the match.
    pub before: String,
    /// The text that matched the pattern.
    pub matched: String,
}

/// Line-oriented console over any async byte stream.
pub struct Console<S> {
    stream: S,
    buffer: String,
    /// Trailing bytes of a UTF-8 sequence cut off by a read boundary.
    partial: Vec<u8>,
    timeout: Duration,
    telnet: Option<TelnetFilter>,
}

impl<S> Console<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap a raw stream. `timeout` bounds every single `expect`.
    pub fn new(stream: S, timeout: Duration) -> Self {
        Self {
            stream,
            buffer: String::new(),
            partial: Vec::new(),
            timeout,
            telnet: None,
        }
    }

    /// Strip telnet option negotiation from the stream, refusing every option.
    pub fn with_telnet(mut self) -> Self {
        self.telnet = Some(TelnetFilter::default());
        self
    }

    pub async fn send_line(&mut self, line: &str) -> Result<(), Error> {
        trace!(line, "console send");
        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Read until `pattern` matches the buffered output.
    pub async fn expect(&mut self, pattern: &Regex) -> Result<Expected, Error> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            if let Some(found) = pattern.find(&self.buffer) {
                let before = self.buffer[..found.start()].to_string();
                let matched = found.as_str().to_string();
                let end = found.end();
                self.buffer.drain(..end);
                trace!(%matched, "console matched");
                return Ok(Expected { before, matched });
            }

            let mut chunk = [0u8; 4096];
            let read = tokio::time::timeout_at(deadline, self.stream.read(&mut chunk)).await;
            let n = match read {
                Ok(n) => n?,
                Err(_) => {
                    return Err(Error::Timeout {
                        pattern: pattern.as_str().to_string(),
                        timeout_secs: self.timeout.as_secs(),
                    });
                }
            };
            if n == 0 {
                let mut pending = std::mem::take(&mut self.buffer);
                pending.push_str(&String::from_utf8_lossy(&std::mem::take(&mut self.partial)));
                return Err(Error::ConnectionClosed {
                    pattern: pattern.as_str().to_string(),
                    pending,
                });
            }
            self.ingest(&chunk[..n]).await?;
        }
    }

    /// Wait for the device to hang up. Output received meanwhile is discarded.
    pub async fn expect_eof(&mut self) -> Result<(), Error> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        let mut chunk = [0u8; 1024];
        loop {
            match tokio::time::timeout_at(deadline, self.stream.read(&mut chunk)).await {
                Ok(Ok(0)) => {
                    self.buffer.clear();
                    return Ok(());
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => {
                    return Err(Error::Timeout {
                        pattern: "<eof>".into(),
                        timeout_secs: self.timeout.as_secs(),
                    });
                }
            }
        }
    }

    /// Close our side of the stream.
    pub async fn shutdown(&mut self) -> Result<(), Error> {
        self.stream.shutdown().await?;
        Ok(())
    }

    async fn ingest(&mut self, raw: &[u8]) -> Result<(), Error> {
        let mut data = std::mem::take(&mut self.partial);
        match self.telnet.as_mut() {
            Some(filter) => {
                let (filtered, replies) = filter.filter(raw);
                if !replies.is_empty() {
                    self.stream.write_all(&replies).await?;
                    self.stream.flush().await?;
                }
                data.extend_from_slice(&filtered);
            }
            None => data.extend_from_slice(raw),
        }
        self.decode(data);
        Ok(())
    }

    /// Append `data` to the text buffer, holding back an incomplete UTF-8
    /// sequence at the end until the next read completes it.
    fn decode(&mut self, mut data: Vec<u8>) {
        let keep = data.len() - incomplete_tail(&data);
        self.partial = data.split_off(keep);
        self.buffer.push_str(&String::from_utf8_lossy(&data));
    }
}

/// Length of a truncated multi-byte sequence at the end of `data`, or 0.
fn incomplete_tail(data: &[u8]) -> usize {
    for back in 1..=data.len().min(3) {
        let byte = data[data.len() - back];
        if byte & 0xC0 != 0x80 {
            let width = match byte {
                0xC0..=0xDF => 2,
                0xE0..=0xEF => 3,
                0xF0..=0xF7 => 4,
                _ => 1,
            };
            return if width > back { back } else { 0 };
        }
    }
    0
}

/// Open a telnet console to `address` (`host` or `host:port`, default port 23).
pub async fn connect_telnet(address: &str, timeout: Duration) -> Result<Console<TcpStream>, Error> {
    let target = if address.contains(':') {
        address.to_string()
    } else {
        format!("{address}:23")
    };
    debug!(%target, "opening console connection");
    let stream = tokio::time::timeout(timeout, TcpStream::connect(&target))
        .await
        .map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("connecting to {target} timed out"),
            )
        })??;
    Ok(Console::new(stream, timeout).with_telnet())
}

// ── Telnet option handling ───────────────────────────────────────────

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

#[derive(Debug, Clone, Copy, Default)]
enum TelnetState {
    #[default]
    Data,
    Iac,
    Negotiate(u8),
    Subnegotiation,
    SubnegotiationIac,
}

/// Removes telnet commands from the byte stream and answers every `DO`
/// with `WONT` and every `WILL` with `DONT`. State survives chunk boundaries.
#[derive(Debug, Default)]
struct TelnetFilter {
    state: TelnetState,
}

impl TelnetFilter {
    fn filter(&mut self, input: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let mut data = Vec::with_capacity(input.len());
        let mut replies = Vec::new();
        for &byte in input {
            self.state = match (self.state, byte) {
                (TelnetState::Data, IAC) => TelnetState::Iac,
                (TelnetState::Data, _) => {
                    data.push(byte);
                    TelnetState::Data
                }
                (TelnetState::Iac, IAC) => {
                    data.push(IAC);
                    TelnetState::Data
                }
                (TelnetState::Iac, DO | DONT | WILL | WONT) => TelnetState::Negotiate(byte),
                (TelnetState::Iac, SB) => TelnetState::Subnegotiation,
                (TelnetState::Iac, _) => TelnetState::Data,
                (TelnetState::Negotiate(verb), option) => {
                    match verb {
                        DO => replies.extend_from_slice(&[IAC, WONT, option]),
                        WILL => replies.extend_from_slice(&[IAC, DONT, option]),
                        _ => {}
                    }
                    TelnetState::Data
                }
                (TelnetState::Subnegotiation, IAC) => TelnetState::SubnegotiationIac,
                (TelnetState::Subnegotiation, _) => TelnetState::Subnegotiation,
                (TelnetState::SubnegotiationIac, SE) => TelnetState::Data,
                (TelnetState::SubnegotiationIac, _) => TelnetState::Subnegotiation,
            };
        }
        (data, replies)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[test]
    fn telnet_negotiation_is_refused_and_stripped() {
        let mut filter = TelnetFilter::default();
        let input = [IAC, DO, 1, b'o', b'k', IAC, WILL, 3, IAC, IAC];
        let (data, replies) = filter.filter(&input);
        assert_eq!(data, vec![b'o', b'k', IAC]);
        assert_eq!(replies, vec![IAC, WONT, 1, IAC, DONT, 3]);
    }

    #[test]
    fn telnet_state_spans_chunks() {
        let mut filter = TelnetFilter::default();
        let (data, replies) = filter.filter(&[b'a', IAC]);
        assert_eq!(data, vec![b'a']);
        assert!(replies.is_empty());
        let (data, replies) = filter.filter(&[DO, 24, b'b', IAC, SB, 24, 1, IAC, SE, b'c']);
        assert_eq!(data, vec![b'b', b'c']);
        assert_eq!(replies, vec![IAC, WONT, 24]);
    }

    #[test]
    fn incomplete_tail_lengths() {
        assert_eq!(incomplete_tail(b"abc"), 0);
        assert_eq!(incomplete_tail("caf\u{e9}".as_bytes()), 0);
        assert_eq!(incomplete_tail(b"caf\xC3"), 1);
        assert_eq!(incomplete_tail(b"x\xF0\x9F\x98"), 3);
        assert_eq!(incomplete_tail(b"x\xA9"), 0);
    }

    #[tokio::test]
    async fn expect_splits_before_and_after_the_match() {
        let (client, mut device) = duplex(256);
        let mut console = Console::new(client, Duration::from_secs(5));
        device.write_all(b"banner\r\nsw1# trailing").await.unwrap();

        let prompt = Regex::new("sw1#").unwrap();
        let got = console.expect(&prompt).await.unwrap();
        assert_eq!(got.before, "banner\r\n");
        assert_eq!(got.matched, "sw1#");

        device.write_all(b" more\r\nsw1#").await.unwrap();
        let got = console.expect(&prompt).await.unwrap();
        assert_eq!(got.before, " trailing more\r\n");
    }

    #[tokio::test]
    async fn multibyte_characters_survive_split_reads() {
        let (client, mut device) = duplex(256);
        let mut console = Console::new(client, Duration::from_secs(5));
        let prompt = Regex::new("sw1#").unwrap();

        // "é" is 0xC3 0xA9; deliver the two bytes in separate reads.
        device.write_all(b"caf\xC3").await.unwrap();
        let pending = tokio::time::timeout(Duration::from_millis(50), console.expect(&prompt)).await;
        assert!(pending.is_err());
        device.write_all(b"\xA9\r\nsw1#").await.unwrap();

        let got = console.expect(&prompt).await.unwrap();
        assert_eq!(got.before, "caf\u{e9}\r\n");
    }

    #[tokio::test]
    async fn invalid_bytes_are_replaced() {
        let (client, mut device) = duplex(256);
        let mut console = Console::new(client, Duration::from_secs(5));
        device.write_all(b"a\xFFb sw1#").await.unwrap();
        let got = console.expect(&Regex::new("sw1#").unwrap()).await.unwrap();
        assert_eq!(got.before, "a\u{fffd}b ");
    }

    #[tokio::test]
    async fn send_line_appends_newline() {
        let (client, mut device) = duplex(256);
        let mut console = Console::new(client, Duration::from_secs(5));
        console.send_line("show version").await.unwrap();
        let mut buf = [0u8; 13];
        device.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"show version\n");
    }

    #[tokio::test]
    async fn closed_stream_reports_pending_output() {
        let (client, mut device) = duplex(256);
        let mut console = Console::new(client, Duration::from_secs(5));
        device.write_all(b"partial").await.unwrap();
        drop(device);

        let err = console.expect(&Regex::new("#").unwrap()).await.unwrap_err();
        match err {
            Error::ConnectionClosed { pending, .. } => assert_eq!(pending, "partial"),
            other => panic!("expected ConnectionClosed, got: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn expect_times_out() {
        let (client, _device) = duplex(256);
        let mut console = Console::new(client, Duration::from_secs(3));
        let err = console.expect(&Regex::new("#").unwrap()).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { timeout_secs: 3, .. }));
    }

    #[tokio::test]
    async fn eof_after_hangup() {
        let (client, device) = duplex(256);
        let mut console = Console::new(client, Duration::from_secs(5));
        drop(device);
        console.expect_eof().await.unwrap();
    }
}
