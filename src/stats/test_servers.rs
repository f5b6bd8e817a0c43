//! Loopback servers that accept Redis connections and then stop answering.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Accepts connections and never writes a byte.
///
/// Returns the `redis://` URL and the number of connections accepted so far.
pub async fn silent_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("redis://{}", listener.local_addr().unwrap());
    let accepts = Arc::new(AtomicUsize::new(0));

    let counter = accepts.clone();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(socket);
        }
    });

    (url, accepts)
}

/// Answers connection setup (`PING`, `CLIENT ...`) and stalls on anything else.
pub async fn setup_only_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("redis://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(answer_setup(socket));
        }
    });

    url
}

async fn answer_setup(mut socket: TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        while let Some((name, used)) = parse_command(&buf) {
            buf.drain(..used);
            let reply: &[u8] = match name.to_ascii_uppercase().as_str() {
                "PING" => b"+PONG\r\n",
                "CLIENT" => b"+OK\r\n",
                _ => continue,
            };
            if socket.write_all(reply).await.is_err() {
                return;
            }
        }
    }
}

/// Parse one RESP array of bulk strings, returning the command name and
/// the number of bytes it occupied.
fn parse_command(buf: &[u8]) -> Option<(String, usize)> {
    let (count, mut pos) = parse_header(buf, 0, b'*')?;
    let mut name = None;

    for _ in 0..count {
        let (len, start) = parse_header(buf, pos, b'$')?;
        let end = start + len;
        if buf.len() < end + 2 {
            return None;
        }
        name.get_or_insert_with(|| String::from_utf8_lossy(&buf[start..end]).into_owned());
        pos = end + 2;
    }

    Some((name.unwrap_or_default(), pos))
}

fn parse_header(buf: &[u8], pos: usize, marker: u8) -> Option<(usize, usize)> {
    if *buf.get(pos)? != marker {
        return None;
    }
    let rest = &buf[pos + 1..];
    let eol = rest.windows(2).position(|w| w == b"\r\n")?;
    let value = std::str::from_utf8(&rest[..eol]).ok()?.parse().ok()?;
    Some((value, pos + 1 + eol + 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_waits_for_full_frame() {
        let frame = b"*2\r\n$4\r\nINCR\r\n$3\r\nkey\r\n";

        assert_eq!(parse_command(&frame[..10]), None);
        assert_eq!(parse_command(frame), Some(("INCR".to_string(), frame.len())));
    }
}
