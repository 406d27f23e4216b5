use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::RunnerError;
use crate::util::RingBytes;

/// One decoded output line, tagged with the stream it came from.
#[derive(Debug)]
pub struct LineTap {
    pub line: String,
    pub stream: LineStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStream {
    Stdout,
    Stderr,
}

impl LineStream {
    fn label(self) -> &'static str {
        match self {
            LineStream::Stdout => "stdout",
            LineStream::Stderr => "stderr",
        }
    }
}

/// Reads `rd` to EOF on its own task, sending each line (without its `\n` / `\r\n`) to
/// `line_tx` and the raw bytes to `ring`. Resolves to the number of bytes read.
///
/// A closed receiver does not stop the read: the pipe must keep draining or the child blocks.
pub fn spawn_pump<R>(
    rd: R,
    stream: LineStream,
    ring: Arc<RingBytes>,
    line_tx: mpsc::Sender<LineTap>,
) -> JoinHandle<Result<u64, RunnerError>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::with_capacity(16 * 1024, rd);
        let mut raw = Vec::with_capacity(1024);
        let mut total = 0u64;

        loop {
            raw.clear();
            let n = reader
                .read_until(b'\n', &mut raw)
                .await
                .map_err(|source| RunnerError::StreamIo {
                    stream: stream.label(),
                    source,
                })?;
            if n == 0 {
                break;
            }
            total += n as u64;
            ring.push(&raw);

            let line = decode_line(&raw);
            // A final fragment of just "\r" carries no text.
            if line.is_empty() && raw.last() != Some(&b'\n') {
                continue;
            }
            let _ = line_tx.send(LineTap { line, stream }).await;
        }

        Ok(total)
    })
}

fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && raw[end - 1] == b'\r' {
        end -= 1;
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncWriteExt;

    use super::*;

    #[tokio::test]
    async fn flushes_last_line_without_newline_on_eof() {
        let (mut wr, rd) = tokio::io::duplex(1024);
        let ring = RingBytes::new(1024);
        let (tx, mut rx) = mpsc::channel::<LineTap>(8);

        let task = spawn_pump(rd, LineStream::Stdout, ring, tx);

        wr.write_all(b"hello").await.unwrap();
        drop(wr);

        let tap = rx.recv().await.expect("expected one line");
        assert_eq!(tap.line, "hello");
        assert_eq!(tap.stream, LineStream::Stdout);
        assert!(rx.recv().await.is_none());

        assert_eq!(task.await.unwrap().unwrap(), 5);
    }

    #[tokio::test]
    async fn splits_crlf_lines_and_records_tail() {
        let (mut wr, rd) = tokio::io::duplex(1024);
        let ring = RingBytes::new(1024);
        let (tx, mut rx) = mpsc::channel::<LineTap>(8);

        let task = spawn_pump(rd, LineStream::Stderr, ring.clone(), tx);

        wr.write_all(b"a.c:1: error\r\n\nsecond\n").await.unwrap();
        drop(wr);

        let mut lines = Vec::new();
        while let Some(tap) = rx.recv().await {
            assert_eq!(tap.stream, LineStream::Stderr);
            lines.push(tap.line);
        }
        assert_eq!(lines, vec!["a.c:1: error", "", "second"]);
        assert_eq!(task.await.unwrap().unwrap(), 22);
        assert_eq!(ring.to_string_lossy(), "a.c:1: error\r\n\nsecond\n");
    }

    #[tokio::test]
    async fn keeps_draining_after_the_receiver_is_gone() {
        let (mut wr, rd) = tokio::io::duplex(64);
        let ring = RingBytes::new(16);
        let (tx, rx) = mpsc::channel::<LineTap>(1);
        drop(rx);

        let task = spawn_pump(rd, LineStream::Stdout, ring, tx);
        for _ in 0..100 {
            wr.write_all(b"0123456789\n").await.unwrap();
        }
        drop(wr);

        assert_eq!(task.await.unwrap().unwrap(), 1100);
    }
}
