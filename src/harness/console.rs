use std::{collections::VecDeque, io};

use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

const MAX_LINE_LENGTH: usize = 4096;

/// Operator terminal: line-framed input read one key at a time, plain
/// text output.
pub struct Console<R, W> {
    lines: FramedRead<R, LinesCodec>,
    pending: VecDeque<char>,
    output: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            lines: FramedRead::new(input, LinesCodec::new_with_max_length(MAX_LINE_LENGTH)),
            pending: VecDeque::new(),
            output,
        }
    }

    pub async fn say(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        self.output.write_all(text.as_ref().as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }

    /// Writes `text` without a line break and flushes it.
    pub async fn prompt(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await
    }

    /// Next non-whitespace key, or `None` once input is exhausted.
    pub async fn next_key(&mut self) -> io::Result<Option<char>> {
        loop {
            if let Some(key) = self.pending.pop_front() {
                return Ok(Some(key));
            }
            match self.lines.next().await {
                Some(Ok(line)) => self
                    .pending
                    .extend(line.chars().filter(|c| !c.is_whitespace())),
                Some(Err(LinesCodecError::Io(e))) => return Err(e),
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "input line too long",
                    ))
                }
                None => return Ok(None),
            }
        }
    }

    /// Drops keys left over from the current line.
    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }

    pub fn output(&self) -> &W {
        &self.output
    }
}
