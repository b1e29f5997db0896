//! Serial link to pad boards.
//!
//! Each command opens the pad's serial device, writes the encoded command,
//! collects whatever the board prints until the read limit or the read
//! timeout is reached, and closes the device again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use faser_core::board::{parse_replies, BoardCommand, BoardReply, ProtocolError};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tokio_serial::{
    DataBits, FlowControl, Parity, SerialPort, SerialPortBuilderExt, SerialStream, StopBits,
};

/// Most bytes collected in reply to one command.
pub const READ_LIMIT: usize = 256;

pub const BAUD_RATE: u32 = 9600;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("serial port {device} unavailable: {source}")]
    Io {
        device: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid reply from board: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Sends one command to the board on `device` and returns its raw output.
#[async_trait]
pub trait BoardLink: Send + Sync {
    async fn send(&self, device: &str, command: &BoardCommand) -> Result<String, BoardError>;
}

/// Send `command` and parse what the board printed.
pub async fn exchange(
    link: &dyn BoardLink,
    device: &str,
    command: &BoardCommand,
) -> Result<Vec<BoardReply>, BoardError> {
    let raw = link.send(device, command).await?;
    let replies = parse_replies(&raw)?;
    tracing::debug!(%device, %command, replies = replies.len(), "Board exchange complete");
    Ok(replies)
}

/// Open `device` as a 9600 baud 8N1 line in raw mode with DTR raised.
pub fn open_port(device: &str, read_timeout: Duration) -> tokio_serial::Result<SerialStream> {
    let mut port = tokio_serial::new(device, BAUD_RATE)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(read_timeout)
        .open_native_async()?;
    port.write_data_terminal_ready(true)?;
    Ok(port)
}

/// Write `command` to `port` and collect output until `read_limit` bytes
/// have arrived or `read_timeout` has elapsed since the write.
///
/// A read cut short by the timeout is dropped without consuming anything,
/// so bytes arriving later are left for the next command.
pub async fn transact<P>(
    port: &mut P,
    command: &BoardCommand,
    read_timeout: Duration,
    read_limit: usize,
) -> std::io::Result<String>
where
    P: AsyncRead + AsyncWrite + Unpin,
{
    port.write_all(command.encode().as_bytes()).await?;
    port.flush().await?;

    let deadline = Instant::now() + read_timeout;
    let mut output = Vec::with_capacity(read_limit);
    let mut chunk = [0u8; 64];
    while output.len() < read_limit {
        let want = (read_limit - output.len()).min(chunk.len());
        match tokio::time::timeout_at(deadline, port.read(&mut chunk[..want])).await {
            Err(_elapsed) => break,
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => output.extend_from_slice(&chunk[..n]),
            Ok(Err(source)) => return Err(source),
        }
    }

    Ok(String::from_utf8_lossy(&output).into_owned())
}

/// [`BoardLink`] over a serial device such as `/dev/ttyACM0`.
///
/// Commands to the same device are serialized so replies cannot interleave.
pub struct SerialBoard {
    read_timeout: Duration,
    read_limit: usize,
    sessions: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SerialBoard {
    pub fn new(read_timeout: Duration) -> Self {
        Self {
            read_timeout,
            read_limit: READ_LIMIT,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn session(&self, device: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(sessions.entry(device.to_string()).or_default())
    }
}

#[async_trait]
impl BoardLink for SerialBoard {
    async fn send(&self, device: &str, command: &BoardCommand) -> Result<String, BoardError> {
        let io_err = |source: std::io::Error| BoardError::Io {
            device: device.to_string(),
            source,
        };

        let session = self.session(device);
        let _exclusive = session.lock().await;

        let mut port = open_port(device, self.read_timeout).map_err(|e| io_err(e.into()))?;
        tracing::debug!(%device, %command, "Writing command to board");

        let output = transact(&mut port, command, self.read_timeout, self.read_limit)
            .await
            .map_err(io_err)?;
        Ok(output)
    }
}
