//! # Printer Link
//!
//! One TCP connection to one network label printer.
//!
//! ```text
//!                 connect() ok
//!  Disconnected ───────────────► Connected
//!       ▲                            │
//!       └────────────────────────────┘
//!        any I/O failure, peer EOF, close()
//! ```
//!
//! A raster print is two writes with a pause between them, so the printer
//! has stored the bitmap before the job that places it arrives:
//!
//! ```text
//! DOWNLOAD "LABEL.BMP",<len>,<bmp bytes>\n     ← frame
//!         (settle delay, default 200 ms)
//! SIZE .. / DIRECTION 1 / CLS / PUTBMP .. / PRINT 1
//! ```
//!
//! Nothing is retried once bytes have been written. Replies from the printer
//! are read in the background and logged; they are never matched to
//! commands.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::error::LabelError;
use crate::printer::config::Endpoint;
use crate::protocol::tspl::{self, AssetName};

/// Name the rendered bitmap is stored under in printer memory.
pub const DEFAULT_ASSET_NAME: &str = "LABEL.BMP";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connected,
}

/// Timing and naming knobs for a [`PrinterLink`].
#[derive(Debug, Clone)]
pub struct LinkOptions {
    /// Limit on establishing the TCP connection
    pub connect_timeout: Duration,
    /// Pause between the bitmap download and the print job
    pub settle_delay: Duration,
    /// Limit on the reachability probe
    pub probe_timeout: Duration,
    /// File name used for downloaded bitmaps
    pub asset_name: String,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            settle_delay: Duration::from_millis(200),
            probe_timeout: Duration::from_secs(3),
            asset_name: DEFAULT_ASSET_NAME.to_string(),
        }
    }
}

/// An open socket plus the task draining printer replies.
struct Connection {
    writer: OwnedWriteHalf,
    alive: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Log whatever the printer sends until it hangs up.
async fn drain_replies(mut reader: OwnedReadHalf, alive: Arc<AtomicBool>, endpoint: Endpoint) {
    let mut buf = [0u8; 1024];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                info!(addr = %endpoint, "printer closed the connection");
                break;
            }
            Ok(n) => {
                let reply = String::from_utf8_lossy(&buf[..n]);
                info!(addr = %endpoint, reply = %reply.trim(), "printer reply");
            }
            Err(e) => {
                warn!(addr = %endpoint, error = %e, "printer read failed");
                break;
            }
        }
    }
    alive.store(false, Ordering::SeqCst);
}

/// Whether something accepts TCP connections at `endpoint` within `timeout`.
///
/// Uses its own socket, which is closed before returning.
pub async fn probe(endpoint: &Endpoint, timeout: Duration) -> bool {
    let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
    match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(_stream)) => {
            debug!(addr = %endpoint, "printer reachable");
            true
        }
        Ok(Err(e)) => {
            debug!(addr = %endpoint, error = %e, "printer unreachable");
            false
        }
        Err(_) => {
            debug!(addr = %endpoint, ?timeout, "printer probe timed out");
            false
        }
    }
}

/// A cached connection to one printer.
pub struct PrinterLink {
    endpoint: Endpoint,
    options: LinkOptions,
    conn: Option<Connection>,
}

impl std::fmt::Debug for PrinterLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrinterLink")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state())
            .finish()
    }
}

impl PrinterLink {
    /// A link that has not connected yet.
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_options(endpoint, LinkOptions::default())
    }

    pub fn with_options(endpoint: Endpoint, options: LinkOptions) -> Self {
        Self {
            endpoint,
            options,
            conn: None,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn options(&self) -> &LinkOptions {
        &self.options
    }

    /// Last known state, without probing the socket.
    pub fn state(&self) -> LinkState {
        match &self.conn {
            Some(conn) if conn.alive.load(Ordering::SeqCst) => LinkState::Connected,
            _ => LinkState::Disconnected,
        }
    }

    /// Open a new connection, replacing any existing one.
    #[instrument(skip(self), fields(addr = %self.endpoint))]
    pub async fn connect(&mut self) -> Result<(), LabelError> {
        self.conn = None;

        let connect = TcpStream::connect((self.endpoint.host.as_str(), self.endpoint.port));
        let stream = tokio::time::timeout(self.options.connect_timeout, connect)
            .await
            .map_err(|_| {
                LabelError::Connection(format!(
                    "{}: connect timed out after {:?}",
                    self.endpoint, self.options.connect_timeout
                ))
            })?
            .map_err(|e| LabelError::Connection(format!("{}: {}", self.endpoint, e)))?;

        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "could not disable Nagle");
        }

        let (reader, writer) = stream.into_split();
        let alive = Arc::new(AtomicBool::new(true));
        let reader = tokio::spawn(drain_replies(reader, alive.clone(), self.endpoint.clone()));
        self.conn = Some(Connection {
            writer,
            alive,
            reader,
        });

        info!("connected to printer");
        Ok(())
    }

    /// Check the cached connection, demoting it if it has gone bad.
    ///
    /// Looks at the reply reader (peer EOF or read error), any pending socket
    /// error, and a zero-length write.
    pub fn is_connected(&mut self) -> bool {
        let Some(conn) = &self.conn else {
            return false;
        };

        let healthy = conn.alive.load(Ordering::SeqCst)
            && !matches!(conn.writer.as_ref().take_error(), Ok(Some(_)) | Err(_))
            && match conn.writer.try_write(&[]) {
                Ok(_) => true,
                Err(e) => e.kind() == std::io::ErrorKind::WouldBlock,
            };

        if !healthy {
            info!(addr = %self.endpoint, "printer connection lost");
            self.conn = None;
        }
        healthy
    }

    /// Probe the printer on a fresh socket. Does not touch the cached
    /// connection.
    pub async fn check_reachable(&self, timeout: Duration) -> bool {
        probe(&self.endpoint, timeout).await
    }

    /// Reuse the cached connection or make one attempt to reconnect, and
    /// take it out of the link for the duration of a send.
    ///
    /// The caller puts it back with [`PrinterLink::restore`] once every write
    /// of the sequence has finished. If the send future is dropped halfway,
    /// the connection is dropped with it and the next send starts on a fresh
    /// socket instead of inside a half-written frame.
    async fn checkout(&mut self) -> Result<Connection, LabelError> {
        if !self.is_connected() {
            self.connect().await?;
        }
        self.conn.take().ok_or_else(|| {
            LabelError::Connection(format!("{}: not connected", self.endpoint))
        })
    }

    fn restore(&mut self, conn: Connection) {
        self.conn = Some(conn);
    }

    /// Write all of `data`. On failure the connection is consumed.
    async fn write(&self, mut conn: Connection, data: &[u8]) -> Result<Connection, LabelError> {
        let result = match conn.writer.write_all(data).await {
            Ok(()) => conn.writer.flush().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => Ok(conn),
            Err(e) => Err(LabelError::Connection(format!(
                "{}: write failed: {}",
                self.endpoint, e
            ))),
        }
    }

    /// Download a BMP and print it once on `width_mm × height_mm` stock.
    #[instrument(skip(self, bmp), fields(addr = %self.endpoint, len = bmp.len()))]
    pub async fn send_raster(&mut self, bmp: &[u8], width_mm: f64, height_mm: f64) -> Result<(), LabelError> {
        let name = AssetName::new(&self.options.asset_name)?;
        let frame = tspl::download(&name, bmp);
        let job = tspl::raster_job(&name, width_mm, height_mm)?;

        let conn = self.checkout().await?;
        let conn = self.write(conn, &frame).await?;
        debug!(bytes = frame.len(), "bitmap downloaded");
        tokio::time::sleep(self.options.settle_delay).await;
        let conn = self.write(conn, &job).await?;
        self.restore(conn);

        info!("raster print job sent");
        Ok(())
    }

    /// Print one line of text in the printer's built-in font.
    #[instrument(skip(self), fields(addr = %self.endpoint))]
    pub async fn send_text(
        &mut self,
        text: &str,
        x: u32,
        y: u32,
        width_mm: f64,
        height_mm: f64,
    ) -> Result<(), LabelError> {
        let job = tspl::text_job(text, x, y, width_mm, height_mm)?;

        let conn = self.checkout().await?;
        let conn = self.write(conn, &job).await?;
        self.restore(conn);

        info!("text print job sent");
        Ok(())
    }

    /// Shut the connection down. A no-op when disconnected.
    pub async fn close(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            if let Err(e) = conn.writer.shutdown().await {
                debug!(addr = %self.endpoint, error = %e, "shutdown failed");
            }
            info!(addr = %self.endpoint, "printer connection closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::net::TcpListener;

    fn fast_options() -> LinkOptions {
        LinkOptions {
            connect_timeout: Duration::from_secs(2),
            settle_delay: Duration::from_millis(0),
            probe_timeout: Duration::from_secs(1),
            ..Default::default()
        }
    }

    async fn listener() -> (TcpListener, Endpoint) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, Endpoint::new("127.0.0.1", port))
    }

    /// Accept one connection and collect everything written until EOF.
    fn record_one(listener: TcpListener) -> JoinHandle<Vec<u8>> {
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        })
    }

    async fn closed_port() -> Endpoint {
        let (listener, endpoint) = listener().await;
        drop(listener);
        endpoint
    }

    #[tokio::test]
    async fn test_send_raster_wire_format() {
        let (listener, endpoint) = listener().await;
        let server = record_one(listener);

        let mut link = PrinterLink::with_options(endpoint, fast_options());
        link.send_raster(b"BM-fake-bitmap", 100.0, 29.0).await.unwrap();
        assert_eq!(link.state(), LinkState::Connected);
        link.close().await;
        assert_eq!(link.state(), LinkState::Disconnected);

        let received = server.await.unwrap();
        let expected = [
            &b"DOWNLOAD \"LABEL.BMP\",14,BM-fake-bitmap\n"[..],
            &b"SIZE 100 mm,29 mm\nDIRECTION 1\nCLS\nPUTBMP 0,0,\"LABEL.BMP\"\nPRINT 1\n"[..],
        ]
        .concat();
        assert_eq!(String::from_utf8_lossy(&received), String::from_utf8_lossy(&expected));
    }

    #[tokio::test]
    async fn test_send_text_wire_format() {
        let (listener, endpoint) = listener().await;
        let server = record_one(listener);

        let mut link = PrinterLink::with_options(endpoint, fast_options());
        link.send_text("HELLO", 10, 10, 100.0, 20.0).await.unwrap();
        link.close().await;

        let received = server.await.unwrap();
        assert_eq!(
            String::from_utf8(received).unwrap(),
            "SIZE 100 mm,20 mm\nDIRECTION 1\nCLS\nTEXT 10,10,\"2\",0,1,1,\"HELLO\"\nPRINT 1,1\n"
        );
    }

    #[tokio::test]
    async fn test_injected_text_never_reaches_the_wire() {
        let endpoint = closed_port().await;
        let mut link = PrinterLink::with_options(endpoint, fast_options());
        // Validation fails before any connection attempt
        let err = link.send_text("x\"\nPRINT 99", 0, 0, 100.0, 20.0).await.unwrap_err();
        assert!(matches!(err, LabelError::InvalidCommand(_)));
    }

    #[tokio::test]
    async fn test_unreachable_printer_is_connection_error() {
        let endpoint = closed_port().await;
        let mut link = PrinterLink::with_options(endpoint, fast_options());
        let err = link.send_raster(b"BM", 100.0, 29.0).await.unwrap_err();
        assert!(matches!(err, LabelError::Connection(_)));
        assert_eq!(link.state(), LinkState::Disconnected);
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn test_probe_closed_port_is_false() {
        let endpoint = closed_port().await;
        let link = PrinterLink::with_options(endpoint, fast_options());
        let started = std::time::Instant::now();
        assert!(!link.check_reachable(Duration::from_secs(1)).await);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_probe_does_not_touch_cached_state() {
        let (listener, endpoint) = listener().await;
        let _server = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                drop(socket);
            }
        });

        let link = PrinterLink::with_options(endpoint, fast_options());
        assert!(link.check_reachable(Duration::from_secs(1)).await);
        assert_eq!(link.state(), LinkState::Disconnected);
    }

    #[tokio::test]
    async fn test_peer_hangup_demotes_and_reconnects() {
        let (listener, endpoint) = listener().await;
        let server = tokio::spawn(async move {
            // First connection is dropped straight away
            let (first, _) = listener.accept().await.unwrap();
            drop(first);
            // Second one records the job
            let (mut second, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            second.read_to_end(&mut received).await.unwrap();
            received
        });

        let mut link = PrinterLink::with_options(endpoint, fast_options());
        link.connect().await.unwrap();

        let mut waited = Duration::ZERO;
        while link.is_connected() && waited < Duration::from_secs(2) {
            tokio::time::sleep(Duration::from_millis(20)).await;
            waited += Duration::from_millis(20);
        }
        assert!(!link.is_connected());
        assert_eq!(link.state(), LinkState::Disconnected);

        link.send_text("AGAIN", 0, 0, 50.0, 25.0).await.unwrap();
        link.close().await;
        let received = String::from_utf8(server.await.unwrap()).unwrap();
        assert!(received.contains("\"AGAIN\""), "{}", received);
    }

    #[tokio::test]
    async fn test_dropped_send_leaves_link_disconnected() {
        let (listener, endpoint) = listener().await;
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let mut link = PrinterLink::with_options(endpoint, fast_options());
        let bmp = vec![0u8; 64 * 1024 * 1024];
        let sent = tokio::time::timeout(Duration::from_millis(300), link.send_raster(&bmp, 50.0, 25.0)).await;
        assert!(sent.is_err());
        assert_eq!(link.state(), LinkState::Disconnected);
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn test_custom_asset_name() {
        let (listener, endpoint) = listener().await;
        let server = record_one(listener);

        let options = LinkOptions {
            asset_name: "logo.bmp".into(),
            ..fast_options()
        };
        let mut link = PrinterLink::with_options(endpoint, options);
        link.send_raster(b"", 50.0, 25.0).await.unwrap();
        link.close().await;

        let received = String::from_utf8(server.await.unwrap()).unwrap();
        assert!(received.starts_with("DOWNLOAD \"LOGO.BMP\",0,\n"), "{}", received);
        assert!(received.contains("PUTBMP 0,0,\"LOGO.BMP\"\n"));
    }

    #[tokio::test]
    async fn test_invalid_asset_name_rejected() {
        let endpoint = closed_port().await;
        let options = LinkOptions {
            asset_name: "bad\"name".into(),
            ..fast_options()
        };
        let mut link = PrinterLink::with_options(endpoint, options);
        let err = link.send_raster(b"BM", 50.0, 25.0).await.unwrap_err();
        assert!(matches!(err, LabelError::InvalidCommand(_)));
    }
}
