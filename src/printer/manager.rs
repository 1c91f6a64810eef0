//! # Printer Manager
//!
//! Registry of [`PrinterLink`]s keyed by endpoint, so repeated prints to the
//! same printer reuse one connection.
//!
//! ```text
//!  std Mutex (held only to look up / insert)
//!  ┌──────────────────────────────────────────────────┐
//!  │ 192.168.1.200:9100 → Arc<tokio Mutex<PrinterLink>> │──► serialized sends
//!  │ 192.168.1.201:9100 → Arc<tokio Mutex<PrinterLink>> │──► serialized sends
//!  └──────────────────────────────────────────────────┘
//! ```
//!
//! Sends to one printer queue on that printer's async mutex, so a raster's
//! download and job are never interleaved with another send. Different
//! printers proceed independently. Links are created lazily and live until
//! [`PrinterManager::disconnect_all`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, instrument};

use crate::error::LabelError;
use crate::printer::config::Endpoint;
use crate::printer::link::{self, LinkOptions, PrinterLink};

type SharedLink = Arc<tokio::sync::Mutex<PrinterLink>>;

/// Owns the connection cache. Construct one and share it (e.g. in an `Arc`).
#[derive(Default)]
pub struct PrinterManager {
    options: LinkOptions,
    links: Mutex<HashMap<Endpoint, SharedLink>>,
}

impl PrinterManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options applied to every link this manager creates.
    pub fn with_options(options: LinkOptions) -> Self {
        Self {
            options,
            links: Mutex::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> &LinkOptions {
        &self.options
    }

    fn link(&self, endpoint: &Endpoint) -> SharedLink {
        let mut links = self.links.lock().unwrap_or_else(PoisonError::into_inner);
        links
            .entry(endpoint.clone())
            .or_insert_with(|| {
                Arc::new(tokio::sync::Mutex::new(PrinterLink::with_options(
                    endpoint.clone(),
                    self.options.clone(),
                )))
            })
            .clone()
    }

    /// Whether the printer accepts connections, probed on a fresh socket
    /// with the configured probe timeout. Creates no cached link.
    pub async fn status(&self, endpoint: &Endpoint) -> bool {
        link::probe(endpoint, self.options.probe_timeout).await
    }

    /// Download `bmp` to the printer and print it once.
    #[instrument(skip(self, bmp), fields(addr = %endpoint, len = bmp.len()))]
    pub async fn print_raster(
        &self,
        endpoint: &Endpoint,
        bmp: &[u8],
        width_mm: f64,
        height_mm: f64,
    ) -> Result<(), LabelError> {
        let link = self.link(endpoint);
        let mut link = link.lock().await;
        link.send_raster(bmp, width_mm, height_mm).await
    }

    /// Print one line of text in the printer's built-in font.
    #[instrument(skip(self), fields(addr = %endpoint))]
    pub async fn print_text(
        &self,
        endpoint: &Endpoint,
        text: &str,
        x: u32,
        y: u32,
        width_mm: f64,
        height_mm: f64,
    ) -> Result<(), LabelError> {
        let link = self.link(endpoint);
        let mut link = link.lock().await;
        link.send_text(text, x, y, width_mm, height_mm).await
    }

    /// Close every cached connection and forget the links.
    pub async fn disconnect_all(&self) {
        let links: Vec<SharedLink> = {
            let mut map = self.links.lock().unwrap_or_else(PoisonError::into_inner);
            map.drain().map(|(_, link)| link).collect()
        };
        let count = links.len();
        for link in links {
            link.lock().await.close().await;
        }
        info!(count, "disconnected all printers");
    }

    /// Endpoints that currently have a cached link, sorted.
    pub fn cached_endpoints(&self) -> Vec<Endpoint> {
        let map = self.links.lock().unwrap_or_else(PoisonError::into_inner);
        let mut endpoints: Vec<Endpoint> = map.keys().cloned().collect();
        endpoints.sort();
        endpoints
    }
}
