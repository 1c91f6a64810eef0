//! # Label Store
//!
//! Persistence seam for printer records and saved label designs. The
//! rendering and printing code never persists anything itself; callers
//! that need storage implement [`LabelStore`] over their own database.
//!
//! [`MemoryStore`] is a process-local implementation for tests and for
//! embedding applications that do not need persistence.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::editor::EditorLayout;
use crate::error::LabelError;
use crate::printer::{Endpoint, PrinterEndpoint};

/// A registered printer, keyed by `ip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterRecord {
    pub ip: String,
    pub name: String,
    pub dpi: f64,
    /// Label width in millimeters
    pub width: f64,
    /// Label height in millimeters
    pub height: f64,
}

impl PrinterRecord {
    /// Endpoint on the default raw printing port, with this record's stock.
    pub fn printer_endpoint(&self) -> PrinterEndpoint {
        PrinterEndpoint {
            endpoint: Endpoint::from_host(self.ip.clone()),
            dpi: self.dpi,
            width_mm: self.width,
            height_mm: self.height,
        }
    }
}

/// Storage for printers and the label designs saved per printer.
pub trait LabelStore: Send + Sync {
    fn printers(&self) -> Result<Vec<PrinterRecord>, LabelError>;
    fn printer(&self, ip: &str) -> Result<Option<PrinterRecord>, LabelError>;
    /// Fails if a printer with the same `ip` exists.
    fn insert_printer(&self, record: PrinterRecord) -> Result<(), LabelError>;
    /// Fails if no printer with `record.ip` exists.
    fn update_printer(&self, record: PrinterRecord) -> Result<(), LabelError>;
    /// Removes the printer and its saved designs. Returns whether it existed.
    fn delete_printer(&self, ip: &str) -> Result<bool, LabelError>;

    fn label(&self, ip: &str, name: &str) -> Result<Option<EditorLayout>, LabelError>;
    /// Insert or replace the design `name` for printer `ip`.
    fn put_label(&self, ip: &str, name: &str, layout: EditorLayout) -> Result<(), LabelError>;
    fn delete_label(&self, ip: &str, name: &str) -> Result<bool, LabelError>;
    /// Names of the designs saved for `ip`, sorted.
    fn label_names(&self, ip: &str) -> Result<Vec<String>, LabelError>;
}

#[derive(Debug, Default)]
struct Tables {
    printers: BTreeMap<String, PrinterRecord>,
    labels: BTreeMap<(String, String), EditorLayout>,
}

/// In-memory [`LabelStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LabelStore for MemoryStore {
    fn printers(&self) -> Result<Vec<PrinterRecord>, LabelError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.printers.values().cloned().collect())
    }

    fn printer(&self, ip: &str) -> Result<Option<PrinterRecord>, LabelError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.printers.get(ip).cloned())
    }

    fn insert_printer(&self, record: PrinterRecord) -> Result<(), LabelError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        if tables.printers.contains_key(&record.ip) {
            return Err(LabelError::Store(format!("printer {} already exists", record.ip)));
        }
        tables.printers.insert(record.ip.clone(), record);
        Ok(())
    }

    fn update_printer(&self, record: PrinterRecord) -> Result<(), LabelError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        match tables.printers.get_mut(&record.ip) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(LabelError::Store(format!("printer {} not found", record.ip))),
        }
    }

    fn delete_printer(&self, ip: &str) -> Result<bool, LabelError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables.labels.retain(|(label_ip, _), _| label_ip != ip);
        Ok(tables.printers.remove(ip).is_some())
    }

    fn label(&self, ip: &str, name: &str) -> Result<Option<EditorLayout>, LabelError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.labels.get(&(ip.to_string(), name.to_string())).cloned())
    }

    fn put_label(&self, ip: &str, name: &str, layout: EditorLayout) -> Result<(), LabelError> {
        if name.trim().is_empty() {
            return Err(LabelError::Store("label name must not be empty".into()));
        }
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables.labels.insert((ip.to_string(), name.to_string()), layout);
        Ok(())
    }

    fn delete_label(&self, ip: &str, name: &str) -> Result<bool, LabelError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        Ok(tables
            .labels
            .remove(&(ip.to_string(), name.to_string()))
            .is_some())
    }

    fn label_names(&self, ip: &str) -> Result<Vec<String>, LabelError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables
            .labels
            .keys()
            .filter(|(label_ip, _)| label_ip == ip)
            .map(|(_, name)| name.clone())
            .collect())
    }
}
