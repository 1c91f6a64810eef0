//! # Printer Protocol
//!
//! Command builders for TSC label printers speaking TSPL.
//!
//! ## Module Structure
//!
//! - [`tspl`]: command lines, file download framing, and complete jobs
//!
//! ## Usage Example
//!
//! ```
//! use labelpress::protocol::tspl::{self, AssetName};
//!
//! let name = AssetName::new("LABEL.BMP")?;
//! let bmp_bytes: Vec<u8> = vec![0x42, 0x4D]; // rendered label
//!
//! // First the bitmap goes into printer memory...
//! let frame = tspl::download(&name, &bmp_bytes);
//!
//! // ...then a job places and prints it
//! let job = tspl::raster_job(&name, 100.0, 29.0)?;
//!
//! // Send `frame`, wait briefly, then send `job`.
//! # let _ = (frame, job);
//! # Ok::<(), labelpress::LabelError>(())
//! ```
//!
//! ## Protocol Reference
//!
//! Based on the "TSPL/TSPL2 Programming Language" manual by TSC Auto ID
//! Technology Co., Ltd.

pub mod tspl;
