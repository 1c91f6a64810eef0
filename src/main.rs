//! # labelpress CLI
//!
//! Command-line interface for rendering labels and printing them on TSC
//! network label printers.
//!
//! ## Usage
//!
//! ```bash
//! # Render a layout to a BMP
//! labelpress render layout.json -o label.bmp
//!
//! # Render an editor payload onto 50 × 25 mm stock at 203 dpi
//! labelpress render design.json --editor --stock "TSC TE200 50x25" -o label.bmp
//!
//! # Render and print in one go
//! labelpress print layout.json --printer 192.168.1.200
//!
//! # Print an existing BMP
//! labelpress print-bmp label.bmp --printer 192.168.1.200 --width-mm 100 --height-mm 29
//!
//! # Print a line in the printer's own font
//! labelpress print-text "LOT 42" --printer 192.168.1.200:9100 --x 10 --y 10
//!
//! # Is the printer up?
//! labelpress status --printer 192.168.1.200
//! ```
//!
//! Logging goes to stderr, filtered by `RUST_LOG` (default `info`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use labelpress::{
    LabelError,
    editor::EditorLayout,
    printer::{Endpoint, LabelStock, LinkOptions, PrinterManager},
    render::{LabelRenderer, LabelSpec, RenderedLabel, dither::parse_dither_algorithm},
};

/// labelpress - label rendering and TSPL network printing
#[derive(Parser, Debug)]
#[command(name = "labelpress")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct StockArgs {
    /// Label stock preset (see `labelpress stocks`)
    #[arg(long)]
    stock: Option<String>,

    /// Label width in millimeters (overrides the preset)
    #[arg(long)]
    width_mm: Option<f64>,

    /// Label height in millimeters (overrides the preset)
    #[arg(long)]
    height_mm: Option<f64>,

    /// Printer resolution (overrides the preset)
    #[arg(long)]
    dpi: Option<f64>,
}

impl StockArgs {
    fn is_set(&self) -> bool {
        self.stock.is_some() || self.width_mm.is_some() || self.height_mm.is_some() || self.dpi.is_some()
    }

    fn resolve(&self) -> Result<LabelStock, LabelError> {
        let mut stock = match &self.stock {
            Some(name) => LabelStock::by_name(name).ok_or_else(|| {
                LabelError::Configuration(format!("unknown label stock: {}", name))
            })?,
            None => LabelStock::default(),
        };
        if let Some(w) = self.width_mm {
            stock.width_mm = w;
        }
        if let Some(h) = self.height_mm {
            stock.height_mm = h;
        }
        if let Some(dpi) = self.dpi {
            stock.dpi = dpi;
        }
        Ok(stock)
    }
}

#[derive(Args, Debug, Clone)]
struct LayoutArgs {
    /// Layout JSON file
    layout: PathBuf,

    /// Treat the file as an editor payload (textItems, barcodeItems, ...)
    #[arg(long)]
    editor: bool,

    /// Dithering for image elements: floyd-steinberg, bayer, none
    #[arg(long, default_value = "floyd-steinberg")]
    dither: String,

    #[command(flatten)]
    stock: StockArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a layout to a 1-bit BMP
    Render {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Output BMP path
        #[arg(short, long, default_value = "label.bmp")]
        output: PathBuf,
    },

    /// Render a layout and print it
    Print {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Printer address, `host` or `host:port`
        #[arg(long)]
        printer: Endpoint,
    },

    /// Print an existing BMP file
    PrintBmp {
        /// BMP file
        file: PathBuf,

        /// Printer address, `host` or `host:port`
        #[arg(long)]
        printer: Endpoint,

        #[command(flatten)]
        stock: StockArgs,

        /// Pause between download and print job, in milliseconds
        #[arg(long, default_value = "200")]
        settle_ms: u64,
    },

    /// Print one line of text in the printer's built-in font
    PrintText {
        text: String,

        /// Printer address, `host` or `host:port`
        #[arg(long)]
        printer: Endpoint,

        #[arg(long, default_value = "10")]
        x: u32,

        #[arg(long, default_value = "10")]
        y: u32,

        #[command(flatten)]
        stock: StockArgs,
    },

    /// Check whether a printer accepts connections
    Status {
        /// Printer address, `host` or `host:port`
        #[arg(long)]
        printer: Endpoint,

        /// Probe timeout in seconds
        #[arg(long, default_value = "3")]
        timeout: u64,
    },

    /// List label stock presets
    Stocks,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), LabelError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render { layout, output } => {
            let label = render_layout(layout).await?;
            label.save(&output)?;
            println!(
                "Wrote {} ({}x{} px)",
                output.display(),
                label.bitmap.width(),
                label.bitmap.height()
            );
        }

        Commands::Print { layout, printer } => {
            let label = render_layout(layout).await?;
            let manager = PrinterManager::new();
            manager
                .print_raster(
                    &printer,
                    &label.to_bmp(),
                    label.geometry.width_mm,
                    label.geometry.height_mm,
                )
                .await?;
            manager.disconnect_all().await;
            println!("Printed on {}", printer);
        }

        Commands::PrintBmp {
            file,
            printer,
            stock,
            settle_ms,
        } => {
            let stock = stock.resolve()?;
            let bmp = std::fs::read(&file)?;
            let manager = PrinterManager::with_options(LinkOptions {
                settle_delay: Duration::from_millis(settle_ms),
                ..Default::default()
            });
            manager
                .print_raster(&printer, &bmp, stock.width_mm, stock.height_mm)
                .await?;
            manager.disconnect_all().await;
            println!("Printed {} on {}", file.display(), printer);
        }

        Commands::PrintText {
            text,
            printer,
            x,
            y,
            stock,
        } => {
            let stock = stock.resolve()?;
            let manager = PrinterManager::new();
            manager
                .print_text(&printer, &text, x, y, stock.width_mm, stock.height_mm)
                .await?;
            manager.disconnect_all().await;
            println!("Printed text on {}", printer);
        }

        Commands::Status { printer, timeout } => {
            let manager = PrinterManager::with_options(LinkOptions {
                probe_timeout: Duration::from_secs(timeout),
                ..Default::default()
            });
            if manager.status(&printer).await {
                println!("{}: online", printer);
            } else {
                println!("{}: offline", printer);
                std::process::exit(2);
            }
        }

        Commands::Stocks => {
            for stock in LabelStock::PRESETS {
                println!(
                    "  {:<20} {} x {} mm @ {} dpi",
                    stock.name, stock.width_mm, stock.height_mm, stock.dpi
                );
            }
        }
    }

    Ok(())
}

/// Layout files carry their own size and resolution; stock flags only apply
/// to editor payloads.
fn check_stock_flags(editor: bool, stock: &StockArgs) -> Result<(), LabelError> {
    if !editor && stock.is_set() {
        return Err(LabelError::Configuration(
            "--stock, --width-mm, --height-mm and --dpi require --editor; \
             a layout file sets width_mm, height_mm and dpi itself"
                .into(),
        ));
    }
    Ok(())
}

fn read_spec(path: &Path, editor: bool, stock: &StockArgs) -> Result<LabelSpec, LabelError> {
    let json = std::fs::read_to_string(path)?;
    if editor {
        let stock = stock.resolve()?;
        let layout = EditorLayout::from_json(&json)?;
        Ok(layout.into_label_spec(stock.width_mm, stock.height_mm, stock.dpi))
    } else {
        LabelSpec::from_json(&json)
    }
}

/// Rendering blocks on font and image I/O, so it runs off the async workers.
async fn render_layout(args: LayoutArgs) -> Result<RenderedLabel, LabelError> {
    check_stock_flags(args.editor, &args.stock)?;
    let dithering = parse_dither_algorithm(&args.dither).ok_or_else(|| {
        LabelError::Configuration(format!("unknown dithering algorithm: {}", args.dither))
    })?;

    tokio::task::spawn_blocking(move || {
        let spec = read_spec(&args.layout, args.editor, &args.stock)?;
        info!(
            path = %args.layout.display(),
            elements = spec.elements.len(),
            "rendering"
        );
        LabelRenderer::new().dithering(dithering).render(&spec)
    })
    .await
    .map_err(|e| LabelError::ElementRender(format!("render task failed: {}", e)))?
}
