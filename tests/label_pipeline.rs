//! # Label Pipeline Tests
//!
//! End to end: layout JSON → rendered raster → 1-bit BMP → TSPL bytes on a
//! loopback "printer".
//!
//! Fonts are served from an empty fake filesystem, so every text element
//! uses the built-in bitmap font and the output does not depend on which
//! fonts the test machine has installed.

use std::io;
use std::path::Path;
use std::time::Duration;

use image::GenericImageView;
use labelpress::editor::EditorLayout;
use labelpress::font::{FontResolver, FontSource, Platform};
use labelpress::printer::{Endpoint, LinkOptions, PrinterManager};
use labelpress::protocol::tspl::{self, AssetName};
use labelpress::raster::bmp;
use labelpress::render::{BoundingBox, LabelRenderer, LabelSpec};
use labelpress::store::{LabelStore, MemoryStore, PrinterRecord};
use pretty_assertions::assert_eq;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

struct NoFonts;

impl FontSource for NoFonts {
    fn is_file(&self, _path: &Path) -> bool {
        false
    }

    fn load(&self, _path: &Path) -> io::Result<Vec<u8>> {
        Err(io::ErrorKind::NotFound.into())
    }
}

fn renderer() -> LabelRenderer<NoFonts> {
    LabelRenderer::with_fonts(FontResolver::with_source(NoFonts).for_platform(Platform::Linux))
}

const LAYOUT: &str = r#"{
    "width_mm": 100, "height_mm": 29, "dpi": 300,
    "elements": [
        { "type": "text", "x": 10, "y": 10, "content": "OLIVE OIL 1L", "font_size_px": 40 },
        { "type": "image", "x": 700, "y": 10, "source": "/definitely/missing/logo.png", "width_px": 200 },
        { "type": "barcode", "x": 10, "y": 150, "payload": "10114847068", "symbology": "code128", "height_px": 100 }
    ]
}"#;

#[test]
fn test_layout_renders_to_printer_sized_bmp() {
    let spec = LabelSpec::from_json(LAYOUT).unwrap();
    let label = renderer().render(&spec).unwrap();

    assert_eq!((label.bitmap.width(), label.bitmap.height()), (1181, 343));
    assert_eq!(label.boxes.len(), 3);
    assert_eq!(label.boxes[1], BoundingBox::empty(700, 10));
    assert_eq!(label.boxes[2].height(), 100);

    let bytes = label.to_bmp();
    assert_eq!(&bytes[..2], b"BM");
    assert_eq!(
        bytes.len(),
        bmp::PIXEL_OFFSET as usize + bmp::row_stride(1181) * 343
    );

    // Decoded pixels match the rendered raster exactly
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (1181, 343));
    let gray = decoded.to_luma8();
    for (x, y, px) in gray.enumerate_pixels() {
        let black = px[0] < 128;
        assert_eq!(black, label.bitmap.is_black(x, y), "pixel ({}, {})", x, y);
    }
}

#[test]
fn test_barcode_region_has_bars_and_text_region_has_ink() {
    let spec = LabelSpec::from_json(LAYOUT).unwrap();
    let label = renderer().render(&spec).unwrap();

    let ink_in = |b: &BoundingBox| {
        let mut n = 0;
        for y in b.y0..b.y1 {
            for x in b.x0..b.x1 {
                if label.bitmap.is_black(x as u32, y as u32) {
                    n += 1;
                }
            }
        }
        n
    };
    assert!(ink_in(&label.boxes[0]) > 0);
    assert!(ink_in(&label.boxes[2]) > 0);

    // Nothing was drawn where the missing image would have gone
    for y in 10..110 {
        for x in 700..900 {
            assert!(!label.bitmap.is_black(x, y), "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn test_editor_payload_renders() {
    let layout = EditorLayout::from_json(
        r#"{
            "textItems": [{ "content": "Product", "x": 5, "y": 5, "fontSize": 24 }],
            "barcodeItems": [{ "data": "4006381333931", "x": 5, "y": 60, "format": "ean13", "width": 300, "height": 80 }]
        }"#,
    )
    .unwrap();
    let spec = layout.into_label_spec(50.0, 25.0, 203.0);
    let label = renderer().render(&spec).unwrap();

    assert_eq!((label.bitmap.width(), label.bitmap.height()), (400, 200));
    assert_eq!(label.boxes[1], BoundingBox::new(5, 60, 300, 80));
}

#[test]
fn test_saved_design_round_trip_through_store() {
    let store = MemoryStore::new();
    let record = PrinterRecord {
        ip: "192.168.1.200".into(),
        name: "Warehouse".into(),
        dpi: 300.0,
        width: 100.0,
        height: 29.0,
    };
    store.insert_printer(record.clone()).unwrap();

    let layout = EditorLayout::from_json(r#"{ "textItems": [{ "content": "SAVED", "x": 1, "y": 1 }] }"#).unwrap();
    store.put_label(&record.ip, "default", layout).unwrap();

    let loaded = store.label(&record.ip, "default").unwrap().unwrap();
    let printer = store.printer(&record.ip).unwrap().unwrap().printer_endpoint();
    let spec = loaded.into_label_spec(printer.width_mm, printer.height_mm, printer.dpi);
    let label = renderer().render(&spec).unwrap();
    assert_eq!((label.bitmap.width(), label.bitmap.height()), (1181, 343));
    assert!(label.bitmap.count_black() > 0);
}

#[tokio::test]
async fn test_rendered_label_reaches_printer_framed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = Endpoint::new("127.0.0.1", listener.local_addr().unwrap().port());
    let printer = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        socket.read_to_end(&mut received).await.unwrap();
        received
    });

    let spec = LabelSpec::from_json(LAYOUT).unwrap();
    let bmp_bytes = renderer().render(&spec).unwrap().to_bmp();

    let manager = PrinterManager::with_options(LinkOptions {
        settle_delay: Duration::from_millis(10),
        ..Default::default()
    });
    manager
        .print_raster(&endpoint, &bmp_bytes, 100.0, 29.0)
        .await
        .unwrap();
    manager.disconnect_all().await;

    let received = printer.await.unwrap();
    let name = AssetName::new("LABEL.BMP").unwrap();
    let mut expected = tspl::download(&name, &bmp_bytes);
    expected.extend(tspl::raster_job(&name, 100.0, 29.0).unwrap());
    assert_eq!(received.len(), expected.len());
    assert!(received == expected, "wire bytes differ from the framed job");

    let header = format!("DOWNLOAD \"LABEL.BMP\",{},", bmp_bytes.len());
    assert!(received.starts_with(header.as_bytes()));
}
