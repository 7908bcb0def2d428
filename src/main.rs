mod app;

use app::GalleryApp;
use eframe::egui;
use std::path::PathBuf;

fn main() -> eframe::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let debug = args.iter().any(|a| a == "--debug");
    rgallery::logging::init_tracing(debug);

    let folder = args.iter().find(|a| !a.starts_with("--")).map(PathBuf::from);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_icon(load_icon()),
        ..Default::default()
    };

    eframe::run_native(
        "rGallery",
        native_options,
        Box::new(move |cc| Ok(Box::new(GalleryApp::new(cc, folder)))),
    )
}

/// A framed picture: light border, dark sky, a pale hill.
fn load_icon() -> egui::IconData {
    let size = 64;
    let mut rgba = vec![0u8; size * size * 4];

    for y in 0..size {
        for x in 0..size {
            let idx = (y * size + x) * 4;
            let border = x < 6 || y < 6 || x >= size - 6 || y >= size - 6;
            let hill = (y as f32) > 40.0 + 10.0 * ((x as f32) / 10.0).sin();
            let color = if border {
                [230, 230, 235]
            } else if hill {
                [120, 170, 140]
            } else {
                [40, 60, 110]
            };
            rgba[idx..idx + 3].copy_from_slice(&color);
            rgba[idx + 3] = 255;
        }
    }

    egui::IconData {
        rgba,
        width: size as u32,
        height: size as u32,
    }
}
