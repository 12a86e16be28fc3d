//! Glide - a document window with smooth scrolling and cursor centering

mod document_view;

use anyhow::Context as _;
use document_view::DocumentView;
use glide::GlideSettings;
use gpui::{point, px, size, App, AppContext, Application, Bounds, WindowBounds, WindowOptions};
use std::path::Path;

const DEFAULT_WIDTH: f32 = 900.0;
const DEFAULT_HEIGHT: f32 = 700.0;
const SAMPLE_SECTIONS: usize = 200;

fn main() {
    env_logger::init();
    let text = document_text(std::env::args().nth(1).as_deref());

    Application::new().run(move |cx| {
        let settings = GlideSettings::load_or_create(&GlideSettings::config_path());
        if let Err(err) = open_document_window(cx, settings, text) {
            log::error!("{err:#}");
            cx.quit();
        }
    });
}

/// Contents of the file named on the command line, or generated markdown.
fn document_text(path: Option<&str>) -> String {
    let Some(path) = path else {
        return DocumentView::sample_text(SAMPLE_SECTIONS);
    };
    match read_document(Path::new(path)) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("{err:#}; showing sample text instead");
            DocumentView::sample_text(SAMPLE_SECTIONS)
        }
    }
}

fn read_document(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn open_document_window(cx: &mut App, settings: GlideSettings, text: String) -> anyhow::Result<()> {
    let options = WindowOptions {
        window_bounds: Some(WindowBounds::Windowed(Bounds {
            origin: point(px(0.), px(0.)),
            size: size(px(DEFAULT_WIDTH), px(DEFAULT_HEIGHT)),
        })),
        ..Default::default()
    };

    cx.open_window(options, move |window, cx| {
        cx.new(move |cx| DocumentView::new(window, cx, settings, text))
    })
    .context("failed to open document window")?;
    cx.activate(true);
    Ok(())
}
