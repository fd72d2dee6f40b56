//! In-test collaborators: a canvas with fixed glyph advances and a packaged-set fixture.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::assets::decode::OutputFormat;
use crate::canvas::{CpuCanvas, ImageCanvas, TextMetrics, TextPlacement, TextStyle};
use crate::config::AppConfig;
use crate::filestore::LocalFileStore;
use crate::foundation::core::Color;
use crate::foundation::error::SkinResult;
use crate::names::NamesProvider;
use crate::paths::PathLayout;
use crate::postprocess::StrategyContext;
use crate::render::image::Image;

/// Every glyph is `advance * size` wide and `size` tall; text renders as a filled box.
pub(crate) struct FixedAdvanceCanvas {
    pub advance: f64,
    pub measured: AtomicUsize,
    pub drawn: Mutex<Vec<(String, TextStyle, TextPlacement)>>,
    io: CpuCanvas,
}

impl FixedAdvanceCanvas {
    pub fn new(advance: f64) -> Self {
        Self {
            advance,
            measured: AtomicUsize::new(0),
            drawn: Mutex::new(Vec::new()),
            io: CpuCanvas::new(),
        }
    }

    pub fn drawn_texts(&self) -> Vec<String> {
        self.drawn
            .lock()
            .unwrap()
            .iter()
            .map(|(t, _, _)| t.clone())
            .collect()
    }
}

impl ImageCanvas for FixedAdvanceCanvas {
    fn read(&self, path: &Path) -> SkinResult<Image> {
        self.io.read(path)
    }

    fn save_as(&self, img: &Image, path: &Path, format: OutputFormat) -> SkinResult<()> {
        self.io.save_as(img, path, format)
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> SkinResult<TextMetrics> {
        self.measured.fetch_add(1, Ordering::SeqCst);
        let size = f64::from(style.size);
        Ok(TextMetrics {
            width: text.chars().count() as f64 * self.advance * size,
            height: size,
        })
    }

    fn draw_text(
        &self,
        target: &mut Image,
        text: &str,
        style: &TextStyle,
        at: TextPlacement,
    ) -> SkinResult<()> {
        self.drawn
            .lock()
            .unwrap()
            .push((text.to_string(), style.clone(), at));
        let m = self.measure_text(text, style)?;
        let (x, y) = at.origin(m);
        target.fill_rect(x.round(), y.round(), m.width.round(), m.height.round(), style.color)
    }
}

/// A rom folder, its packaged box images and a strategy context over them.
pub(crate) struct Packaged {
    pub dir: tempfile::TempDir,
    pub paths: PathLayout,
    pub config: AppConfig,
    pub canvas: Arc<FixedAdvanceCanvas>,
}

impl Packaged {
    /// `count` roms `rom01.sfc`.. in `roms/SNES`, each with a packaged box image
    /// filled with `color_of(i)`.
    pub fn snes(count: usize, color_of: impl Fn(usize) -> Color) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let roms = dir.path().join("roms");
        let mut config = AppConfig {
            rom_folder: roms.clone(),
            romset_name: "full".into(),
            ..AppConfig::default()
        };
        config.folders.insert("SNES".into(), "snes".into());
        config.package.insert("snes".into(), "Nintendo SNES".into());
        config.rom_extensions.insert("snes".into(), vec!["*.sfc".into()]);
        let paths = PathLayout::new(dir.path(), "full");
        let canvas = Arc::new(FixedAdvanceCanvas::new(0.5));

        std::fs::create_dir_all(roms.join("SNES")).unwrap();
        for i in 0..count {
            let stem = Self::stem(i);
            std::fs::write(roms.join("SNES").join(format!("{stem}.sfc")), b"").unwrap();
            let img = Image::filled(640, 480, color_of(i));
            canvas
                .save(&img, &Self::box_path_in(&paths, &stem))
                .unwrap();
        }
        Self {
            dir,
            paths,
            config,
            canvas,
        }
    }

    pub fn stem(i: usize) -> String {
        format!("rom{:02}", i + 1)
    }

    fn box_path_in(paths: &PathLayout, stem: &str) -> PathBuf {
        paths
            .catalogue("dark")
            .join("Nintendo SNES/box")
            .join(format!("{stem}.png"))
    }

    pub fn box_path(&self, i: usize) -> PathBuf {
        Self::box_path_in(&self.paths, &Self::stem(i))
    }

    pub fn source(&self) -> PathBuf {
        self.dir.path().join("roms/SNES")
    }

    pub fn resources(&self) -> PathBuf {
        self.paths.post_process_resources()
    }

    pub fn read_box(&self, i: usize) -> Image {
        self.canvas.read(&self.box_path(i)).unwrap()
    }

    pub fn context(&self) -> Arc<StrategyContext> {
        self.context_with_names(BTreeMap::new())
    }

    pub fn context_with_names(&self, names: BTreeMap<String, String>) -> Arc<StrategyContext> {
        Arc::new(StrategyContext::new(
            self.paths.clone(),
            self.config.clone(),
            Arc::new(NamesProvider::from_map(names)),
            self.canvas.clone(),
            Arc::new(LocalFileStore),
        ))
    }

    pub fn command(
        &self,
        strategy: &str,
        options: serde_json::Value,
    ) -> crate::build::command::PostProcessCommand {
        crate::build::command::PostProcessCommand {
            source: self.source(),
            package: "dark".into(),
            strategy: strategy.into(),
            options: options.as_object().cloned().unwrap_or_default(),
            files: true,
            folders: false,
        }
    }
}
