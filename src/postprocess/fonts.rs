use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::canvas::{ImageCanvas, TextMetrics, TextStyle};
use crate::foundation::core::Color;
use crate::foundation::error::{SkinError, SkinResult};
use crate::paths::PathLayout;

/// A font family and variant as named in strategy options (`roboto` / `bold`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontChoice {
    pub family: String,
    pub variant: String,
}

impl FontChoice {
    pub fn new(family: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            variant: variant.into(),
        }
    }

    pub fn path(&self, paths: &PathLayout) -> SkinResult<PathBuf> {
        paths.font(&self.family, Some(&self.variant))
    }

    pub fn style(&self, paths: &PathLayout, size: f32, color: Color) -> SkinResult<TextStyle> {
        Ok(TextStyle::new(self.path(paths)?, size, color))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct MetricKey {
    font: FontChoice,
    size_bits: u32,
    text: String,
}

/// Text metrics keyed by font, size and text; lives for one strategy invocation.
#[derive(Debug, Default)]
pub struct FontMetricCache {
    entries: Mutex<HashMap<MetricKey, TextMetrics>>,
}

impl FontMetricCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measure(
        &self,
        canvas: &dyn ImageCanvas,
        font: &FontChoice,
        style: &TextStyle,
        text: &str,
    ) -> SkinResult<TextMetrics> {
        let key = MetricKey {
            font: font.clone(),
            size_bits: style.size.to_bits(),
            text: text.to_string(),
        };
        if let Some(m) = self.lock()?.get(&key) {
            return Ok(*m);
        }
        let metrics = canvas.measure_text(text, style)?;
        self.lock()?.insert(key, metrics);
        Ok(metrics)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> SkinResult<std::sync::MutexGuard<'_, HashMap<MetricKey, TextMetrics>>> {
        self.entries
            .lock()
            .map_err(|_| SkinError::render("font metric cache lock poisoned"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/fonts.rs"]
mod tests;
