//! Argument vectors for the external Skyscraper tool.

use std::path::Path;

use crate::config::AppConfig;
use crate::foundation::error::SkinResult;
use crate::paths::{CommandNamespace, PathLayout, relative_to};
use crate::platform::PlatformResolver;

pub const SCRAPER_PROGRAM: &str = "Skyscraper";

/// Fixed-vocabulary argv builder. Flags are emitted only when set, in a stable order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScraperCommandBuilder {
    gamelist_path: Option<String>,
    artwork_path: Option<String>,
    input_path: Option<String>,
    output_path: Option<String>,
    flags: Vec<String>,
    exts: Vec<String>,
    platform: Option<String>,
    credentials: Option<String>,
    scraper: Option<String>,
    verbosity: Option<u32>,
    rom_name: Option<String>,
    query: Option<String>,
    threads: Option<u32>,
}

impl ScraperCommandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gamelist_path(mut self, v: impl Into<String>) -> Self {
        self.gamelist_path = Some(v.into());
        self
    }

    pub fn artwork_path(mut self, v: impl Into<String>) -> Self {
        self.artwork_path = Some(v.into());
        self
    }

    pub fn input_path(mut self, v: impl Into<String>) -> Self {
        self.input_path = Some(v.into());
        self
    }

    pub fn output_path(mut self, v: impl Into<String>) -> Self {
        self.output_path = Some(v.into());
        self
    }

    pub fn flag(mut self, v: impl Into<String>) -> Self {
        self.flags.push(v.into());
        self
    }

    pub fn ext(mut self, v: impl Into<String>) -> Self {
        self.exts.push(v.into());
        self
    }

    pub fn platform(mut self, v: impl Into<String>) -> Self {
        self.platform = Some(v.into());
        self
    }

    pub fn credentials(mut self, v: impl Into<String>) -> Self {
        self.credentials = Some(v.into());
        self
    }

    pub fn scraper(mut self, v: impl Into<String>) -> Self {
        self.scraper = Some(v.into());
        self
    }

    pub fn verbosity(mut self, v: u32) -> Self {
        self.verbosity = Some(v);
        self
    }

    pub fn rom_name(mut self, v: impl Into<String>) -> Self {
        self.rom_name = Some(v.into());
        self
    }

    pub fn query(mut self, v: impl Into<String>) -> Self {
        self.query = Some(v.into());
        self
    }

    pub fn threads(mut self, v: u32) -> Self {
        self.threads = Some(v);
        self
    }

    pub fn build(&self) -> Vec<String> {
        let mut parts: Vec<(&str, String)> = Vec::new();
        let mut push = |flag: &'static str, v: Option<String>| {
            if let Some(v) = v {
                parts.push((flag, v));
            }
        };
        push("-g", self.gamelist_path.clone());
        push("-a", self.artwork_path.clone());
        push("-i", self.input_path.clone());
        push("-o", self.output_path.clone());
        push("-p", self.platform.clone());
        push("-u", self.credentials.clone());
        push("-s", self.scraper.clone());
        push("-t", self.threads.map(|t| t.to_string()));
        push(
            "--flags",
            (!self.flags.is_empty()).then(|| self.flags.join(",")),
        );
        push("--verbosity", self.verbosity.map(|v| v.to_string()));
        push("--query", self.query.clone());
        push("--addext", (!self.exts.is_empty()).then(|| self.exts.join(" ")));

        let mut argv = vec![SCRAPER_PROGRAM.to_string()];
        if let Some(rom) = self.rom_name.as_ref().filter(|r| !r.is_empty()) {
            argv.push(rom.clone());
        }
        for (flag, value) in parts {
            argv.push(flag.to_string());
            argv.push(value);
        }
        argv
    }
}

/// The four canonical scraper invocations.
#[derive(Clone, Debug)]
pub struct ScraperDirector {
    config: AppConfig,
    paths: PathLayout,
    platforms: PlatformResolver,
}

fn lossy(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

fn file_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl ScraperDirector {
    pub fn new(config: AppConfig, paths: PathLayout) -> Self {
        let platforms = PlatformResolver::new(&config, paths.generated_artwork());
        Self {
            config,
            paths,
            platforms,
        }
    }

    fn screenscraper_base(&self, platform: String) -> ScraperCommandBuilder {
        ScraperCommandBuilder::new()
            .credentials(self.config.screenscraper_credentials())
            .flag("unattend")
            .flag("unpack")
            .flag("nohints")
            .platform(platform)
            .scraper("screenscraper")
    }

    /// Scrape a whole rom folder into the cache.
    pub fn scrape(&self, folder: &Path, only_missing: bool) -> SkinResult<Vec<String>> {
        let platform = self.platforms.platform(folder)?;
        let mut b = self
            .screenscraper_base(platform)
            .input_path(lossy(folder))
            .threads(self.config.scrape_threads);
        if only_missing {
            b = b.flag("onlymissing");
        }
        Ok(b.ext("*.sh").build())
    }

    /// Scrape one rom, optionally with a search query override.
    pub fn scrape_single_rom(
        &self,
        rom: &Path,
        only_missing: bool,
        query: Option<&str>,
        platform: Option<&str>,
    ) -> SkinResult<Vec<String>> {
        let platform = match platform {
            Some(p) => p.to_string(),
            None => self.platforms.platform(rom)?,
        };
        let parent = rom.parent().unwrap_or(rom);
        let mut b = self
            .screenscraper_base(platform)
            .input_path(lossy(parent))
            .rom_name(file_name(rom));
        if only_missing {
            b = b.flag("onlymissing");
        }
        b = b.ext("*.sh");
        if let Some(q) = query {
            b = b.query(q);
        }
        Ok(b.build())
    }

    /// Import locally supplied media for a platform.
    pub fn import_local_data(&self, platform: &str, input: &Path) -> Vec<String> {
        ScraperCommandBuilder::new()
            .scraper("import")
            .platform(platform)
            .input_path(lossy(input))
            .ext("*.sh")
            .build()
    }

    /// Render the artwork xml for one rom into the namespace's output folder.
    pub fn generate_artwork(
        &self,
        artwork_xml: &Path,
        platform: &str,
        rom: &Path,
        namespace: CommandNamespace,
    ) -> Vec<String> {
        let in_folder = rom.parent().unwrap_or(rom);
        let out_folder =
            self.paths
                .generated_artwork_for_namespace(rom, &self.config.rom_folder, namespace);
        let gamelist = self
            .paths
            .gamelist(&relative_to(in_folder, &self.config.rom_folder));
        ScraperCommandBuilder::new()
            .artwork_path(lossy(artwork_xml))
            .input_path(lossy(in_folder))
            .output_path(lossy(&out_folder))
            .gamelist_path(lossy(&gamelist))
            .platform(platform)
            .flag("unattend")
            .flag("unpack")
            .flag("nohints")
            .verbosity(3)
            .rom_name(file_name(rom))
            .ext("*.sh")
            .build()
    }
}

#[cfg(test)]
#[path = "../tests/unit/scraper.rs"]
mod tests;
