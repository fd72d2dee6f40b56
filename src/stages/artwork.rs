//! Scraper-backed artwork generation, placeholder covers and cache priming.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::anyhow;

use crate::build::command::{
    GenerateEmptyImageCommand, GenerateFolderArtworkCommand, GenerateRomArtworkCommand,
    PrimeCacheCommand,
};
use crate::config::{PORTS_PLATFORM, RomExtensions};
use crate::foundation::error::{SkinError, SkinResult};
use crate::paths::{CommandNamespace, relative_to};
use crate::platform::PlatformResolver;
use crate::postprocess::ArtworkGenerator;
use crate::process::SubprocessRequest;
use crate::scraper::ScraperDirector;
use crate::stages::StageEnv;

/// Whole-folder scrapes can take hours on a cold cache.
pub const SCRAPE_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 6);
pub const GENERATE_TIMEOUT: Duration = Duration::from_secs(60 * 10);

const NO_DESCRIPTION: &str = "No Description";
const RENAMED_MEDIA: &[&str] = &["covers", "screenshots"];

/// Description of `rom_file_name` in a gamelist.xml document.
///
/// Entries without a `<desc>` read as "No Description"; roms absent from the list give `None`.
pub fn description_for(gamelist: &str, rom_file_name: &str) -> Option<String> {
    let mut rest = gamelist;
    while let Some((body, after)) = next_game(rest) {
        rest = after;
        let Some(path) = element(body, "path") else {
            continue;
        };
        let path = unescape(path.trim());
        if Path::new(&path).file_name().is_none_or(|n| n != rom_file_name) {
            continue;
        }
        let text = element(body, "desc")
            .map(|d| unescape(d.trim()))
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());
        return Some(text);
    }
    None
}

/// Body of the next `<game ...>` element and the text after it.
fn next_game(xml: &str) -> Option<(&str, &str)> {
    let mut from = 0;
    loop {
        let at = from + xml[from..].find("<game")?;
        let tail = &xml[at + "<game".len()..];
        from = at + "<game".len();
        if !tail.starts_with(|c: char| c == '>' || c.is_whitespace()) {
            continue;
        }
        let open = tail.find('>')? + 1;
        // `<game ... />` has no body
        if tail[..open - 1].trim_end().ends_with('/') {
            from += open;
            continue;
        }
        let close = tail[open..].find("</game>")?;
        return Some((&tail[open..open + close], &tail[open + close + "</game>".len()..]));
    }
}

/// Text of the first `<tag>...</tag>` in `xml`.
fn element<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let start = xml.find(&open)? + open.len();
    let len = xml[start..].find(&format!("</{tag}>"))?;
    Some(&xml[start..start + len])
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Runs the scraper's artwork renderer; also serves `artwork_generation` post-processing.
pub struct ArtworkStage {
    env: StageEnv,
    director: ScraperDirector,
    platforms: PlatformResolver,
    extensions: RomExtensions,
}

impl ArtworkStage {
    pub fn new(env: StageEnv) -> Self {
        let director = ScraperDirector::new(env.config.clone(), env.paths.clone());
        let platforms = PlatformResolver::new(&env.config, env.paths.generated_artwork());
        let extensions = RomExtensions::new(&env.config);
        Self {
            env,
            director,
            platforms,
            extensions,
        }
    }

    fn artwork_xml(&self, package: &str, file: &str) -> SkinResult<PathBuf> {
        let path = self.env.paths.template_dir(package).join(file);
        if !self.env.files.exists(&path) {
            return Err(SkinError::config(format!(
                "Artwork \"{}\" does not exist",
                path.display()
            )));
        }
        Ok(path)
    }

    fn scrape(&self, argv: Vec<String>, timeout: Duration) -> SkinResult<()> {
        let request = SubprocessRequest::new(argv).with_timeout(timeout);
        let failed = || {
            SkinError::from(anyhow!(
                "The scraping process failed. Check `{}`",
                self.env.log_path("skyscraper").display()
            ))
        };
        match self.env.run(&request) {
            Ok(out) if out.success => Ok(()),
            Ok(_) => Err(failed()),
            Err(e) => {
                tracing::error!(error = %e, "scraper did not run");
                Err(failed())
            }
        }
    }

    /// Platform of a rom; portmaster scripts switch to their configured alternate.
    pub fn rom_platform(&self, cmd: &GenerateRomArtworkCommand) -> SkinResult<String> {
        let rom = &cmd.rom_absolute_path;
        let platform = match &cmd.platform {
            Some(p) => p.clone(),
            None => self.platforms.platform(rom)?,
        };
        let is_script = rom.extension().is_some_and(|e| e == "sh");
        if is_script && platform == PORTS_PLATFORM {
            if let Some(alternate) = self.env.config.portmaster_alternate_platform(&stem(rom)) {
                return Ok(alternate.to_string());
            }
        }
        Ok(platform)
    }

    /// The rom a folder's artwork is rendered from: the configured one, else the first
    /// rom of the folder.
    pub fn folder_rom(&self, folder: &Path) -> SkinResult<Option<PathBuf>> {
        let platform = self.platforms.platform(folder)?;
        let files = self.env.files.list_files(folder, 0)?;
        let key = relative_to(folder, &self.env.config.rom_folder);
        if let Some(single) = self.env.config.single_rom_for_folder(&key) {
            if let Some(found) = files
                .iter()
                .find(|f| f.file_name().is_some_and(|n| n == single))
            {
                return Ok(Some(found.clone()));
            }
            tracing::debug!(folder = %key, rom = single, "configured folder rom not found");
        }
        Ok(files.into_iter().find(|f| {
            f.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| self.extensions.matches(&platform, n))
        }))
    }

    fn write_description(&self, rom: &Path, namespace: CommandNamespace) -> SkinResult<()> {
        let in_folder = rom.parent().unwrap_or(rom);
        let gamelist = self
            .env
            .paths
            .gamelist(&relative_to(in_folder, &self.env.config.rom_folder))
            .join("gamelist.xml");
        if !self.env.files.exists(&gamelist) {
            return Ok(());
        }
        let raw = self.env.files.read_to_string(&gamelist)?;
        let name = rom
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some(text) = description_for(&raw, &name) else {
            return Ok(());
        };
        let out = self
            .env
            .paths
            .generated_artwork_for_namespace(rom, &self.env.config.rom_folder, namespace)
            .join("txt")
            .join(format!("{}.txt", stem(rom)));
        self.env.files.dump(&out, text.as_bytes())
    }

    /// Copy `resources/null.png` in as the cover of a rom or folder.
    pub fn generate_empty_image(&self, cmd: &GenerateEmptyImageCommand) -> SkinResult<()> {
        let namespace = if cmd.is_dir() {
            CommandNamespace::Folder
        } else {
            CommandNamespace::Artwork
        };
        let out = self
            .env
            .paths
            .generated_artwork_for_namespace(
                &cmd.absolute_path,
                &self.env.config.rom_folder,
                namespace,
            )
            .join("covers")
            .join(format!("{}.png", stem(&cmd.absolute_path)));
        self.env
            .files
            .copy(&self.env.paths.resources_dir().join("null.png"), &out)
    }

    #[tracing::instrument(skip_all, fields(folder = %cmd.folder_absolute_path.display()))]
    pub fn prime_cache(&self, cmd: &PrimeCacheCommand) -> SkinResult<()> {
        let argv = self
            .director
            .scrape(&cmd.folder_absolute_path, cmd.only_missing)?;
        self.scrape(argv, SCRAPE_TIMEOUT)
    }
}

impl ArtworkGenerator for ArtworkStage {
    #[tracing::instrument(skip_all, fields(rom = %cmd.rom_absolute_path.display()))]
    fn generate_rom_artwork(&self, cmd: &GenerateRomArtworkCommand) -> SkinResult<()> {
        let xml = self.artwork_xml(&cmd.artwork_package, &cmd.artwork)?;
        let platform = self.rom_platform(cmd)?;
        let namespace = if cmd.force_portmaster {
            CommandNamespace::Portmaster
        } else {
            CommandNamespace::Artwork
        };
        let argv =
            self.director
                .generate_artwork(&xml, &platform, &cmd.rom_absolute_path, namespace);
        self.scrape(argv, GENERATE_TIMEOUT)?;
        if cmd.generate_descriptions {
            self.write_description(&cmd.rom_absolute_path, namespace)?;
        }
        Ok(())
    }

    /// Renders the folder's rom, then renames its media after the folder.
    #[tracing::instrument(skip_all, fields(folder = %cmd.folder_absolute_path.display()))]
    fn generate_folder_artwork(&self, cmd: &GenerateFolderArtworkCommand) -> SkinResult<()> {
        let xml = self.artwork_xml(&cmd.artwork_package, &cmd.artwork)?;
        let folder = &cmd.folder_absolute_path;
        let platform = self.platforms.platform(folder)?;
        let Some(rom) = self.folder_rom(folder)? else {
            tracing::debug!(folder = %folder.display(), "no rom to render folder artwork from");
            return Ok(());
        };
        let argv = self
            .director
            .generate_artwork(&xml, &platform, &rom, CommandNamespace::Folder);
        self.scrape(argv, GENERATE_TIMEOUT)?;

        let out = self.env.paths.generated_artwork_for_namespace(
            &rom,
            &self.env.config.rom_folder,
            CommandNamespace::Folder,
        );
        let folder_name = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        for media in RENAMED_MEDIA {
            let rendered = out.join(media).join(format!("{}.png", stem(&rom)));
            if !self.env.files.exists(&rendered) {
                continue;
            }
            let renamed = out.join(media).join(format!("{folder_name}.png"));
            if rendered != renamed {
                self.env.files.copy(&rendered, &renamed)?;
                self.env.files.remove(&rendered)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stages/artwork.rs"]
mod tests;
