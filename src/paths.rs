use std::path::{Path, PathBuf};

use crate::foundation::error::{SkinError, SkinResult};

/// Output namespace of a generation command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandNamespace {
    Artwork,
    Folder,
    Portmaster,
}

/// Every directory and file location, derived from one base directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathLayout {
    base: PathBuf,
    romset_name: String,
}

impl PathLayout {
    pub fn new(base: impl Into<PathBuf>, romset_name: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            romset_name: romset_name.into(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn romset_name(&self) -> &str {
        &self.romset_name
    }

    pub fn join(&self, parts: &[&str]) -> PathBuf {
        let mut p = self.base.clone();
        for part in parts {
            p.push(part);
        }
        p
    }

    pub fn config_file(&self) -> PathBuf {
        self.join(&["user_config", "config.yml"])
    }

    pub fn user_config_dir(&self) -> PathBuf {
        self.join(&["user_config"])
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.join(&["resources"])
    }

    pub fn template_dir(&self, package: &str) -> PathBuf {
        self.join(&["template", package])
    }

    pub fn temp(&self) -> PathBuf {
        self.join(&["temp"])
    }

    pub fn output(&self) -> PathBuf {
        self.join(&["temp", "output"])
    }

    pub fn artwork_tmp(&self) -> PathBuf {
        self.join(&["temp", "artwork_tmp"])
    }

    pub fn output_post_process(&self) -> PathBuf {
        self.join(&["temp", "output", "post-process"])
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.join(&["temp", "output", "notes"])
    }

    pub fn generated_artwork(&self) -> PathBuf {
        self.join(&["temp", "output", "generated_artwork"])
    }

    pub fn generated_artwork_for(&self, folder: &str) -> PathBuf {
        self.generated_artwork().join(folder)
    }

    /// Where the scraper writes artwork for a rom, per namespace.
    pub fn generated_artwork_for_namespace(
        &self,
        rom_absolute_path: &Path,
        rom_folder: &Path,
        namespace: CommandNamespace,
    ) -> PathBuf {
        match namespace {
            CommandNamespace::Artwork => {
                let parent = rom_absolute_path.parent().unwrap_or(rom_absolute_path);
                self.generated_artwork_for(&relative_to(parent, rom_folder))
            }
            CommandNamespace::Folder => self.generated_artwork_for("Folder"),
            CommandNamespace::Portmaster => self.generated_artwork_for("Ports"),
        }
    }

    pub fn gamelist(&self, folder: &str) -> PathBuf {
        self.join(&["temp", "output", "gamelist"]).join(folder)
    }

    pub fn package_root(&self, package: &str) -> PathBuf {
        self.join(&["package", &format!("{package}-{}", self.romset_name)])
    }

    /// `<package root>/MUOS/info/catalogue`.
    pub fn catalogue(&self, package: &str) -> PathBuf {
        self.package_root(package).join("MUOS/info/catalogue")
    }

    pub fn zip_path(&self, package: &str) -> PathBuf {
        self.join(&["zipped", &format!("{package}-{}.zip", self.romset_name)])
    }

    pub fn post_process_resources(&self) -> PathBuf {
        self.join(&["temp", "post-process", "resources"])
    }

    pub fn staging(&self, strategy: &str, token: &str) -> PathBuf {
        self.join(&["temp", "post-process", strategy, token])
    }

    /// Fake rom folder holding one `.sh` launcher per installed port.
    pub fn portmaster_roms(&self) -> PathBuf {
        self.join(&["temp", "portmaster", "roms"])
    }

    pub fn skipped_report(&self) -> PathBuf {
        self.join(&["skipped", &self.romset_name, "missing.json"])
    }

    /// `var/log/<namespace>-<YYYY-MM-DD>.log`.
    pub fn log_path(&self, namespace: &str, date: &str) -> PathBuf {
        self.join(&["var", "log", &format!("{namespace}-{date}.log")])
    }

    pub fn font(&self, family: &str, variant: Option<&str>) -> SkinResult<PathBuf> {
        let (dir, file) = font_file(family, variant)?;
        Ok(self.join(&["resources", "font", dir, &file]))
    }
}

/// `path` with the `base` prefix removed, as a `/`-joined string.
pub fn relative_to(path: &Path, base: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .filter(|c| c != "/")
        .collect::<Vec<_>>()
        .join("/")
}

const PIXEL_FACES: &[&str] = &[
    "AKDPixel",
    "AtariGames",
    "Awexbmp",
    "BIOSfontII",
    "BasicChineseLine",
    "Beanstalk",
    "Bitfantasy",
    "CelticTime",
    "ClassicShit",
    "DiaryOfAn8BitMage",
    "DisrespectfulTeenager",
    "GTA2PSX",
    "Habbo",
    "KarenFat",
    "Khonjin",
    "Kubasta",
    "LCDBlock",
    "LessRoundBox",
    "LowIndustrial",
    "MMXSNES",
    "MyHandwriting",
    "NameHereCondensed",
    "PixNull",
    "PixelNewspaperIII",
    "Rockboxcond12",
    "SandyForest",
    "SquareSounds",
    "SuperTechnology",
    "TWEENIESDODDLEBINES",
    "Tallpix",
    "ThickPixels",
    "TinyPixie2",
    "TinyUnicode",
    "TripleN",
    "Unknown",
    "Zicons",
    "c64esque",
    "daryloo",
    "fude",
    "prevoard",
    "scribble1",
];

fn font_file(family: &str, variant: Option<&str>) -> SkinResult<(&'static str, String)> {
    let v = variant.unwrap_or("");
    let pick = match family {
        "vag_rounded" => ("vag-rounded", "VAG-Rounded-Bold.ttf".to_string()),
        "cousine" => {
            let file = match v {
                "bold" => "Cousine-Bold.ttf",
                "italic" => "Cousine-Italic.ttf",
                "bold-italic" => "Cousine-BoldItalic.ttf",
                _ => "Cousine-Regular.ttf",
            };
            ("cousine", file.to_string())
        }
        "lucida-grande" => {
            let file = if v == "bold" { "bold.ttf" } else { "regular.ttf" };
            ("lucida-grande", file.to_string())
        }
        "roboto" => {
            let file = match v {
                "black" => "Roboto-Black.ttf",
                "black-italic" => "Roboto-BlackItalic.ttf",
                "bold" => "Roboto-Bold.ttf",
                "bold-italic" => "Roboto-BoldItalic.ttf",
                "italic" => "Roboto-Italic.ttf",
                "light" => "Roboto-Light.ttf",
                "light-italic" => "Roboto-LightItalic.ttf",
                "medium" => "Roboto-Medium.ttf",
                "medium-italic" => "Roboto-MediumItalic.ttf",
                "thin" => "Roboto-Thin.ttf",
                "thin-italic" => "Roboto-ThinItalic.ttf",
                _ => "Roboto-Regular.ttf",
            };
            ("roboto", file.to_string())
        }
        "bariol" => {
            let file = match v {
                "bold" => "bariol_bold-webfont.ttf",
                "bold-italic" => "bariol_bold_italic-webfont.ttf",
                "light" => "bariol_light-webfont.ttf",
                "light-italic" => "bariol_light_italic-webfont.ttf",
                "regular-italic" => "bariol_regular_italic-webfont.ttf",
                "thin" => "bariol_thin-webfont.ttf",
                _ => "bariol_thin_italic-webfont.ttf",
            };
            ("bariol", file.to_string())
        }
        "pixel" => {
            let face = PIXEL_FACES
                .iter()
                .find(|f| **f == v)
                .copied()
                .unwrap_or("scribble1");
            ("pixel", format!("{face}.ttf"))
        }
        _ => {
            return Err(SkinError::config(format!(
                "Cannot get font for unknown font family/variant: {family}/{v}"
            )));
        }
    };
    Ok(pick)
}

#[cfg(test)]
#[path = "../tests/unit/paths.rs"]
mod tests;
