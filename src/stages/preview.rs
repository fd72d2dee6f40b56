//! Contact-sheet and animated previews of a package's box art.

use std::path::{Path, PathBuf};

use anyhow::anyhow;

use crate::assets::decode::encode_gif;
use crate::build::command::{CopyBackPreviewCommand, PreviewCommand};
use crate::canvas::{TextPlacement, TextStyle};
use crate::foundation::core::{Anchor, Color, HAlign, VAlign};
use crate::foundation::error::SkinResult;
use crate::process::SubprocessRequest;
use crate::render::image::Image;
use crate::stages::StageEnv;

const SCREEN: (u32, u32) = (640, 480);
const SPACER: (u32, u32) = (80, 120);
const HEADER: u32 = 200;
const CAPTION_SIZE: f32 = 28.0;
const MAX_CAPTION_CHARS: usize = 40;
/// Frame delay, in hundredths of a second as `magick -delay` counts them.
const FRAME_DELAY: u32 = 40;

/// Size of a `columns` x `rows` contact sheet, header included.
pub fn sheet_size(columns: u32, rows: u32) -> (u32, u32) {
    (
        columns * SCREEN.0 + (columns + 1) * SPACER.0,
        HEADER + rows * SCREEN.1 + (rows + 1) * SPACER.1,
    )
}

/// Top-left corner of the cell at `(column, row)`.
pub fn cell_origin(column: u32, row: u32) -> (i32, i32) {
    let x = SPACER.0 + column * (SPACER.0 + SCREEN.0);
    let y = HEADER + SPACER.1 + row * (SPACER.1 + SCREEN.1);
    (x as i32, y as i32)
}

/// File names longer than 40 characters keep their first 36 plus an ellipsis.
pub fn caption(file_name: &str) -> String {
    if file_name.chars().count() > MAX_CAPTION_CHARS {
        let mut short: String = file_name.chars().take(36).collect();
        short.push('…');
        short
    } else {
        file_name.to_string()
    }
}

fn title_size(sheet_width: u32, title: &str) -> f32 {
    let chars = title.chars().count().max(1) as f64;
    (f64::from(sheet_width) / chars * 1.25).floor().min(100.0) as f32
}

/// Packaged box images, ordered by case-insensitive file name.
fn box_images(env: &StageEnv, root: &Path) -> SkinResult<Vec<PathBuf>> {
    let mut boxes: Vec<PathBuf> = env
        .files
        .list_files(&root.join("MUOS"), usize::MAX)?
        .into_iter()
        .filter(|p| p.extension().is_some_and(|e| e == "png"))
        .filter(|p| {
            p.parent()
                .and_then(|d| d.file_name())
                .is_some_and(|d| d == "box")
        })
        .collect();
    boxes.sort_by_key(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });
    Ok(boxes)
}

fn preview_dir(env: &StageEnv, package: &str) -> PathBuf {
    env.paths.package_root(package).join("extra/preview")
}

pub fn preview(env: &StageEnv, cmd: &PreviewCommand) -> SkinResult<()> {
    if cmd.preview_type.wants_animated() {
        animated_preview(env, cmd)?;
    }
    if cmd.preview_type.wants_static() {
        static_preview(env, cmd)?;
    }
    Ok(())
}

/// A `grid_size`² sheet of box images with captions under a title header.
#[tracing::instrument(skip_all, fields(package = %cmd.target))]
pub fn static_preview(env: &StageEnv, cmd: &PreviewCommand) -> SkinResult<()> {
    let grid = env.config.preview.grid_size.max(1);
    let boxes = box_images(env, &env.paths.package_root(&cmd.target))?;
    if boxes.is_empty() {
        tracing::warn!("no box art to preview");
        return Ok(());
    }

    let (width, height) = sheet_size(grid, grid);
    let mut sheet = Image::filled(width, height, Color::WHITE);
    let font = env.paths.font("cousine", Some("bold"))?;
    let title = TextStyle::new(&font, title_size(width, &cmd.preview_name), Color::BLACK);
    env.canvas.draw_text(
        &mut sheet,
        &cmd.preview_name,
        &title,
        TextPlacement::new(f64::from(width) / 2.0, 100.0, HAlign::Center, VAlign::Middle),
    )?;

    let captions = TextStyle::new(&font, CAPTION_SIZE, Color::BLACK);
    let cells = (grid * grid) as usize;
    for (i, path) in boxes.iter().take(cells).enumerate() {
        let (column, row) = (i as u32 % grid, i as u32 / grid);
        let (x, y) = cell_origin(column, row);
        sheet.place(&env.canvas.read(path)?, Anchor::TopLeft, (x, y), 100.0);

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let caption_y = f64::from(y) + f64::from(SCREEN.1) + f64::from(SPACER.1 / 4);
        env.canvas.draw_text(
            &mut sheet,
            &caption(&name),
            &captions,
            TextPlacement::new(f64::from(x + 2), caption_y, HAlign::Left, VAlign::Middle),
        )?;
    }

    let out = preview_dir(env, &cmd.target).join(format!("{}.png", cmd.preview_name));
    env.canvas.save(&sheet, &out)
}

/// Looping animation of the first `animation_frames` box images.
#[tracing::instrument(skip_all, fields(package = %cmd.target))]
pub fn animated_preview(env: &StageEnv, cmd: &PreviewCommand) -> SkinResult<()> {
    let limit = env.config.preview.animation_frames.max(1) as usize;
    let frames: Vec<PathBuf> = box_images(env, &env.paths.package_root(&cmd.target))?
        .into_iter()
        .take(limit)
        .collect();
    if frames.is_empty() {
        tracing::warn!("no box art to animate");
        return Ok(());
    }

    let format = env.config.preview.animation_format.as_str();
    let dir = preview_dir(env, &cmd.target);
    let out = dir.join(format!("{}.{format}", cmd.preview_name));
    if format == "gif" {
        let images = frames
            .iter()
            .map(|p| env.canvas.read(p))
            .collect::<SkinResult<Vec<_>>>()?;
        return env.files.dump(&out, &encode_gif(&images, FRAME_DELAY * 10)?);
    }

    let staged = dir.join("gif-frames");
    let mut argv: Vec<String> = ["magick", "-dispose", "3", "-quality", "70", "-delay"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    argv.push(FRAME_DELAY.to_string());
    for frame in &frames {
        let copy = staged.join(frame.file_name().unwrap_or_default());
        env.files.copy(frame, &copy)?;
        argv.push(copy.to_string_lossy().into_owned());
    }
    argv.extend(["-loop".to_string(), "0".to_string()]);
    argv.push(format!("{}:{}", format.to_uppercase(), out.display()));

    let output = env.run(&SubprocessRequest::new(argv));
    env.wipe(&staged)?;
    if !output?.success {
        return Err(anyhow!(
            "Error while generating preview. Check `{}`",
            env.log_path("preview").display()
        )
        .into());
    }
    Ok(())
}

/// Keep the package's previews next to the artwork template.
pub fn copy_back_preview(env: &StageEnv, cmd: &CopyBackPreviewCommand) -> SkinResult<()> {
    let previews = preview_dir(env, &cmd.package_name);
    if !env.files.exists(&previews) {
        return Ok(());
    }
    env.files.mirror(
        &previews,
        &env.paths.template_dir(&cmd.artwork_package).join("preview"),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/stages/preview.rs"]
mod tests;
