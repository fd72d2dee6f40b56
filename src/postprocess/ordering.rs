use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::names::NamesProvider;
use crate::postprocess::working_set::WorkingSet;

const FOLDER_MARKER: &str = "catalogue/Folder/box";

fn is_folder(path: &Path) -> bool {
    path.to_string_lossy().contains(FOLDER_MARKER)
}

/// Variant order is the display order: folders, named roms, then the rest.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Folder(PathBuf),
    Rom(usize),
    Unknown,
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Working-set paths in display order.
///
/// Keys are first ordered naturally (case-insensitive, digit runs by value). When the
/// names table yields a preferred order, folder images lead (by path) and roms follow
/// by their position in that order. Roms without a display name come after every named
/// rom, in natural order.
pub fn sort_artwork(set: &WorkingSet, names: &NamesProvider) -> Vec<PathBuf> {
    let mut items: Vec<(&str, &Path)> = set
        .iter()
        .map(|i| (i.file_name.as_str(), i.path.as_path()))
        .collect();
    items.sort_by(|a, b| natural_cmp(a.0, b.0));

    let stems: Vec<String> = items
        .iter()
        .map(|(name, _)| stem(Path::new(name)))
        .collect();
    let preferred = names.ordered_list(stems.iter().map(String::as_str));
    let paths: Vec<PathBuf> = items.into_iter().map(|(_, p)| p.to_path_buf()).collect();
    if preferred.is_empty() {
        return paths;
    }

    let rank: HashMap<&str, usize> = preferred
        .iter()
        .enumerate()
        .map(|(i, k)| (k.as_str(), i))
        .collect();

    let mut keyed: Vec<(SortKey, PathBuf)> = paths
        .into_iter()
        .map(|p| {
            let key = if is_folder(&p) {
                SortKey::Folder(p.clone())
            } else {
                let s = stem(&p);
                match rank.get(s.as_str()) {
                    Some(&i) => SortKey::Rom(i),
                    None => {
                        tracing::debug!(
                            "Unknown rom in sort_list, rom artwork will appear out of order. To fix this add an entry to names_extra.json for `{s}`"
                        );
                        SortKey::Unknown
                    }
                }
            };
            (key, p)
        })
        .collect();
    // stable: unknown roms keep their natural order
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, p)| p).collect()
}

/// Case-insensitive natural ordering: runs of digits compare by numeric value.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut x = a.chars().peekable();
    let mut y = b.chars().peekable();
    loop {
        match (x.peek().copied(), y.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(cx), Some(cy)) if cx.is_ascii_digit() && cy.is_ascii_digit() => {
                let nx = take_digits(&mut x);
                let ny = take_digits(&mut y);
                let tx = nx.trim_start_matches('0');
                let ty = ny.trim_start_matches('0');
                let ord = tx
                    .len()
                    .cmp(&ty.len())
                    .then_with(|| tx.cmp(ty))
                    .then_with(|| ny.len().cmp(&nx.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(cx), Some(cy)) => {
                let ord = cx.to_lowercase().cmp(cy.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                x.next();
                y.next();
            }
        }
    }
}

fn take_digits(it: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut s = String::new();
    while let Some(c) = it.peek().copied().filter(char::is_ascii_digit) {
        s.push(c);
        it.next();
    }
    s
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/ordering.rs"]
mod tests;
