//! Template loading utilities
//!
//! A template directory holds `<name>-1p.<ext>` and `<name>-2p.<ext>` for
//! every character plus an optional `clock.<ext>`.

use super::{Template, TemplateLibrary};
use crate::utils::image::ImageUtils;
use crate::Result;
use anyhow::Context;
use matchdex_core::roster::display_name;
use matchdex_core::{Roster, Side};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const CLOCK_STEM: &str = "clock";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template directory {0:?} does not exist")]
    MissingDirectory(PathBuf),

    #[error("no character templates found in {0:?}")]
    NoCharacters(PathBuf),

    #[error("character `{name}` has no {side} template")]
    MissingSide { name: String, side: Side },

    #[error("clock detection requested but {0:?} has no clock template")]
    MissingClock(PathBuf),

    #[error("roster has {characters} characters but {player1} P1 and {player2} P2 templates")]
    SideCountMismatch {
        characters: usize,
        player1: usize,
        player2: usize,
    },
}

/// Files found in a template directory, keyed by character stem.
#[derive(Debug, Default)]
struct TemplateFiles {
    player1: BTreeMap<String, PathBuf>,
    player2: BTreeMap<String, PathBuf>,
    clock: Option<PathBuf>,
}

/// Template loader for a single directory
pub struct TemplateLoader {
    template_dir: PathBuf,
    scale: f64,
    supported_extensions: Vec<String>,
}

impl TemplateLoader {
    /// Create new template loader
    pub fn new<P: AsRef<Path>>(dir: P, scale: f64) -> Self {
        Self {
            template_dir: dir.as_ref().to_path_buf(),
            scale,
            supported_extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "bmp".to_string(),
            ],
        }
    }

    /// Load and scale every template. The clock template is only required
    /// (and only loaded) when `include_clock` is set.
    pub fn load(&self, include_clock: bool) -> Result<TemplateLibrary> {
        let files = self.scan()?;
        let dir = &self.template_dir;

        if let Some((name, _)) = files.player2.iter().find(|(n, _)| !files.player1.contains_key(*n)) {
            return Err(TemplateError::MissingSide {
                name: display_name(name),
                side: Side::Player1,
            }
            .into());
        }

        let mut roster = Roster::new();
        let mut player1 = Vec::with_capacity(files.player1.len());
        let mut player2 = Vec::with_capacity(files.player1.len());

        for (stem, p1_path) in &files.player1 {
            let name = display_name(stem);
            let p2_path = files.player2.get(stem).ok_or_else(|| TemplateError::MissingSide {
                name: name.clone(),
                side: Side::Player2,
            })?;

            player1.push(self.load_template(&name, p1_path)?);
            player2.push(self.load_template(&name, p2_path)?);
            roster.push(name);
        }

        if roster.is_empty() {
            return Err(TemplateError::NoCharacters(dir.clone()).into());
        }

        let clock = if include_clock {
            let path = files
                .clock
                .as_ref()
                .ok_or_else(|| TemplateError::MissingClock(dir.clone()))?;
            Some(self.load_template("Clock", path)?)
        } else {
            None
        };

        info!(characters = roster.len(), clock = clock.is_some(), "templates loaded from {dir:?}");
        Ok(TemplateLibrary::new(roster, player1, player2, clock)?)
    }

    /// Sort directory entries into per-side maps.
    fn scan(&self) -> Result<TemplateFiles> {
        let dir = &self.template_dir;
        if !dir.is_dir() {
            return Err(TemplateError::MissingDirectory(dir.clone()).into());
        }

        let entries =
            fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))?;

        let mut files = TemplateFiles::default();
        for entry in entries {
            let path = entry?.path();

            let Some(extension) = path.extension() else {
                continue;
            };
            let ext = extension.to_string_lossy().to_lowercase();
            if !self.supported_extensions.contains(&ext) {
                continue;
            }
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };

            if let Some(name) = stem.strip_suffix(Side::Player1.suffix()) {
                files.player1.insert(name.to_string(), path);
            } else if let Some(name) = stem.strip_suffix(Side::Player2.suffix()) {
                files.player2.insert(name.to_string(), path);
            } else if stem.eq_ignore_ascii_case(CLOCK_STEM) {
                files.clock = Some(path);
            } else {
                debug!("ignoring {:?}", path);
            }
        }

        Ok(files)
    }

    fn load_template(&self, name: &str, path: &Path) -> Result<Template> {
        let image = ImageUtils::load_grayscale(path)
            .with_context(|| format!("Failed to load template: {:?}", path))?;
        let image = ImageUtils::scale(&image, self.scale)?;

        debug!(template = name, "loaded {:?}", path);
        Ok(Template::new(name.to_string(), image))
    }
}
