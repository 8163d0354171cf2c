//! Detection configuration

use crate::template::TemplateLibrary;
use crate::Result;
use anyhow::bail;
use matchdex_core::{Layout, Region, Side};

/// Regions and threshold used by the analyzer for one run
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    pub player1: Region,
    pub player2: Region,
    /// `None` when clock detection is off.
    pub clock: Option<Region>,
    pub threshold: f64,
}

impl DetectionConfig {
    pub fn from_layout(layout: &Layout, include_clock: bool) -> Self {
        Self {
            player1: layout.player1_region(),
            player2: layout.player2_region(),
            clock: if include_clock { layout.clock_region() } else { None },
            threshold: layout.threshold,
        }
    }

    pub fn region(&self, side: Side) -> Region {
        match side {
            Side::Player1 => self.player1,
            Side::Player2 => self.player2,
        }
    }

    /// Every template must fit inside the region it is searched in.
    pub fn check_templates(&self, library: &TemplateLibrary) -> Result<()> {
        for side in [Side::Player1, Side::Player2] {
            let region = self.region(side);
            for template in library.templates(side) {
                let size = template.size()?;
                if size.width > region.width || size.height > region.height {
                    bail!(
                        "{side} template `{}` ({}x{}) is larger than its region {region}",
                        template.name,
                        size.width,
                        size.height
                    );
                }
            }
        }

        if let Some(region) = self.clock {
            let Some(template) = library.clock() else {
                bail!("clock region configured but no clock template loaded");
            };
            let size = template.size()?;
            if size.width > region.width || size.height > region.height {
                bail!(
                    "clock template ({}x{}) is larger than its region {region}",
                    size.width,
                    size.height
                );
            }
        }

        Ok(())
    }
}
