//! Template matching module

pub mod loader;
pub mod matcher;

pub use loader::{TemplateError, TemplateLoader};
pub use matcher::RegionMatcher;

use crate::Result;
use matchdex_core::{CharacterId, Roster, Side};
use opencv::core::{Mat, Size};
use opencv::prelude::*;

/// Template data structure
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub image: Mat,
}

impl Template {
    pub fn new(name: String, image: Mat) -> Self {
        Self { name, image }
    }

    pub fn size(&self) -> Result<Size> {
        Ok(self.image.size()?)
    }
}

/// Every template used for one run.
///
/// `player1[i]`, `player2[i]` and `roster` entry `i` always describe the
/// same character.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    roster: Roster,
    player1: Vec<Template>,
    player2: Vec<Template>,
    clock: Option<Template>,
}

impl TemplateLibrary {
    /// Assemble a library. Both sides must hold one template per roster
    /// entry.
    pub fn new(
        roster: Roster,
        player1: Vec<Template>,
        player2: Vec<Template>,
        clock: Option<Template>,
    ) -> std::result::Result<Self, TemplateError> {
        if player1.len() != roster.len() || player2.len() != roster.len() {
            return Err(TemplateError::SideCountMismatch {
                characters: roster.len(),
                player1: player1.len(),
                player2: player2.len(),
            });
        }
        Ok(Self {
            roster,
            player1,
            player2,
            clock,
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn templates(&self, side: Side) -> &[Template] {
        match side {
            Side::Player1 => &self.player1,
            Side::Player2 => &self.player2,
        }
    }

    pub fn get(&self, side: Side, id: CharacterId) -> Option<&Template> {
        self.templates(side).get(id.index())
    }

    pub fn clock(&self) -> Option<&Template> {
        self.clock.as_ref()
    }
}
