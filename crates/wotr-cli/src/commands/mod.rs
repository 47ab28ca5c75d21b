//! Command implementations.

mod card;
mod doctor;
mod grid;
mod process;
mod regions;
mod summary;
mod symbols;

pub use card::CardCommand;
pub use doctor::DoctorCommand;
pub use grid::{GridCommand, PresetsCommand};
pub use process::ProcessCommand;
pub use regions::RegionsCommand;
pub use summary::SummaryCommand;
pub use symbols::SymbolsCommand;

use clap::Args;
use wotr_atlas::{CardFormat, CardSize, CARD_FORMATS};
use wotr_common_config::AtlasConfig;

use crate::error::CliError;

/// Card size flags shared by the atlas commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CardSizeArgs {
    /// Card width in pixels
    #[arg(long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..))]
    pub card_width: Option<u32>,

    /// Card height in pixels
    #[arg(long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..))]
    pub card_height: Option<u32>,

    /// Use a built-in card format (see `wotr presets`)
    #[arg(long, value_name = "NAME", conflicts_with_all = ["card_width", "card_height"])]
    pub preset: Option<String>,
}

impl CardSizeArgs {
    /// Size given on the command line, falling back to the configured card size.
    ///
    /// A size stored in a regions file still takes precedence over this one.
    pub fn fallback(&self, config: &AtlasConfig) -> Result<CardSize, CliError> {
        if let Some(name) = &self.preset {
            return Ok(find_preset(name)?.size);
        }
        Ok(CardSize::new(
            self.card_width.unwrap_or(config.card_width),
            self.card_height.unwrap_or(config.card_height),
        ))
    }

    /// Final card size for an atlas with an optional regions file size.
    pub fn resolve(
        &self,
        from_file: Option<CardSize>,
        config: &AtlasConfig,
    ) -> Result<CardSize, CliError> {
        let fallback = self.fallback(config)?;
        Ok(wotr_atlas::resolve_card_size(
            from_file,
            Some(fallback.width),
            Some(fallback.height),
        )?)
    }
}

fn preset_key(label: &str) -> String {
    label
        .split_whitespace()
        .next()
        .unwrap_or(label)
        .to_lowercase()
}

/// Look up a card format by the first word of its label, case-insensitively.
pub fn find_preset(name: &str) -> Result<&'static CardFormat, CliError> {
    let wanted = name.trim().to_lowercase();
    CARD_FORMATS
        .iter()
        .find(|f| preset_key(f.label) == wanted || f.label.to_lowercase() == wanted)
        .ok_or_else(|| {
            CliError::not_found_with_suggestions(
                "card format",
                name,
                CARD_FORMATS.iter().map(|f| preset_key(f.label)).collect(),
            )
        })
}
