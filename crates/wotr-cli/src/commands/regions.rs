//! Regions command implementation.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueHint};
use serde::Serialize;
use tracing::info;

use wotr_atlas::{CardSize, DragRect, Region, RegionSet, RegionsFile};

use super::CardSizeArgs;
use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput, StatusOutput};

/// Inspect and edit a regions file
#[derive(Debug, Subcommand)]
pub enum RegionsCommand {
    /// List the regions and the card size
    #[command(visible_alias = "ls")]
    List(FileArg),

    /// Add a region, creating the file if needed
    Add(AddArgs),

    /// Remove a region by index or name
    #[command(visible_alias = "rm")]
    Remove(RemoveArgs),

    /// Remove every region
    Clear(FileArg),

    /// Find the region under a card pixel
    Hit(HitArgs),

    /// Set the card size stored in the file
    SetSize(SetSizeArgs),
}

#[derive(Debug, Args)]
pub struct FileArg {
    /// Regions JSON file
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[derive(Debug, Parser)]
pub struct AddArgs {
    #[command(flatten)]
    pub file: FileArg,

    /// Region name [default: region<N>]
    #[arg(long)]
    pub name: Option<String>,

    /// Rectangle in card pixels
    #[arg(long, value_names = ["X", "Y", "W", "H"], num_args = 4, conflicts_with = "drag")]
    pub rect: Option<Vec<u32>>,

    /// Drag from one corner to the other on a preview, in view units
    #[arg(
        long,
        value_names = ["X1", "Y1", "X2", "Y2"],
        num_args = 4,
        allow_negative_numbers = true
    )]
    pub drag: Option<Vec<f32>>,

    /// View units per card pixel for --drag
    #[arg(long, default_value_t = 1.0, requires = "drag")]
    pub scale: f32,

    /// Card size for a new file
    #[command(flatten)]
    pub size: CardSizeArgs,
}

#[derive(Debug, Parser)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub file: FileArg,

    /// Region index
    #[arg(long, conflicts_with = "name", required_unless_present = "name")]
    pub index: Option<usize>,

    /// Region name
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Parser)]
pub struct HitArgs {
    #[command(flatten)]
    pub file: FileArg,

    /// Card pixel column
    #[arg(long)]
    pub x: u32,

    /// Card pixel row
    #[arg(long)]
    pub y: u32,
}

#[derive(Debug, Parser)]
pub struct SetSizeArgs {
    #[command(flatten)]
    pub file: FileArg,

    #[command(flatten)]
    pub size: CardSizeArgs,
}

impl RegionsCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        match self {
            Self::List(args) => {
                let file = RegionsFile::load(&args.file)?;
                print_output(ctx, &RegionList::new(&file))
            }
            Self::Add(args) => args.execute(ctx),
            Self::Remove(args) => args.execute(ctx),
            Self::Clear(args) => {
                let file = RegionsFile::load(&args.file)?;
                let mut set = RegionSet::new(file.regions);
                let removed = set.len();
                set.clear();
                save(&args.file, file.image_size, set)?;
                print_output(ctx, &StatusOutput::success(format!("Removed {removed} regions")))
            }
            Self::Hit(args) => {
                let file = RegionsFile::load(&args.file.file)?;
                let mut set = RegionSet::new(file.regions);
                let hit = set.hit_test(args.x, args.y).map(|index| {
                    let region = &set.regions()[index];
                    RegionRow::new(index, region)
                });
                print_output(ctx, &HitReport { x: args.x, y: args.y, region: hit })
            }
            Self::SetSize(args) => {
                let mut file = load_or_new(&args.file.file)?;
                let size = args.size.fallback(&ctx.config.atlas)?;
                file.image_size = Some(size);
                file.save(&args.file.file)?;
                print_output(ctx, &StatusOutput::success(format!("Card size set to {size}")))
            }
        }
    }
}

fn load_or_new(path: &Path) -> Result<RegionsFile, CliError> {
    if path.exists() {
        Ok(RegionsFile::load(path)?)
    } else {
        Ok(RegionsFile::default())
    }
}

fn save(path: &Path, image_size: Option<CardSize>, set: RegionSet) -> Result<(), CliError> {
    RegionsFile::new(image_size, set.into_regions()).save(path)?;
    info!(path = %path.display(), "saved regions file");
    Ok(())
}

impl AddArgs {
    fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let path = &self.file.file;
        let mut file = load_or_new(path)?;
        let card = match file.image_size {
            Some(size) => size,
            None => self.size.fallback(&ctx.config.atlas)?,
        };

        let mut set = RegionSet::new(std::mem::take(&mut file.regions));
        let name = self.name.clone().unwrap_or_else(|| set.default_name());
        let region = match (&self.rect, &self.drag) {
            (Some(r), _) => Region::new(name, r[0], r[1], r[2], r[3]),
            (None, Some(d)) => {
                let drag = DragRect::new((d[0], d[1]), (d[2], d[3]));
                if !drag.is_drag() {
                    return Err(CliError::validation(
                        "drag",
                        "drag is too short to draw a region",
                    ));
                }
                if self.scale <= 0.0 {
                    return Err(CliError::validation("scale", "scale must be positive"));
                }
                let view = (
                    card.width as f32 * self.scale,
                    card.height as f32 * self.scale,
                );
                drag.to_region(name, view, self.scale)
            }
            (None, None) => {
                return Err(CliError::user_with_hint(
                    "no rectangle given",
                    "pass --rect X Y W H or --drag X1 Y1 X2 Y2",
                ))
            }
        };

        if region.width == 0 || region.height == 0 {
            return Err(CliError::validation("rect", "width and height must be positive"));
        }
        if region.clamped_to(card).is_none() {
            return Err(CliError::validation(
                "rect",
                format!("region lies outside the {card} card"),
            ));
        }

        let index = set.push(region);
        let row = RegionRow::new(index, &set.regions()[index]);
        save(path, Some(card), set)?;
        print_output(ctx, &row)
    }
}

impl RemoveArgs {
    fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let file = RegionsFile::load(&self.file.file)?;
        let mut set = RegionSet::new(file.regions);

        let index = match (self.index, &self.name) {
            (Some(index), _) => index,
            (None, Some(name)) => set.find(name).ok_or_else(|| {
                CliError::not_found_with_suggestions(
                    "region",
                    name,
                    set.regions()
                        .iter()
                        .enumerate()
                        .map(|(i, r)| r.display_name(i))
                        .collect(),
                )
            })?,
            (None, None) => return Err(CliError::validation("index", "pass --index or --name")),
        };

        let len = set.len();
        let removed = set
            .remove(index)
            .ok_or(wotr_atlas::AtlasError::RegionIndexOutOfRange { index, len })?;
        save(&self.file.file, file.image_size, set)?;
        print_output(
            ctx,
            &StatusOutput::success(format!("Removed {}", removed.display_name(index))),
        )
    }
}

/// One region in command output.
#[derive(Debug, Serialize)]
pub struct RegionRow {
    pub index: usize,
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RegionRow {
    fn new(index: usize, region: &Region) -> Self {
        Self {
            index,
            name: region.display_name(index),
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
        }
    }
}

impl FormattedOutput for RegionRow {
    fn format_text(&self) -> String {
        format!(
            "{:>3}  {:<20} {:>5},{:<5} {}x{}",
            self.index, self.name, self.x, self.y, self.width, self.height
        )
    }
}

#[derive(Debug, Serialize)]
pub struct RegionList {
    pub image_size: Option<CardSize>,
    pub regions: Vec<RegionRow>,
}

impl RegionList {
    fn new(file: &RegionsFile) -> Self {
        Self {
            image_size: file.image_size,
            regions: file
                .regions
                .iter()
                .enumerate()
                .map(|(i, r)| RegionRow::new(i, r))
                .collect(),
        }
    }
}

impl FormattedOutput for RegionList {
    fn format_text(&self) -> String {
        let size = self
            .image_size
            .map_or_else(|| "not set".to_string(), |s| s.to_string());
        let mut out = format!("card size: {size}\nregions: {}\n", self.regions.len());
        for row in &self.regions {
            out.push_str(&row.format_text());
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Serialize)]
pub struct HitReport {
    pub x: u32,
    pub y: u32,
    pub region: Option<RegionRow>,
}

impl FormattedOutput for HitReport {
    fn format_text(&self) -> String {
        match &self.region {
            Some(row) => row.format_text(),
            None => format!("no region at {},{}", self.x, self.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_list_text() {
        let file = RegionsFile::new(
            None,
            vec![Region::new("title", 10, 20, 100, 30), Region::new("", 0, 0, 5, 5)],
        );
        let text = RegionList::new(&file).format_text();
        assert!(text.starts_with("card size: not set\nregions: 2\n"));
        assert!(text.contains("title"));
        assert!(text.contains("region1"));
    }

    #[test]
    fn test_hit_miss_text() {
        let report = HitReport {
            x: 3,
            y: 4,
            region: None,
        };
        assert_eq!(report.format_text(), "no region at 3,4");
    }
}
