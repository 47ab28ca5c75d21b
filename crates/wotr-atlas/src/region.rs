//! Named card regions, the regions file and editing helpers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{AtlasError, Result};
use crate::grid::CardSize;

/// A named rectangle in card pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(name: impl Into<String>, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            width,
            height,
        }
    }

    /// The region name, or `region{index}` for unnamed regions.
    pub fn display_name(&self, index: usize) -> String {
        if self.name.is_empty() {
            format!("region{index}")
        } else {
            self.name.clone()
        }
    }

    /// Half-open point containment.
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x
            && py >= self.y
            && u64::from(px) < u64::from(self.x) + u64::from(self.width)
            && u64::from(py) < u64::from(self.y) + u64::from(self.height)
    }

    /// The part of this region inside a card, `None` if nothing is left.
    pub fn clamped_to(&self, card: CardSize) -> Option<Region> {
        if self.x >= card.width || self.y >= card.height {
            return None;
        }
        let width = self.width.min(card.width - self.x);
        let height = self.height.min(card.height - self.y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(Region {
            name: self.name.clone(),
            x: self.x,
            y: self.y,
            width,
            height,
        })
    }
}

/// Contents of a regions JSON file.
///
/// Two layouts exist on disk: an object `{"image_size": [w, h], "regions": [...]}`
/// and an older bare list of regions without a card size. Saving always writes
/// the object layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionsFile {
    pub image_size: Option<CardSize>,
    pub regions: Vec<Region>,
}

#[derive(Serialize)]
struct RegionsFileOut<'a> {
    image_size: [u32; 2],
    regions: &'a [Region],
}

fn parse_image_size(value: Option<&Value>) -> Option<CardSize> {
    let items = value?.as_array()?;
    if items.len() < 2 {
        return None;
    }
    let w = u32::try_from(items[0].as_u64()?).ok()?;
    let h = u32::try_from(items[1].as_u64()?).ok()?;
    Some(CardSize::new(w, h))
}

impl RegionsFile {
    pub fn new(image_size: Option<CardSize>, regions: Vec<Region>) -> Self {
        Self {
            image_size,
            regions,
        }
    }

    /// Parse either regions layout.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(s).map_err(|e| AtlasError::json("regions file", e))?;

        let (image_size, regions) = match value {
            Value::Object(mut obj) => {
                let regions = match obj.remove("regions") {
                    Some(v @ Value::Array(_)) => v,
                    _ => return Err(AtlasError::RegionsFormat),
                };
                (parse_image_size(obj.get("image_size")), regions)
            }
            v @ Value::Array(_) => (None, v),
            _ => return Err(AtlasError::RegionsFormat),
        };

        let regions: Vec<Region> =
            serde_json::from_value(regions).map_err(|e| AtlasError::json("regions list", e))?;

        Ok(Self {
            image_size,
            regions,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| AtlasError::io(path, e))?;
        let file = Self::from_json_str(&contents)?;
        tracing::debug!(
            path = %path.display(),
            regions = file.regions.len(),
            image_size = ?file.image_size,
            "loaded regions file"
        );
        Ok(file)
    }

    /// Serialize in the object layout. A missing size is written as the default card size.
    pub fn to_json_string(&self) -> Result<String> {
        let out = RegionsFileOut {
            image_size: self.image_size.unwrap_or_default().into(),
            regions: &self.regions,
        };
        serde_json::to_string_pretty(&out).map_err(|e| AtlasError::json("regions file", e))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| AtlasError::io(parent, e))?;
        }
        std::fs::write(path, self.to_json_string()?).map_err(|e| AtlasError::io(path, e))
    }
}

/// An editable list of regions with a current selection.
#[derive(Debug, Clone, Default)]
pub struct RegionSet {
    regions: Vec<Region>,
    selected: Option<usize>,
}

impl RegionSet {
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            regions,
            selected: None,
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn into_regions(self) -> Vec<Region> {
        self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Name proposed for the next region.
    pub fn default_name(&self) -> String {
        format!("region{}", self.regions.len() + 1)
    }

    /// Append a region and select it.
    pub fn push(&mut self, region: Region) -> usize {
        self.regions.push(region);
        let index = self.regions.len() - 1;
        self.selected = Some(index);
        index
    }

    /// Remove a region, keeping the selection pointed at the same region.
    pub fn remove(&mut self, index: usize) -> Option<Region> {
        if index >= self.regions.len() {
            return None;
        }
        let removed = self.regions.remove(index);
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.regions.clear();
        self.selected = None;
    }

    /// Select the first region containing the point; clears the selection on a miss.
    pub fn hit_test(&mut self, px: u32, py: u32) -> Option<usize> {
        self.selected = self.regions.iter().position(|r| r.contains(px, py));
        self.selected
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.regions.iter().position(|r| r.name == name)
    }
}

/// View units a pointer has to travel before a press counts as a drag.
pub const DRAG_THRESHOLD: f32 = 4.0;

/// A pointer drag over a scaled card preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragRect {
    pub start: (f32, f32),
    pub end: (f32, f32),
}

impl DragRect {
    pub fn new(start: (f32, f32), end: (f32, f32)) -> Self {
        Self { start, end }
    }

    pub fn is_drag(&self) -> bool {
        let dx = self.end.0 - self.start.0;
        let dy = self.end.1 - self.start.1;
        (dx * dx + dy * dy).sqrt() > DRAG_THRESHOLD
    }

    /// Convert to card pixels `(x, y, width, height)`.
    ///
    /// Both corners are clamped into the view, `scale` is view units per card
    /// pixel. Width and height are at least one pixel.
    pub fn to_card_rect(&self, view_size: (f32, f32), scale: f32) -> (u32, u32, u32, u32) {
        let sx = self.start.0.clamp(0.0, view_size.0);
        let sy = self.start.1.clamp(0.0, view_size.1);
        let ex = self.end.0.clamp(0.0, view_size.0);
        let ey = self.end.1.clamp(0.0, view_size.1);

        let to_px = 1.0 / scale;
        let x = (sx.min(ex) * to_px).round().max(0.0) as u32;
        let y = (sy.min(ey) * to_px).round().max(0.0) as u32;
        let w = ((sx - ex).abs() * to_px).round().max(1.0) as u32;
        let h = ((sy - ey).abs() * to_px).round().max(1.0) as u32;
        (x, y, w, h)
    }

    /// Build a named region from this drag.
    pub fn to_region(&self, name: impl Into<String>, view_size: (f32, f32), scale: f32) -> Region {
        let (x, y, w, h) = self.to_card_rect(view_size, scale);
        Region::new(name, x, y, w, h)
    }
}
