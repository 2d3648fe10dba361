use foundation::ids::AssetId;
use foundation::math::Vec3;

use crate::icons::IconKind;

/// A marker attached to a building, relative to the building's position.
#[derive(Debug, Clone, PartialEq)]
pub struct IconPlacement {
    pub offset: Vec3,
    pub kind: IconKind,
}

/// One configured building: its remote asset, hit box, overlay page and markers.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingRecord {
    pub asset_id: AssetId,
    pub name: String,
    /// Hit box centre (ECEF meters).
    pub position: Vec3,
    /// Hit box edge lengths along local east, north and up (meters).
    pub dimensions: Vec3,
    pub overlay_url: String,
    pub icons: Vec<IconPlacement>,
}

impl BuildingRecord {
    pub fn new(
        asset_id: AssetId,
        position: Vec3,
        dimensions: Vec3,
        overlay_url: impl Into<String>,
    ) -> Self {
        Self {
            asset_id,
            name: default_name(asset_id),
            position,
            dimensions,
            overlay_url: overlay_url.into(),
            icons: Vec::new(),
        }
    }

    pub fn with_icon(mut self, offset: Vec3, kind: IconKind) -> Self {
        self.icons.push(IconPlacement { offset, kind });
        self
    }

    /// Absolute anchor of each icon, in declaration order.
    pub fn icon_anchors(&self) -> impl Iterator<Item = (Vec3, &IconKind)> + '_ {
        self.icons.iter().map(|i| (self.position + i.offset, &i.kind))
    }
}

pub(crate) fn default_name(asset_id: AssetId) -> String {
    format!("Building {asset_id}")
}
