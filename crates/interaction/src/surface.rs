use std::collections::BTreeMap;

/// Presentation regions the viewer writes to, keyed by stable DOM ids.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    LoadingOverlay,
    CoordinatesDisplay,
    IframeOverlay,
    InfoIframe,
    CloseIframe,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::LoadingOverlay,
        Region::CoordinatesDisplay,
        Region::IframeOverlay,
        Region::InfoIframe,
        Region::CloseIframe,
    ];

    pub fn element_id(self) -> &'static str {
        match self {
            Region::LoadingOverlay => "loadingOverlay",
            Region::CoordinatesDisplay => "coordinatesDisplay",
            Region::IframeOverlay => "iframeOverlay",
            Region::InfoIframe => "infoIframe",
            Region::CloseIframe => "closeIframe",
        }
    }
}

/// DOM-like presentation surface.
///
/// Regions are optional integration points: writing to a region that does not
/// exist must be a silent no-op, never an error.
pub trait Surface {
    fn has_region(&self, region: Region) -> bool;
    fn set_visible(&mut self, region: Region, visible: bool);
    fn set_text(&mut self, region: Region, text: &str);
    fn set_html(&mut self, region: Region, html: &str);
    /// Points embedded content (an iframe) at `url`; empty clears it.
    fn set_embed_url(&mut self, region: Region, url: &str);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionState {
    pub visible: bool,
    /// Last text or HTML written.
    pub content: String,
    pub embed_url: String,
}

/// In-memory surface for the CLI host and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySurface {
    regions: BTreeMap<Region, RegionState>,
}

impl MemorySurface {
    /// Surface with no regions at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Surface with every known region present and hidden.
    pub fn full() -> Self {
        Self::with_regions(Region::ALL)
    }

    pub fn with_regions<I>(regions: I) -> Self
    where
        I: IntoIterator<Item = Region>,
    {
        Self {
            regions: regions
                .into_iter()
                .map(|r| (r, RegionState::default()))
                .collect(),
        }
    }

    pub fn region(&self, region: Region) -> Option<&RegionState> {
        self.regions.get(&region)
    }

    pub fn is_visible(&self, region: Region) -> bool {
        self.region(region).is_some_and(|r| r.visible)
    }

    pub fn content(&self, region: Region) -> Option<&str> {
        self.region(region).map(|r| r.content.as_str())
    }

    pub fn embed_url(&self, region: Region) -> Option<&str> {
        self.region(region).map(|r| r.embed_url.as_str())
    }
}

impl Surface for MemorySurface {
    fn has_region(&self, region: Region) -> bool {
        self.regions.contains_key(&region)
    }

    fn set_visible(&mut self, region: Region, visible: bool) {
        if let Some(r) = self.regions.get_mut(&region) {
            r.visible = visible;
        }
    }

    fn set_text(&mut self, region: Region, text: &str) {
        if let Some(r) = self.regions.get_mut(&region) {
            r.content = text.to_string();
        }
    }

    fn set_html(&mut self, region: Region, html: &str) {
        if let Some(r) = self.regions.get_mut(&region) {
            r.content = html.to_string();
        }
    }

    fn set_embed_url(&mut self, region: Region, url: &str) {
        if let Some(r) = self.regions.get_mut(&region) {
            r.embed_url = url.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MemorySurface, Region, Surface};

    #[test]
    fn writes_to_missing_regions_are_ignored() {
        let mut s = MemorySurface::with_regions([Region::LoadingOverlay]);
        s.set_visible(Region::IframeOverlay, true);
        s.set_text(Region::CoordinatesDisplay, "x");
        assert!(!s.has_region(Region::IframeOverlay));
        assert!(s.region(Region::CoordinatesDisplay).is_none());

        s.set_text(Region::LoadingOverlay, "Loading...");
        s.set_visible(Region::LoadingOverlay, true);
        assert_eq!(s.content(Region::LoadingOverlay), Some("Loading..."));
        assert!(s.is_visible(Region::LoadingOverlay));
    }

    #[test]
    fn element_ids_match_page_markup() {
        let ids: Vec<&str> = Region::ALL.iter().map(|r| r.element_id()).collect();
        assert_eq!(
            ids,
            vec![
                "loadingOverlay",
                "coordinatesDisplay",
                "iframeOverlay",
                "infoIframe",
                "closeIframe"
            ]
        );
    }
}
