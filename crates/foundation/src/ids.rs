use std::fmt;

/// Remote asset identifier as issued by the hosted tileset service.
///
/// Opaque to the viewer: it is only ever compared, logged, and sent back to the
/// service.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId(pub u64);

impl AssetId {
    pub fn new(n: u64) -> Self {
        AssetId(n)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
