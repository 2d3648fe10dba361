use crate::service::AssetError;

/// Lifecycle of one remote asset as seen by the viewer.
///
/// Requested → Loading → Resident | Failed
///
/// There is no eviction: assets stay resident for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Residency {
    #[default]
    Requested,
    Loading,
    Resident,
    Failed(AssetError),
}

impl Residency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_loading(&mut self) {
        if matches!(self, Residency::Requested) {
            *self = Residency::Loading;
        }
    }

    /// Settles a load. Returns `false` if the asset had already settled.
    pub fn settle(&mut self, result: Result<(), AssetError>) -> bool {
        if self.is_settled() {
            return false;
        }
        *self = match result {
            Ok(()) => Residency::Resident,
            Err(err) => Residency::Failed(err),
        };
        true
    }

    pub fn is_resident(&self) -> bool {
        matches!(self, Residency::Resident)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Residency::Resident | Residency::Failed(_))
    }
}
