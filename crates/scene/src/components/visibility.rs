/// Hidden entities are neither drawn nor picked.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    pub fn visible() -> Self {
        Visibility::Visible
    }

    pub fn hidden() -> Self {
        Visibility::Hidden
    }

    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }
}
