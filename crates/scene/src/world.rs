use crate::components::{ComponentBounds, Drawable3D, Transform, Visibility};
use crate::entity::EntityId;
use crate::picking::PickLayer;
use foundation::handles::Handle;

/// Headless scene storage: dense per-component columns indexed by entity.
#[derive(Debug, Default)]
pub struct World {
    next_index: u32,
    transforms: Vec<Option<Transform>>,
    bounds: Vec<Option<ComponentBounds>>,
    visibility: Vec<Option<Visibility>>,
    drawables_3d: Vec<Option<Drawable3D>>,
    pick_layers: Vec<Option<PickLayer>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId(Handle::new(self.next_index, 0));
        self.next_index += 1;
        let idx = id.index() as usize;
        self.ensure_capacity(idx);
        id
    }

    /// Number of entities ever spawned.
    pub fn len(&self) -> usize {
        self.next_index as usize
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    pub fn set_transform(&mut self, entity: EntityId, transform: Transform) {
        self.ensure_capacity(entity.index() as usize);
        self.transforms[entity.index() as usize] = Some(transform);
    }

    pub fn transform(&self, entity: EntityId) -> Option<Transform> {
        self.transforms.get(entity.index() as usize).and_then(|t| *t)
    }

    pub fn set_bounds(&mut self, entity: EntityId, bounds: ComponentBounds) {
        self.ensure_capacity(entity.index() as usize);
        self.bounds[entity.index() as usize] = Some(bounds);
    }

    pub fn bounds(&self, entity: EntityId) -> Option<ComponentBounds> {
        self.bounds.get(entity.index() as usize).and_then(|b| *b)
    }

    pub fn set_visibility(&mut self, entity: EntityId, visibility: Visibility) {
        self.ensure_capacity(entity.index() as usize);
        self.visibility[entity.index() as usize] = Some(visibility);
    }

    pub fn is_visible(&self, entity: EntityId) -> bool {
        self.visible_at(entity.index() as usize)
    }

    pub fn set_drawable_3d(&mut self, entity: EntityId, drawable: Drawable3D) {
        self.ensure_capacity(entity.index() as usize);
        self.drawables_3d[entity.index() as usize] = Some(drawable);
    }

    pub fn drawable_3d(&self, entity: EntityId) -> Option<Drawable3D> {
        self.drawables_3d.get(entity.index() as usize).and_then(|d| *d)
    }

    pub fn set_pick_layer(&mut self, entity: EntityId, layer: PickLayer) {
        self.ensure_capacity(entity.index() as usize);
        self.pick_layers[entity.index() as usize] = Some(layer);
    }

    pub fn pick_layer(&self, entity: EntityId) -> Option<PickLayer> {
        self.pick_layers.get(entity.index() as usize).and_then(|l| *l)
    }

    /// Visible entities that can be picked: they carry a pick layer and explicit bounds.
    pub fn pickables(&self) -> Vec<(EntityId, PickLayer, ComponentBounds)> {
        let mut out = Vec::new();
        for (idx, layer) in self.pick_layers.iter().enumerate() {
            let Some(layer) = layer else { continue };
            let Some(bounds) = self.bounds.get(idx).and_then(|b| *b) else {
                continue;
            };
            if !self.visible_at(idx) {
                continue;
            }
            out.push((EntityId(Handle::new(idx as u32, 0)), *layer, bounds));
        }
        out
    }

    pub fn drawables_3d(&self) -> Vec<(EntityId, Transform, Drawable3D)> {
        let mut out = Vec::new();
        for (idx, drawable) in self.drawables_3d.iter().enumerate() {
            let Some(drawable) = drawable else { continue };
            let Some(transform) = self.transforms.get(idx).and_then(|t| *t) else {
                continue;
            };
            if !self.visible_at(idx) {
                continue;
            }
            out.push((EntityId(Handle::new(idx as u32, 0)), transform, *drawable));
        }
        out
    }

    fn visible_at(&self, idx: usize) -> bool {
        self.visibility
            .get(idx)
            .and_then(|v| *v)
            .map(|v| v.is_visible())
            .unwrap_or(true)
    }

    fn ensure_capacity(&mut self, idx: usize) {
        if self.transforms.len() <= idx {
            let new_len = idx + 1;
            self.transforms.resize(new_len, None);
            self.bounds.resize(new_len, None);
            self.visibility.resize(new_len, None);
            self.drawables_3d.resize(new_len, None);
            self.pick_layers.resize(new_len, None);
        }
    }
}
