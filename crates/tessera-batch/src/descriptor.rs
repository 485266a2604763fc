//! Draw-call descriptors: the batching key.
//!
//! Two elements may share a draw call only if their descriptors compare
//! equal (and they sit in the same coplanar set). Descriptors are interned
//! per root by [`DescriptorCache`], so draw calls carry a small
//! [`DescriptorId`] instead of the full value.

use ahash::RandomState;
use bitflags::bitflags;
use indexmap::IndexSet;

use crate::ids::DescriptorId;

/// Kind of renderable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualType {
    /// Flat quad (optionally rounded, bordered, textured).
    Block2D,
    /// Extruded block with real depth.
    Block3D,
    /// Flat drop-shadow quad drawn beneath a block.
    DropShadow,
    /// One text submesh (glyph quads sharing a font atlas).
    Text,
}

impl VisualType {
    /// Flat content is alpha blended and needs camera-sorted depth offsets.
    pub fn is_flat(self) -> bool {
        !matches!(self, VisualType::Block3D)
    }
}

bitflags! {
    /// Shader variant switches that change the material.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MaterialModifiers: u16 {
        const CLIP_RECT = 1 << 0;
        const SOFT_MASK = 1 << 1;
        const GRADIENT = 1 << 2;
        const OUTLINE = 1 << 3;
        const IMAGE = 1 << 4;
    }
}

/// Shading model of a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lighting {
    #[default]
    Unlit,
    Lit,
}

/// Shadow participation of lit content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SurfaceSettings {
    pub cast_shadows: bool,
    pub receive_shadows: bool,
}

/// Per-visual-type fields that also split batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeParams {
    Block { image: Option<u32> },
    Block3D { bevel_segments: u8 },
    Shadow { blur_steps: u8 },
    Text { font_atlas: u32 },
}

/// Equality key deciding whether two elements can be instanced together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawCallDescriptor {
    /// Kind of geometry. Decides whether the content is flat.
    pub visual_type: VisualType,
    /// Shader features enabled for the draw call.
    pub material_modifiers: MaterialModifiers,
    /// Host-defined effect id. `0` means none.
    pub visual_modifier_id: u32,
    /// Shading model.
    pub lighting: Lighting,
    /// Shadow settings.
    pub surface: SurfaceSettings,
    /// Fields specific to `visual_type`.
    pub params: TypeParams,
}

impl DrawCallDescriptor {
    fn with_type(visual_type: VisualType, params: TypeParams) -> Self {
        Self {
            visual_type,
            material_modifiers: MaterialModifiers::empty(),
            visual_modifier_id: 0,
            lighting: Lighting::Unlit,
            surface: SurfaceSettings::default(),
            params,
        }
    }

    /// Plain untextured 2D block.
    pub fn block_2d() -> Self {
        Self::with_type(VisualType::Block2D, TypeParams::Block { image: None })
    }

    /// 2D block sampling `image`.
    pub fn image(image: u32) -> Self {
        let mut desc = Self::with_type(
            VisualType::Block2D,
            TypeParams::Block { image: Some(image) },
        );
        desc.material_modifiers |= MaterialModifiers::IMAGE;
        desc
    }

    /// Lit, shadowed 3D block.
    pub fn block_3d(bevel_segments: u8) -> Self {
        let mut desc = Self::with_type(
            VisualType::Block3D,
            TypeParams::Block3D { bevel_segments },
        );
        desc.lighting = Lighting::Lit;
        desc.surface = SurfaceSettings {
            cast_shadows: true,
            receive_shadows: true,
        };
        desc
    }

    /// Flat drop shadow blurred over `blur_steps` steps.
    pub fn shadow(blur_steps: u8) -> Self {
        Self::with_type(VisualType::DropShadow, TypeParams::Shadow { blur_steps })
    }

    /// Text submesh sampling glyphs from `font_atlas`.
    pub fn text(font_atlas: u32) -> Self {
        Self::with_type(VisualType::Text, TypeParams::Text { font_atlas })
    }

    /// Add material modifiers to the existing set.
    pub fn with_modifiers(mut self, modifiers: MaterialModifiers) -> Self {
        self.material_modifiers |= modifiers;
        self
    }

    pub fn with_visual_modifier(mut self, id: u32) -> Self {
        self.visual_modifier_id = id;
        self
    }

    /// Whether elements with this descriptor are transparent flat content.
    pub fn is_flat(&self) -> bool {
        self.visual_type.is_flat()
    }
}

/// Per-root descriptor interner.
///
/// Ids are dense and assigned in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct DescriptorCache {
    set: IndexSet<DrawCallDescriptor, RandomState>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id of `descriptor`, adding it on first sight.
    pub fn intern(&mut self, descriptor: DrawCallDescriptor) -> DescriptorId {
        let (index, _) = self.set.insert_full(descriptor);
        DescriptorId::from(index)
    }

    /// Descriptor behind an interned id.
    pub fn get(&self, id: DescriptorId) -> Option<&DrawCallDescriptor> {
        self.set.get_index(id.index())
    }

    /// Id of a descriptor without interning it.
    pub fn id_of(&self, descriptor: &DrawCallDescriptor) -> Option<DescriptorId> {
        self.set.get_index_of(descriptor).map(DescriptorId::from)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DescriptorId, &DrawCallDescriptor)> {
        self.set
            .iter()
            .enumerate()
            .map(|(i, d)| (DescriptorId::from(i), d))
    }

    pub fn clear(&mut self) {
        self.set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates() {
        let mut cache = DescriptorCache::new();
        let a = cache.intern(DrawCallDescriptor::block_2d());
        let b = cache.intern(DrawCallDescriptor::text(3));
        let c = cache.intern(DrawCallDescriptor::block_2d());

        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(b), Some(&DrawCallDescriptor::text(3)));
    }

    #[test]
    fn test_modifiers_split_batches() {
        let plain = DrawCallDescriptor::block_2d();
        let clipped = DrawCallDescriptor::block_2d().with_modifiers(MaterialModifiers::CLIP_RECT);
        assert_ne!(plain, clipped);
        assert_ne!(plain, plain.with_visual_modifier(4));
    }

    #[test]
    fn test_flatness() {
        assert!(DrawCallDescriptor::shadow(2).is_flat());
        assert!(DrawCallDescriptor::text(0).is_flat());
        assert!(!DrawCallDescriptor::block_3d(1).is_flat());
    }
}
