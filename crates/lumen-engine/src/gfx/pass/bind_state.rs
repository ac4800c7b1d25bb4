use crate::gfx::ResourceId;

use super::MAX_TEXTURE_UNITS;

/// What the render pass currently has bound.
///
/// Every setter returns `true` only when the binding actually changed, so the
/// pass issues a GPU command once per change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindState {
    program: Option<ResourceId>,
    pipeline: Option<ResourceId>,
    bind_group: Option<ResourceId>,
    dynamic_offsets: Vec<u32>,
    vertex_array: Option<ResourceId>,
    textures: [Option<ResourceId>; MAX_TEXTURE_UNITS],
}

fn replace(slot: &mut Option<ResourceId>, id: ResourceId) -> bool {
    if *slot == Some(id) {
        false
    } else {
        *slot = Some(id);
        true
    }
}

impl BindState {
    pub fn use_program(&mut self, id: ResourceId) -> bool {
        replace(&mut self.program, id)
    }

    pub fn set_pipeline(&mut self, id: ResourceId) -> bool {
        replace(&mut self.pipeline, id)
    }

    /// A bind group is re-set when either the group or its dynamic offsets change.
    pub fn set_bind_group(&mut self, id: ResourceId, dynamic_offsets: &[u32]) -> bool {
        let offsets_changed = self.dynamic_offsets != dynamic_offsets;
        if offsets_changed {
            self.dynamic_offsets = dynamic_offsets.to_vec();
        }
        replace(&mut self.bind_group, id) | offsets_changed
    }

    pub fn set_vertex_array(&mut self, id: ResourceId) -> bool {
        replace(&mut self.vertex_array, id)
    }

    /// Records `id` on `unit`. Out-of-range units are ignored.
    pub fn bind_texture(&mut self, unit: usize, id: ResourceId) -> bool {
        match self.textures.get_mut(unit) {
            Some(slot) => replace(slot, id),
            None => false,
        }
    }

    #[inline]
    pub fn program(&self) -> Option<ResourceId> {
        self.program
    }

    #[inline]
    pub fn vertex_array(&self) -> Option<ResourceId> {
        self.vertex_array
    }

    pub fn texture(&self, unit: usize) -> Option<ResourceId> {
        self.textures.get(unit).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn using_a_program_twice_equals_once() {
        let id = ResourceId::next();

        let mut once = BindState::default();
        assert!(once.use_program(id));

        let mut twice = BindState::default();
        assert!(twice.use_program(id));
        assert!(!twice.use_program(id));

        assert_eq!(once, twice);
        assert_eq!(twice.program(), Some(id));
    }

    #[test]
    fn switching_programs_reports_a_change() {
        let mut state = BindState::default();
        let a = ResourceId::next();
        let b = ResourceId::next();
        assert!(state.use_program(a));
        assert!(state.use_program(b));
        assert!(state.use_program(a));
    }

    #[test]
    fn texture_units_are_tracked_independently() {
        let mut state = BindState::default();
        let container = ResourceId::next();
        let face = ResourceId::next();

        assert!(state.bind_texture(0, container));
        assert!(state.bind_texture(1, face));
        assert!(!state.bind_texture(0, container));
        assert_eq!(state.texture(1), Some(face));
        assert_eq!(state.texture(2), None);
    }

    #[test]
    fn out_of_range_unit_is_ignored() {
        let mut state = BindState::default();
        assert!(!state.bind_texture(MAX_TEXTURE_UNITS, ResourceId::next()));
        assert_eq!(state.texture(MAX_TEXTURE_UNITS), None);
    }

    #[test]
    fn new_dynamic_offsets_rebind_the_same_group() {
        let mut state = BindState::default();
        let group = ResourceId::next();
        assert!(state.set_bind_group(group, &[0]));
        assert!(!state.set_bind_group(group, &[0]));
        assert!(state.set_bind_group(group, &[256]));
    }

    #[test]
    fn rebinding_same_vertex_array_is_skipped() {
        let mut state = BindState::default();
        let va = ResourceId::next();
        assert!(state.set_vertex_array(va));
        assert!(!state.set_vertex_array(va));
        assert_eq!(state.vertex_array(), Some(va));
    }
}
