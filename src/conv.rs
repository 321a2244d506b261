//! Translation from engine resource states to native state bits.
//!
//! Every other module goes through here; nothing re-derives state bits on its own.

use crate::{NativeResourceStates as Ns, ResourceState};

pub fn map_resource_state(state: ResourceState) -> Ns {
    match state {
        ResourceState::Common => Ns::COMMON,
        ResourceState::UnorderedAccess => Ns::UNORDERED_ACCESS,
        ResourceState::ComputeRead => Ns::NON_PIXEL_SHADER_RESOURCE,
        ResourceState::PixelRead => Ns::PIXEL_SHADER_RESOURCE,
        ResourceState::PixelComputeRead => {
            Ns::PIXEL_SHADER_RESOURCE | Ns::NON_PIXEL_SHADER_RESOURCE
        }
        ResourceState::CopySrc => Ns::COPY_SOURCE,
        ResourceState::CopyDest => Ns::COPY_DEST,
        ResourceState::GenericRead => Ns::GENERIC_READ,
        ResourceState::IndirectArgument => Ns::INDIRECT_ARGUMENT,
        ResourceState::Present => Ns::PRESENT,
        ResourceState::RenderTarget => Ns::RENDER_TARGET,
    }
}

/// Maps a raw engine state value. Unknown values are a caller bug; they are
/// reported and treated as `COMMON`.
pub fn map_raw_resource_state(raw: u32) -> Ns {
    match ResourceState::from_raw(raw) {
        Some(state) => map_resource_state(state),
        None => {
            log::error!("Resource state {:#x} is not supported", raw);
            Ns::COMMON
        }
    }
}
