use winapi::um::d3d12;

pub fn map_resource_dimension(dimension: d3d12::D3D12_RESOURCE_DIMENSION) -> crate::ResourceKind {
    match dimension {
        d3d12::D3D12_RESOURCE_DIMENSION_BUFFER => crate::ResourceKind::Buffer,
        d3d12::D3D12_RESOURCE_DIMENSION_TEXTURE1D => crate::ResourceKind::Texture1D,
        d3d12::D3D12_RESOURCE_DIMENSION_TEXTURE2D => crate::ResourceKind::Texture2D,
        d3d12::D3D12_RESOURCE_DIMENSION_TEXTURE3D => crate::ResourceKind::Texture3D,
        _ => crate::ResourceKind::Unknown,
    }
}

pub fn map_resource_desc(desc: &d3d12::D3D12_RESOURCE_DESC) -> crate::ResourceDescription {
    crate::ResourceDescription {
        kind: map_resource_dimension(desc.Dimension),
        format: desc.Format,
        width: desc.Width,
        height: desc.Height,
        depth_or_array_layers: desc.DepthOrArraySize,
        mip_level_count: desc.MipLevels,
    }
}

pub fn map_transition_barrier(
    barrier: &crate::TransitionBarrier<'_, super::Api>,
) -> d3d12::D3D12_RESOURCE_BARRIER {
    let mut raw = d3d12::D3D12_RESOURCE_BARRIER {
        Type: d3d12::D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
        Flags: d3d12::D3D12_RESOURCE_BARRIER_FLAG_NONE,
        u: unsafe { std::mem::zeroed() },
    };
    unsafe {
        *raw.u.Transition_mut() = d3d12::D3D12_RESOURCE_TRANSITION_BARRIER {
            pResource: barrier.resource.as_mut_ptr(),
            Subresource: d3d12::D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
            StateBefore: barrier.states.start.bits(),
            StateAfter: barrier.states.end.bits(),
        };
    }
    raw
}
