use super::{conv, CommandAllocator, GraphicsCommandList, Resource};
use crate::auxil::dxgi::result::HResult as _;
use smallvec::SmallVec;
use std::ptr;
use winapi::um::d3d12;

impl crate::CommandList<super::Api> for GraphicsCommandList {
    unsafe fn reset(&self, allocator: &CommandAllocator) -> Result<(), crate::DeviceError> {
        self.Reset(allocator.as_mut_ptr(), ptr::null_mut())
            .into_device_result("Command list reset")
    }

    unsafe fn close(&self) -> Result<(), crate::DeviceError> {
        self.Close().into_device_result("Command list close")
    }

    unsafe fn resource_barrier(&self, barriers: &[crate::TransitionBarrier<'_, super::Api>]) {
        let raw = barriers
            .iter()
            .map(conv::map_transition_barrier)
            .collect::<SmallVec<[d3d12::D3D12_RESOURCE_BARRIER; crate::MAX_BARRIERS_PER_COPY]>>();
        if !raw.is_empty() {
            self.ResourceBarrier(raw.len() as u32, raw.as_ptr());
        }
    }

    unsafe fn copy_resource(&self, dst: &Resource, src: &Resource) {
        self.CopyResource(dst.as_mut_ptr(), src.as_mut_ptr());
    }
}
