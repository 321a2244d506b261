/*!
# DirectX12 backend.

The mapping is straightforward: every handle the host stores in the
parameter bag is a raw COM pointer, wrapped here into a counted [`ComPtr`].

## Resource transitions

Engine states map onto `D3D12_RESOURCE_STATES` bit for bit (see
[`crate::conv`]). Barriers always cover all subresources.

## Struct returning methods

`GetAdapterLuid` and `GetDesc` return structures by value, which the
bindings route through a hidden out pointer as the native ABI requires.
!*/

mod com;
mod command;
mod conv;

use winapi::um::d3d12;

pub use com::ComPtr;

#[derive(Clone, Debug)]
pub struct Api;

pub type Device = ComPtr<d3d12::ID3D12Device>;
pub type GraphicsCommandList = ComPtr<d3d12::ID3D12GraphicsCommandList>;
pub type CommandAllocator = ComPtr<d3d12::ID3D12CommandAllocator>;
pub type CommandQueue = ComPtr<d3d12::ID3D12CommandQueue>;
pub type Resource = ComPtr<d3d12::ID3D12Resource>;

impl crate::Api for Api {
    type Device = Device;
    type CommandList = GraphicsCommandList;
    type CommandAllocator = CommandAllocator;
    type CommandQueue = CommandQueue;
    type Resource = Resource;
}

impl crate::Device<Api> for Device {
    fn adapter_luid(&self) -> crate::Luid {
        let raw = unsafe { self.GetAdapterLuid() };
        crate::Luid {
            low_part: raw.LowPart,
            high_part: raw.HighPart,
        }
    }
}

impl crate::NativeResource for Resource {
    fn describe(&self) -> crate::ResourceDescription {
        let desc = unsafe { self.GetDesc() };
        conv::map_resource_desc(&desc)
    }
}
