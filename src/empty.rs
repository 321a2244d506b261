//! Backend that records nothing. Useful for running the adapter logic
//! without a GPU.

use std::{
    ffi::c_void,
    ptr::{self, NonNull},
};

#[derive(Clone, Debug)]
pub struct Api;
#[derive(Clone, Debug)]
pub struct Context;
#[derive(Debug)]
pub struct Encoder;
#[derive(Clone, Debug, PartialEq)]
pub struct Resource;

/// Engine that accepts every call and records nothing.
#[derive(Debug, Default)]
pub struct Engine;

type DeviceResult<T> = Result<T, crate::DeviceError>;

impl crate::Api for Api {
    type Device = Context;
    type CommandList = Encoder;
    type CommandAllocator = Context;
    type CommandQueue = Context;
    type Resource = Resource;
}

impl crate::RawHandle for Context {
    unsafe fn from_raw(_raw: NonNull<c_void>) -> Self {
        Context
    }
    fn as_raw(&self) -> *mut c_void {
        ptr::null_mut()
    }
}

impl crate::RawHandle for Resource {
    unsafe fn from_raw(_raw: NonNull<c_void>) -> Self {
        Resource
    }
    fn as_raw(&self) -> *mut c_void {
        ptr::null_mut()
    }
}

impl crate::Device<Api> for Context {
    fn adapter_luid(&self) -> crate::Luid {
        crate::Luid::default()
    }
}

impl crate::NativeResource for Resource {
    fn describe(&self) -> crate::ResourceDescription {
        crate::ResourceDescription {
            kind: crate::ResourceKind::Unknown,
            format: 0,
            width: 0,
            height: 0,
            depth_or_array_layers: 0,
            mip_level_count: 0,
        }
    }
}

impl crate::CommandList<Api> for Encoder {
    unsafe fn reset(&self, _allocator: &Context) -> DeviceResult<()> {
        Ok(())
    }
    unsafe fn close(&self) -> DeviceResult<()> {
        Ok(())
    }
    unsafe fn resource_barrier(&self, _barriers: &[crate::TransitionBarrier<'_, Api>]) {}
    unsafe fn copy_resource(&self, _dst: &Resource, _src: &Resource) {}
}

impl<A: crate::Api> crate::Engine<A> for Engine {
    fn create(
        &mut self,
        _context: &crate::DispatchContext<'_, A>,
        _params: &mut crate::ParameterMap,
    ) -> Result<(), crate::Status> {
        Ok(())
    }
    fn destroy(&mut self) {}
    fn dispatch(
        &mut self,
        _context: &crate::DispatchContext<'_, A>,
        _params: &mut crate::ParameterMap,
    ) -> Result<(), crate::Status> {
        Ok(())
    }
}
