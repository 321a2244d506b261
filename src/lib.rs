/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

/*! This library adapts a generic frame interpolation engine to a native
 *  GPU command recording context and a host supplied parameter bag.
 *  - Compile-time backend selection via traits.
 *  - Objects are passed by references and returned by value. No IDs.
 *  - Resource transitions are explicit, minimal and always restored.
 *  - The command list the adapter opens is the command list it closes.
 *  - Nothing outside of a single dispatch is global.
 */

#![allow(
    // Explicit lifetimes are often easier to reason about.
    clippy::needless_lifetimes,
    // No need for defaults in the internal types.
    clippy::new_without_default,
    // Backend traits mirror native calls, which are unsafe by nature.
    clippy::missing_safety_doc,
)]
#![warn(
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_qualifications,
    // We don't match on a reference, unless required.
    clippy::pattern_type_mismatch,
)]

#[cfg(all(feature = "dx12", windows))]
mod auxil;
pub mod conv;
mod copy;
#[cfg(all(feature = "dx12", windows))]
pub mod dx12;
pub mod empty;
mod interpolator;
pub mod params;
mod recording;

use std::{ffi::c_void, fmt, ops::Range, ptr::NonNull};

use bitflags::bitflags;
use thiserror::Error;

pub use interpolator::{DispatchContext, FrameInterpolator};
pub use params::{keys, ParameterMap, Value};

/// Upper bound on the transitions staged around a single copy: one for the
/// destination, one for the source.
pub const MAX_BARRIERS_PER_COPY: usize = 2;

pub type Label<'a> = Option<&'a str>;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum DeviceError {
    #[error("out of memory")]
    OutOfMemory,
    #[error("device is lost")]
    Lost,
    #[error("unexpected error variant (driver implementation is at fault)")]
    Unexpected,
}

/// Non-success status code reported by the interpolation engine or by the
/// backend interface initializer.
///
/// The code is carried verbatim to the host, so no variant is ever remapped.
#[derive(Clone, Copy, Eq, Hash, PartialEq, Error)]
#[error("interpolation status {0:#010x}")]
pub struct Status(pub u32);

impl Status {
    pub const INVALID_POINTER: Self = Self(0x8000_0000);
    pub const INVALID_ALIGNMENT: Self = Self(0x8000_0001);
    pub const INVALID_SIZE: Self = Self(0x8000_0002);
    pub const OUT_OF_MEMORY: Self = Self(0x8000_0007);
    pub const INCOMPLETE_INTERFACE: Self = Self(0x8000_0008);
    pub const INVALID_ENUM: Self = Self(0x8000_0009);
    pub const INVALID_ARGUMENT: Self = Self(0x8000_000a);
    pub const OUT_OF_RANGE: Self = Self(0x8000_000b);
    pub const NULL_DEVICE: Self = Self(0x8000_000c);
    pub const BACKEND_API_ERROR: Self = Self(0x8000_000d);

    /// The status code the host sees on success.
    pub const OK_CODE: u32 = 0;

    pub fn code(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Status({:#010x})", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Engine(#[from] Status),
    #[error("command list must be opened, but no command allocator was provided")]
    MissingCommandAllocator,
    #[error(transparent)]
    Device(#[from] DeviceError),
}

impl DispatchError {
    /// Status code reported to the host for this failure.
    pub fn code(&self) -> u32 {
        match *self {
            Self::Engine(status) => status.code(),
            Self::MissingCommandAllocator => Status::INVALID_POINTER.code(),
            Self::Device(DeviceError::OutOfMemory) => Status::OUT_OF_MEMORY.code(),
            Self::Device(_) => Status::BACKEND_API_ERROR.code(),
        }
    }
}

/// Collapses a dispatch result into the status code the host plugin ABI expects.
pub fn status_code(result: &Result<(), DispatchError>) -> u32 {
    match *result {
        Ok(()) => Status::OK_CODE,
        Err(ref err) => err.code(),
    }
}

pub trait Api: Sized {
    type Device: Device<Self>;
    type CommandList: CommandList<Self>;
    type CommandAllocator: RawHandle + fmt::Debug;
    type CommandQueue: RawHandle + fmt::Debug;
    type Resource: NativeResource + RawHandle;
}

/// Conversion from the untyped pointers the host stores in the parameter bag.
pub trait RawHandle: Sized {
    /// Wraps `raw`, taking a counted reference to the object behind it.
    ///
    /// # Safety
    ///
    /// `raw` must point to a live native object of the expected type.
    unsafe fn from_raw(raw: NonNull<c_void>) -> Self;

    fn as_raw(&self) -> *mut c_void;
}

/// Native device. Cloning takes one counted reference, dropping releases it.
pub trait Device<A: Api>: Clone + fmt::Debug {
    fn adapter_luid(&self) -> Luid;
}

pub trait CommandList<A: Api> {
    /// Puts the list into recording state, discarding anything previously
    /// recorded. No initial pipeline state is bound.
    unsafe fn reset(&self, allocator: &A::CommandAllocator) -> Result<(), DeviceError>;

    /// Finishes recording, making the list submittable.
    unsafe fn close(&self) -> Result<(), DeviceError>;

    /// Records all `barriers` as one batch.
    unsafe fn resource_barrier(&self, barriers: &[TransitionBarrier<'_, A>]);

    /// Copies the whole of `src` into `dst`.
    ///
    /// Note: `dst` current state has to be `COPY_DEST` and `src` current
    /// state has to be `COPY_SOURCE`.
    unsafe fn copy_resource(&self, dst: &A::Resource, src: &A::Resource);
}

/// Native buffer or texture. Equality is identity of the native object.
pub trait NativeResource: Clone + PartialEq + fmt::Debug {
    fn describe(&self) -> ResourceDescription;
}

/// Resource state as the interpolation engine tracks it.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ResourceState {
    Common = 1 << 0,
    UnorderedAccess = 1 << 1,
    ComputeRead = 1 << 2,
    PixelRead = 1 << 3,
    PixelComputeRead = (1 << 3) | (1 << 2),
    CopySrc = 1 << 4,
    CopyDest = 1 << 5,
    GenericRead = (1 << 4) | (1 << 2),
    IndirectArgument = 1 << 6,
    Present = 1 << 7,
    RenderTarget = 1 << 8,
}

impl ResourceState {
    pub const ALL: [Self; 11] = [
        Self::Common,
        Self::UnorderedAccess,
        Self::ComputeRead,
        Self::PixelRead,
        Self::PixelComputeRead,
        Self::CopySrc,
        Self::CopyDest,
        Self::GenericRead,
        Self::IndirectArgument,
        Self::Present,
        Self::RenderTarget,
    ];

    /// Decodes a state value coming from foreign code.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|&state| state as u32 == raw)
    }
}

bitflags! {
    /// Native resource state bits, laid out as `D3D12_RESOURCE_STATES`.
    pub struct NativeResourceStates: u32 {
        const COMMON = 0;
        const VERTEX_AND_CONSTANT_BUFFER = 0x1;
        const INDEX_BUFFER = 0x2;
        const RENDER_TARGET = 0x4;
        const UNORDERED_ACCESS = 0x8;
        const DEPTH_WRITE = 0x10;
        const DEPTH_READ = 0x20;
        const NON_PIXEL_SHADER_RESOURCE = 0x40;
        const PIXEL_SHADER_RESOURCE = 0x80;
        const STREAM_OUT = 0x100;
        const INDIRECT_ARGUMENT = 0x200;
        const COPY_DEST = 0x400;
        const COPY_SOURCE = 0x800;
        const RESOLVE_DEST = 0x1000;
        const RESOLVE_SOURCE = 0x2000;
        const GENERIC_READ = Self::VERTEX_AND_CONSTANT_BUFFER.bits | Self::INDEX_BUFFER.bits |
            Self::NON_PIXEL_SHADER_RESOURCE.bits | Self::PIXEL_SHADER_RESOURCE.bits |
            Self::INDIRECT_ARGUMENT.bits | Self::COPY_SOURCE.bits;
        const PRESENT = 0;
    }
}

#[derive(Debug)]
pub struct TransitionBarrier<'a, A: Api> {
    pub resource: &'a A::Resource,
    pub states: Range<NativeResourceStates>,
}

// Rust gets confused about the impl requirements for `A`
impl<A: Api> Clone for TransitionBarrier<'_, A> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource,
            states: self.states.clone(),
        }
    }
}

impl<A: Api> TransitionBarrier<'_, A> {
    /// The barrier that undoes this one.
    pub fn reversed(&self) -> Self {
        Self {
            resource: self.resource,
            states: self.states.end..self.states.start,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResourceKind {
    Buffer,
    Texture1D,
    Texture2D,
    Texture3D,
    Unknown,
}

/// Size and format metadata, always read from the native object.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResourceDescription {
    pub kind: ResourceKind,
    /// Raw `DXGI_FORMAT` value. Zero for buffers.
    pub format: u32,
    /// Width in texels, or size in bytes for buffers.
    pub width: u64,
    pub height: u32,
    pub depth_or_array_layers: u16,
    pub mip_level_count: u16,
}

/// A native resource paired with the state the engine believes it is in.
///
/// The state is a hint supplied by the caller, not something queried from
/// the driver.
#[derive(Debug)]
pub struct Resource<A: Api> {
    pub raw: A::Resource,
    pub state: ResourceState,
    pub description: ResourceDescription,
}

// Rust gets confused about the impl requirements for `A`
impl<A: Api> Clone for Resource<A> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            state: self.state,
            description: self.description,
        }
    }
}

impl<A: Api> Resource<A> {
    pub fn new(raw: A::Resource, state: ResourceState) -> Self {
        let description = raw.describe();
        Self {
            raw,
            state,
            description,
        }
    }
}

/// Locally unique identifier of the GPU adapter backing a device.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Luid {
    pub low_part: u32,
    pub high_part: i32,
}

impl Luid {
    /// Native memory layout of the identifier: `LowPart` then `HighPart`.
    pub fn to_bytes(self) -> [u8; 8] {
        let mut bytes = [0; 8];
        bytes[..4].copy_from_slice(&self.low_part.to_ne_bytes());
        bytes[4..].copy_from_slice(&self.high_part.to_ne_bytes());
        bytes
    }
}

impl fmt::Display for Luid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:08x}-{:08x}", self.high_part as u32, self.low_part)
    }
}

#[derive(Clone, Debug)]
pub struct InterpolatorDescriptor<'a> {
    pub label: Label<'a>,
    pub output_width: u32,
    pub output_height: u32,
}

/// The engine-agnostic interpolation algorithm driven by the adapter.
pub trait Engine<A: Api> {
    /// Builds the engine state. `params` is the bag the host handed to the
    /// adapter, untouched.
    fn create(
        &mut self,
        context: &DispatchContext<'_, A>,
        params: &mut ParameterMap,
    ) -> Result<(), Status>;

    fn destroy(&mut self);

    /// Records the interpolation work into `context.active_command_list()`.
    fn dispatch(
        &mut self,
        context: &DispatchContext<'_, A>,
        params: &mut ParameterMap,
    ) -> Result<(), Status>;
}

/// Sets up the engine-facing backend interface for a device.
pub trait InterfaceInitializer<A: Api> {
    fn initialize(
        &mut self,
        device: &A::Device,
        max_contexts: u32,
        params: &mut ParameterMap,
    ) -> Result<(), Status>;
}

#[test]
fn test_state_raw_values_round_trip() {
    for &state in ResourceState::ALL.iter() {
        assert_eq!(ResourceState::from_raw(state as u32), Some(state));
    }
    assert_eq!(ResourceState::from_raw(0), None);
    assert_eq!(ResourceState::from_raw(1 << 12), None);
}

#[test]
fn test_luid_bytes_follow_native_layout() {
    let luid = Luid {
        low_part: 0x0403_0201,
        high_part: 0x0807_0605,
    };
    let bytes = luid.to_bytes();
    if cfg!(target_endian = "little") {
        assert_eq!(bytes, [1, 2, 3, 4, 5, 6, 7, 8]);
    }
    assert_eq!(&bytes[..4], &0x0403_0201u32.to_ne_bytes());
}

#[test]
fn test_dispatch_error_codes() {
    let engine = DispatchError::Engine(Status(0x8000_1234));
    assert_eq!(engine.code(), 0x8000_1234);
    assert_eq!(status_code(&Err(engine)), 0x8000_1234);
    assert_eq!(status_code(&Ok(())), 0);
    assert_eq!(
        DispatchError::Device(DeviceError::OutOfMemory).code(),
        Status::OUT_OF_MEMORY.code()
    );
}
