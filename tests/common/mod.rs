//! Recording backend used by the integration tests.
//!
//! Every native object is an `Rc`, so the strong count doubles as the COM
//! reference count, and every resource tracks the state its barriers put it in.

use std::{
    cell::{Cell, RefCell},
    ffi::c_void,
    ptr::NonNull,
    rc::{Rc, Weak},
};

use interp_hal::{
    self as hal, conv, DispatchContext, Luid, NativeResourceStates, ParameterMap, RawHandle,
    ResourceState, Status,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone, Debug)]
pub struct Api;

impl hal::Api for Api {
    type Device = Device;
    type CommandList = CommandList;
    type CommandAllocator = Handle;
    type CommandQueue = Handle;
    type Resource = Resource;
}

#[derive(Debug)]
pub struct DeviceShared {
    pub luid: Luid,
}

#[derive(Clone, Debug)]
pub struct Device(pub Rc<DeviceShared>);

impl Device {
    pub fn new(luid: Luid) -> Self {
        Device(Rc::new(DeviceShared { luid }))
    }

    /// Number of references held on the device, the test's own included.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl hal::Device<Api> for Device {
    fn adapter_luid(&self) -> Luid {
        self.0.luid
    }
}

/// Allocator or queue, identified by name.
#[derive(Debug)]
pub struct Handle(pub Rc<&'static str>);

impl Handle {
    pub fn new(name: &'static str) -> Self {
        Handle(Rc::new(name))
    }
}

impl RawHandle for Handle {
    unsafe fn from_raw(raw: NonNull<c_void>) -> Self {
        let raw = raw.as_ptr() as *const &'static str;
        Rc::increment_strong_count(raw);
        Handle(Rc::from_raw(raw))
    }

    fn as_raw(&self) -> *mut c_void {
        Rc::as_ptr(&self.0) as *mut c_void
    }
}

#[derive(Debug)]
pub struct ResourceShared {
    pub name: &'static str,
    pub description: hal::ResourceDescription,
    pub state: Cell<NativeResourceStates>,
}

#[derive(Clone, Debug)]
pub struct Resource(pub Rc<ResourceShared>);

impl Resource {
    pub fn texture(name: &'static str, width: u64, height: u32, state: ResourceState) -> Self {
        Resource(Rc::new(ResourceShared {
            name,
            description: hal::ResourceDescription {
                kind: hal::ResourceKind::Texture2D,
                format: 28,
                width,
                height,
                depth_or_array_layers: 1,
                mip_level_count: 1,
            },
            state: Cell::new(conv::map_resource_state(state)),
        }))
    }

    pub fn state(&self) -> NativeResourceStates {
        self.0.state.get()
    }

    pub fn with_state(&self, state: ResourceState) -> hal::Resource<Api> {
        hal::Resource::new(self.clone(), state)
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl RawHandle for Resource {
    unsafe fn from_raw(raw: NonNull<c_void>) -> Self {
        let raw = raw.as_ptr() as *const ResourceShared;
        Rc::increment_strong_count(raw);
        Resource(Rc::from_raw(raw))
    }

    fn as_raw(&self) -> *mut c_void {
        Rc::as_ptr(&self.0) as *mut c_void
    }
}

impl hal::NativeResource for Resource {
    fn describe(&self) -> hal::ResourceDescription {
        self.0.description
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Reset(&'static str),
    Close,
    Barrier(Vec<(&'static str, NativeResourceStates, NativeResourceStates)>),
    Copy {
        dst: &'static str,
        src: &'static str,
    },
}

#[derive(Debug, Default)]
pub struct CommandList {
    pub commands: RefCell<Vec<Command>>,
    pub recording: Cell<bool>,
    pub fail_reset: Cell<bool>,
    pub fail_close: Cell<bool>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    /// A list the caller already began recording into.
    pub fn open() -> Self {
        let list = Self::default();
        list.recording.set(true);
        list
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.borrow().clone()
    }

    pub fn barrier_calls(&self) -> Vec<Command> {
        self.commands()
            .into_iter()
            .filter(|command| matches!(*command, Command::Barrier(_)))
            .collect()
    }

    pub fn copy_calls(&self) -> usize {
        self.commands
            .borrow()
            .iter()
            .filter(|command| matches!(**command, Command::Copy { .. }))
            .count()
    }

    fn push(&self, command: Command) {
        self.commands.borrow_mut().push(command);
    }
}

impl hal::CommandList<Api> for CommandList {
    unsafe fn reset(&self, allocator: &Handle) -> Result<(), hal::DeviceError> {
        if self.fail_reset.get() {
            return Err(hal::DeviceError::OutOfMemory);
        }
        assert!(!self.recording.get(), "reset while recording");
        self.recording.set(true);
        self.push(Command::Reset(*allocator.0));
        Ok(())
    }

    unsafe fn close(&self) -> Result<(), hal::DeviceError> {
        assert!(self.recording.get(), "close while not recording");
        self.recording.set(false);
        self.push(Command::Close);
        if self.fail_close.get() {
            return Err(hal::DeviceError::Lost);
        }
        Ok(())
    }

    unsafe fn resource_barrier(&self, barriers: &[hal::TransitionBarrier<'_, Api>]) {
        assert!(self.recording.get(), "barrier on a closed list");
        let mut batch = Vec::new();
        for barrier in barriers {
            let resource = &barrier.resource.0;
            assert_ne!(barrier.states.start, barrier.states.end, "redundant barrier");
            assert_eq!(resource.state.get(), barrier.states.start, "wrong before state");
            resource.state.set(barrier.states.end);
            batch.push((resource.name, barrier.states.start, barrier.states.end));
        }
        self.push(Command::Barrier(batch));
    }

    unsafe fn copy_resource(&self, dst: &Resource, src: &Resource) {
        assert!(self.recording.get(), "copy on a closed list");
        assert_eq!(dst.state(), NativeResourceStates::COPY_DEST);
        assert_eq!(src.state(), NativeResourceStates::COPY_SOURCE);
        self.push(Command::Copy {
            dst: dst.0.name,
            src: src.0.name,
        });
    }
}

type DispatchFn =
    Box<dyn FnMut(&DispatchContext<'_, Api>, &mut ParameterMap) -> Result<(), Status>>;

fn succeed(_context: &DispatchContext<'_, Api>, _params: &mut ParameterMap) -> Result<(), Status> {
    Ok(())
}

/// Engine whose dispatch runs a test supplied closure.
pub struct ScriptedEngine {
    pub events: Rc<RefCell<Vec<String>>>,
    pub create_status: Result<(), Status>,
    pub on_dispatch: DispatchFn,
    /// Observes the device without holding a reference on it.
    pub device: Option<Weak<DeviceShared>>,
}

impl ScriptedEngine {
    pub fn new(events: &Rc<RefCell<Vec<String>>>) -> Self {
        ScriptedEngine {
            events: Rc::clone(events),
            create_status: Ok(()),
            on_dispatch: Box::new(succeed),
            device: None,
        }
    }

    pub fn on_dispatch<F>(mut self, f: F) -> Self
    where
        F: FnMut(&DispatchContext<'_, Api>, &mut ParameterMap) -> Result<(), Status> + 'static,
    {
        self.on_dispatch = Box::new(f);
        self
    }
}

impl hal::Engine<Api> for ScriptedEngine {
    fn create(
        &mut self,
        context: &DispatchContext<'_, Api>,
        _params: &mut ParameterMap,
    ) -> Result<(), Status> {
        self.events.borrow_mut().push(format!(
            "create list={}",
            context.active_command_list().is_some()
        ));
        self.device = Some(Rc::downgrade(&context.device().0));
        self.create_status
    }

    fn destroy(&mut self) {
        let refs = self.device.take().map_or(0, |device| device.strong_count());
        self.events.borrow_mut().push(format!("destroy refs={}", refs));
    }

    fn dispatch(
        &mut self,
        context: &DispatchContext<'_, Api>,
        params: &mut ParameterMap,
    ) -> Result<(), Status> {
        self.events.borrow_mut().push(format!(
            "dispatch flush={:?}",
            params.get_uint(hal::keys::FLUSH_REQUIRED)
        ));
        (self.on_dispatch)(context, params)
    }
}

pub const DESC: hal::InterpolatorDescriptor<'static> = hal::InterpolatorDescriptor {
    label: Some("test"),
    output_width: 2560,
    output_height: 1440,
};

pub fn luid() -> Luid {
    Luid {
        low_part: 0x1234_5678,
        high_part: 0x9a,
    }
}

/// Parameters for a dispatch the adapter has to open and close itself.
pub fn adapter_opened_params(allocator: &Handle, queue: &Handle) -> ParameterMap {
    let mut params = ParameterMap::new();
    params.set4(hal::keys::IS_RECORDING, 0);
    params.set_void_pointer(hal::keys::COMMAND_ALLOCATOR, allocator.as_raw());
    params.set_void_pointer(hal::keys::COMMAND_QUEUE, queue.as_raw());
    params
}
