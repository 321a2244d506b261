use crate::{
    copy, keys,
    recording::{Recording, RecordingGuard},
    Api, Device as _, DispatchError, Engine, InterfaceInitializer, InterpolatorDescriptor, Luid,
    ParameterMap, RawHandle as _, Resource, ResourceState, Status,
};

/// Backend capabilities handed to the engine for the duration of one call.
///
/// The active command list lives here rather than on the interpolator, so it
/// can never outlive the dispatch that opened it.
pub struct DispatchContext<'a, A: Api> {
    device: &'a A::Device,
    luid: Luid,
    command_list: Option<&'a A::CommandList>,
    command_queue: Option<&'a A::CommandQueue>,
}

impl<'a, A: Api> DispatchContext<'a, A> {
    pub fn device(&self) -> &'a A::Device {
        self.device
    }

    /// The list currently being recorded into. `None` outside of a dispatch.
    pub fn active_command_list(&self) -> Option<&'a A::CommandList> {
        self.command_list
    }

    /// The queue the host named for submission, when the adapter opened the list.
    pub fn command_queue(&self) -> Option<&'a A::CommandQueue> {
        self.command_queue
    }

    pub fn active_adapter_luid(&self) -> [u8; 8] {
        self.luid.to_bytes()
    }

    pub fn initialize_backend_interface(
        &self,
        initializer: &mut dyn InterfaceInitializer<A>,
        max_contexts: u32,
        params: &mut ParameterMap,
    ) -> Result<(), Status> {
        initializer.initialize(self.device, max_contexts, params)
    }

    /// Copies the whole of `source` into `destination` on `list`, leaving
    /// both resources in the states they came in with.
    ///
    /// # Safety
    ///
    /// `list` must be recording, and no other command may change the state of
    /// either resource while the copy is being recorded.
    pub unsafe fn copy_resource(
        &self,
        list: &A::CommandList,
        destination: &Resource<A>,
        source: &Resource<A>,
    ) {
        copy::copy_resource(list, destination, source)
    }

    /// Resolves the resource stored under `name`, tagged with `state`.
    ///
    /// Missing, null and non-pointer entries are an omitted optional input,
    /// not an error.
    ///
    /// # Safety
    ///
    /// A pointer stored under `name` must be a live native resource.
    pub unsafe fn load_resource(
        &self,
        params: &ParameterMap,
        name: &str,
        state: ResourceState,
    ) -> Option<Resource<A>> {
        let raw = params.get_void_pointer(name)?;
        let resource = Resource::new(A::Resource::from_raw(raw), state);
        log::trace!(
            "Loaded {:?} as {:?} in state {:?}",
            name,
            resource.description,
            state
        );
        Some(resource)
    }
}

/// Frame interpolation backend for one native device.
pub struct FrameInterpolator<A: Api, E: Engine<A>> {
    engine: E,
    device: A::Device,
    luid: Luid,
    output_width: u32,
    output_height: u32,
}

impl<A: Api, E: Engine<A>> FrameInterpolator<A, E> {
    /// Takes a counted reference to `device` and creates the engine.
    ///
    /// If the engine fails to create, the reference is released again and
    /// the engine is not destroyed.
    pub fn new(
        device: &A::Device,
        desc: &InterpolatorDescriptor,
        mut engine: E,
        params: &mut ParameterMap,
    ) -> Result<Self, Status> {
        let device = device.clone();
        let luid = device.adapter_luid();
        {
            let context = DispatchContext::<A> {
                device: &device,
                luid,
                command_list: None,
                command_queue: None,
            };
            engine.create(&context, params)?;
        }
        log::debug!(
            "Created interpolator {:?} ({}x{}) on adapter {}",
            desc.label,
            desc.output_width,
            desc.output_height,
            luid
        );

        Ok(Self {
            engine,
            device,
            luid,
            output_width: desc.output_width,
            output_height: desc.output_height,
        })
    }

    pub fn device(&self) -> &A::Device {
        &self.device
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn output_extent(&self) -> (u32, u32) {
        (self.output_width, self.output_height)
    }

    pub fn active_adapter_luid(&self) -> [u8; 8] {
        self.luid.to_bytes()
    }

    pub fn initialize_backend_interface(
        &self,
        initializer: &mut dyn InterfaceInitializer<A>,
        max_contexts: u32,
        params: &mut ParameterMap,
    ) -> Result<(), Status> {
        initializer.initialize(&self.device, max_contexts, params)
    }

    /// Resolves the resource stored under `name`, tagged with `state`.
    ///
    /// # Safety
    ///
    /// A pointer stored under `name` must be a live native resource.
    pub unsafe fn load_resource(
        &self,
        params: &ParameterMap,
        name: &str,
        state: ResourceState,
    ) -> Option<Resource<A>> {
        self.idle_context().load_resource(params, name, state)
    }

    /// # Safety
    ///
    /// See [`DispatchContext::copy_resource`].
    pub unsafe fn copy_resource(
        &self,
        list: &A::CommandList,
        destination: &Resource<A>,
        source: &Resource<A>,
    ) {
        self.idle_context().copy_resource(list, destination, source)
    }

    /// Records one interpolation into `list`.
    ///
    /// Unless `DLSSG.IsRecording` is non-zero, the list is reset with the
    /// allocator stored under `DLSSG.CmdAlloc` and closed again before
    /// returning, whether or not the engine succeeded. Engine failures are
    /// returned verbatim.
    ///
    /// # Safety
    ///
    /// `list` must be a live command list, already recording if
    /// `DLSSG.IsRecording` is set. Pointers stored in `params` must be live
    /// objects of the type their key implies.
    pub unsafe fn dispatch(
        &mut self,
        list: &A::CommandList,
        params: &mut ParameterMap,
    ) -> Result<(), DispatchError> {
        params.set4(keys::FLUSH_REQUIRED, 0);

        let guard = RecordingGuard::<A>::begin(list, params)?;
        if guard.recording() == Recording::Borrowed {
            log::trace!("Recording into caller owned command list");
        }

        let result = {
            let context = DispatchContext::<A> {
                device: &self.device,
                luid: self.luid,
                command_list: Some(guard.list()),
                command_queue: guard.queue(),
            };
            self.engine.dispatch(&context, params)
        };

        let closed = guard.end();
        if let Err(ref err) = closed {
            log::error!("Failed to close command list: {}", err);
        }
        if let Err(status) = result {
            log::warn!("Interpolation dispatch failed: {}", status);
            return Err(DispatchError::Engine(status));
        }
        closed.map_err(DispatchError::from)
    }

    fn idle_context(&self) -> DispatchContext<'_, A> {
        DispatchContext {
            device: &self.device,
            luid: self.luid,
            command_list: None,
            command_queue: None,
        }
    }
}

impl<A: Api, E: Engine<A>> Drop for FrameInterpolator<A, E> {
    fn drop(&mut self) {
        // The engine may still reference the device while tearing down.
        self.engine.destroy();
        log::debug!("Destroyed interpolator on adapter {}", self.luid);
    }
}
