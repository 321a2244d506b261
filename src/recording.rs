use crate::{
    keys, Api, CommandList as _, DeviceError, DispatchError, ParameterMap, RawHandle as _,
};

/// Who opened the command list for the current dispatch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Recording {
    /// The caller began recording and will close the list itself.
    Borrowed,
    /// The adapter resets the list on entry and closes it on exit.
    AdapterOpened,
}

impl Recording {
    pub fn from_params(params: &ParameterMap) -> Self {
        if params.get_uint_or_default(keys::IS_RECORDING, 0) != 0 {
            Self::Borrowed
        } else {
            Self::AdapterOpened
        }
    }
}

/// Recording session of one dispatch.
///
/// Dropping the guard closes the list if the adapter opened it, so every
/// exit path leaves the list submittable.
pub(crate) struct RecordingGuard<'a, A: Api> {
    list: &'a A::CommandList,
    queue: Option<A::CommandQueue>,
    recording: Recording,
    open: bool,
}

impl<'a, A: Api> RecordingGuard<'a, A> {
    /// # Safety
    ///
    /// The queue and allocator pointers in `params`, if any, must be live
    /// objects of the matching native type.
    pub unsafe fn begin(
        list: &'a A::CommandList,
        params: &ParameterMap,
    ) -> Result<Self, DispatchError> {
        let recording = Recording::from_params(params);
        let mut queue = None;

        if recording == Recording::AdapterOpened {
            queue = params
                .get_void_pointer(keys::COMMAND_QUEUE)
                .map(|raw| A::CommandQueue::from_raw(raw));
            let allocator = match params.get_void_pointer(keys::COMMAND_ALLOCATOR) {
                Some(raw) => A::CommandAllocator::from_raw(raw),
                None => {
                    log::error!("Command list is not recording and no allocator was provided");
                    return Err(DispatchError::MissingCommandAllocator);
                }
            };
            list.reset(&allocator)?;
            log::debug!("Opened command list with {:?} (queue {:?})", allocator, queue);
        }

        Ok(Self {
            list,
            queue,
            recording,
            open: recording == Recording::AdapterOpened,
        })
    }

    pub fn recording(&self) -> Recording {
        self.recording
    }

    pub fn list(&self) -> &'a A::CommandList {
        self.list
    }

    pub fn queue(&self) -> Option<&A::CommandQueue> {
        self.queue.as_ref()
    }

    /// Ends the session, reporting a failure to close.
    pub fn end(mut self) -> Result<(), DeviceError> {
        self.close()
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        log::debug!("Closing command list");
        unsafe { self.list.close() }
    }
}

impl<A: Api> Drop for RecordingGuard<'_, A> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::error!("Failed to close command list: {}", err);
        }
    }
}
