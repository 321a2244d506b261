use std::borrow::Cow;

use winapi::shared::winerror;

pub(crate) trait HResult<O> {
    fn into_result(self) -> Result<O, Cow<'static, str>>;
    fn into_device_result(self, description: &str) -> Result<O, crate::DeviceError>;
}

impl HResult<()> for i32 {
    fn into_result(self) -> Result<(), Cow<'static, str>> {
        if self >= 0 {
            return Ok(());
        }
        let description = match self {
            winerror::E_UNEXPECTED => "unexpected",
            winerror::E_NOTIMPL => "not implemented",
            winerror::E_OUTOFMEMORY => "out of memory",
            winerror::E_INVALIDARG => "invalid argument",
            winerror::E_FAIL => "failure",
            _ => return Err(Cow::Owned(format!("0x{:X}", self as u32))),
        };
        Err(Cow::Borrowed(description))
    }

    fn into_device_result(self, description: &str) -> Result<(), crate::DeviceError> {
        self.into_result().map_err(|err| {
            log::error!("{} failed: {}", description, err);
            match self {
                winerror::E_OUTOFMEMORY => crate::DeviceError::OutOfMemory,
                winerror::E_INVALIDARG | winerror::E_FAIL => crate::DeviceError::Unexpected,
                _ => crate::DeviceError::Lost,
            }
        })
    }
}
