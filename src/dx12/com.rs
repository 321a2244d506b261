use std::{
    ffi::c_void,
    fmt,
    ops::Deref,
    ptr::NonNull,
};
use winapi::{um::unknwnbase::IUnknown, Interface};

/// Counted reference to a COM object.
#[repr(transparent)]
pub struct ComPtr<T: Interface>(*mut T);

impl<T: Interface> ComPtr<T> {
    /// Wraps `raw`, adding a reference the wrapper releases on drop.
    pub unsafe fn from_raw(raw: *mut T) -> Self {
        if !raw.is_null() {
            (*(raw as *mut IUnknown)).AddRef();
        }
        ComPtr(raw)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn as_mut_ptr(&self) -> *mut T {
        self.0
    }

    pub unsafe fn as_unknown(&self) -> &IUnknown {
        debug_assert!(!self.is_null());
        &*(self.0 as *mut IUnknown)
    }
}

impl<T: Interface> crate::RawHandle for ComPtr<T> {
    unsafe fn from_raw(raw: NonNull<c_void>) -> Self {
        ComPtr::from_raw(raw.as_ptr() as *mut T)
    }

    fn as_raw(&self) -> *mut c_void {
        self.0 as *mut c_void
    }
}

impl<T: Interface> Clone for ComPtr<T> {
    fn clone(&self) -> Self {
        debug_assert!(!self.is_null());
        unsafe {
            self.as_unknown().AddRef();
        }
        ComPtr(self.0)
    }
}

impl<T: Interface> Drop for ComPtr<T> {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe {
                self.as_unknown().Release();
            }
        }
    }
}

impl<T: Interface> Deref for ComPtr<T> {
    type Target = T;
    fn deref(&self) -> &T {
        debug_assert!(!self.is_null());
        unsafe { &*self.0 }
    }
}

impl<T: Interface> fmt::Debug for ComPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ComPtr( ptr: {:?} )", self.0)
    }
}

impl<T: Interface> PartialEq for ComPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Interface> Eq for ComPtr<T> {}
