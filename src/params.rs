//! Host parameter bag.
//!
//! The host hands every call a string keyed bag of loosely typed values.
//! Values keep the type they were stored with; typed getters fail closed
//! (return `None` or the default) when the stored type differs.

use std::{ffi::c_void, ptr::NonNull};

use fxhash::FxHashMap;

/// Key names shared with the host.
pub mod keys {
    /// Non-zero when the caller already opened the command list.
    pub const IS_RECORDING: &str = "DLSSG.IsRecording";
    /// Written by the adapter before every dispatch.
    pub const FLUSH_REQUIRED: &str = "DLSSG.FlushRequired";
    /// `ID3D12CommandQueue` the command list will be submitted to.
    pub const COMMAND_QUEUE: &str = "DLSSG.CmdQueue";
    /// `ID3D12CommandAllocator` used when the adapter opens the list itself.
    pub const COMMAND_ALLOCATOR: &str = "DLSSG.CmdAlloc";
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    UInt(u32),
    Int(i32),
    ULong(u64),
    Float(f32),
    Double(f64),
    Pointer(*mut c_void),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match *self {
            Self::UInt(_) => "uint",
            Self::Int(_) => "int",
            Self::ULong(_) => "ulong",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Pointer(_) => "pointer",
        }
    }
}

/// Insertion ordered bag of named values.
#[derive(Clone, Debug, Default)]
pub struct ParameterMap {
    entries: Vec<(String, Value)>,
    lookup: FxHashMap<String, usize>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lookup.get(key).map(|&index| self.entries[index].1)
    }

    /// Stores `value` under `key`, replacing any previous value in place.
    pub fn set(&mut self, key: &str, value: Value) {
        match self.lookup.get(key) {
            Some(&index) => self.entries[index].1 = value,
            None => {
                self.lookup.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), value));
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.lookup.remove(key)?;
        let (_, value) = self.entries.remove(index);
        for &(ref name, _) in self.entries[index..].iter() {
            if let Some(slot) = self.lookup.get_mut(name.as_str()) {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> + '_ {
        self.entries.iter().map(|&(ref key, value)| (key.as_str(), value))
    }

    pub fn set4(&mut self, key: &str, value: u32) {
        self.set(key, Value::UInt(value));
    }

    pub fn set_int(&mut self, key: &str, value: i32) {
        self.set(key, Value::Int(value));
    }

    pub fn set_ulong(&mut self, key: &str, value: u64) {
        self.set(key, Value::ULong(value));
    }

    pub fn set_float(&mut self, key: &str, value: f32) {
        self.set(key, Value::Float(value));
    }

    pub fn set_double(&mut self, key: &str, value: f64) {
        self.set(key, Value::Double(value));
    }

    pub fn set_void_pointer(&mut self, key: &str, value: *mut c_void) {
        self.set(key, Value::Pointer(value));
    }

    pub fn get_uint(&self, key: &str) -> Option<u32> {
        match self.typed(key, "uint")? {
            Value::UInt(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_uint_or_default(&self, key: &str, default: u32) -> u32 {
        self.get_uint(key).unwrap_or(default)
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.typed(key, "int")? {
            Value::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_ulong(&self, key: &str) -> Option<u64> {
        match self.typed(key, "ulong")? {
            Value::ULong(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.typed(key, "float")? {
            Value::Float(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_double(&self, key: &str) -> Option<f64> {
        match self.typed(key, "double")? {
            Value::Double(value) => Some(value),
            _ => None,
        }
    }

    /// Null pointers read back as absent.
    pub fn get_void_pointer(&self, key: &str) -> Option<NonNull<c_void>> {
        match self.typed(key, "pointer")? {
            Value::Pointer(ptr) => NonNull::new(ptr),
            _ => None,
        }
    }

    fn typed(&self, key: &str, expected: &'static str) -> Option<Value> {
        let value = self.get(key)?;
        if value.type_name() != expected {
            log::warn!(
                "Parameter {:?} holds a {} value, {} was requested",
                key,
                value.type_name(),
                expected
            );
            return None;
        }
        Some(value)
    }
}
