pub(super) mod dxgi;
