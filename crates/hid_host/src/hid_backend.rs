//! Backend HID real sobre `hidapi`.

use hidapi::{HidApi, HidDevice};
use std::ffi::CString;
use telemetry_core::{DeviceError, DevicePath, HidBackend, HidHandle, InterfaceDescriptor};

pub struct HidApiBackend {
    api: HidApi,
}

impl HidApiBackend {
    pub fn new() -> Result<Self, DeviceError> {
        let api = HidApi::new().map_err(|e| DeviceError::Enumerate(e.to_string()))?;
        Ok(Self { api })
    }
}

/// Handle aberto; `hidapi` fecha o dispositivo no `drop`.
pub struct HidApiHandle {
    device: HidDevice,
    path: DevicePath,
}

impl HidHandle for HidApiHandle {
    fn write(&mut self, data: &[u8]) -> Result<usize, DeviceError> {
        self.device.write(data).map_err(|e| DeviceError::Write {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

impl HidBackend for HidApiBackend {
    type Handle = HidApiHandle;

    fn enumerate(&mut self) -> Result<Vec<InterfaceDescriptor>, DeviceError> {
        // A lista do HidApi é um snapshot; reenumera a cada resolução
        self.api
            .refresh_devices()
            .map_err(|e| DeviceError::Enumerate(e.to_string()))?;

        Ok(self
            .api
            .device_list()
            .map(|info| InterfaceDescriptor {
                vendor_id: info.vendor_id(),
                product_id: info.product_id(),
                path: DevicePath::new(info.path().to_bytes()),
                usage_page: info.usage_page(),
                usage: info.usage(),
                interface_number: info.interface_number(),
            })
            .collect())
    }

    fn open(&self, path: &DevicePath) -> Result<HidApiHandle, DeviceError> {
        let c_path = CString::new(path.as_bytes())
            .map_err(|_| DeviceError::InvalidPath(path.clone()))?;
        let device = self.api.open_path(&c_path).map_err(|e| DeviceError::Open {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(HidApiHandle {
            device,
            path: path.clone(),
        })
    }
}
