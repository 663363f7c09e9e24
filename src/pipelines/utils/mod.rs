use crate::core::ModelOptions;
use candle_core::Device;

/// Loads a device for the classifier.
///
/// `Some(i)` insists on CUDA device `i`; `None` uses CUDA device 0 when it is
/// available and falls back to CPU otherwise.
pub fn load_device_with(index: Option<usize>) -> anyhow::Result<Device> {
    match index {
        Some(i) => Ok(Device::new_cuda(i)?),
        None => Ok(Device::cuda_if_available(0)?),
    }
}

/// Request for a specific device, used by pipeline builders.
#[derive(Clone, Default)]
pub enum DeviceRequest {
    /// Use CUDA if available, otherwise CPU.
    #[default]
    Default,
    /// Force CPU even if CUDA is available.
    Cpu,
    /// Select a specific CUDA device by index.
    Cuda(usize),
    /// Provide an already constructed device.
    Explicit(Device),
}

impl DeviceRequest {
    /// Resolve the request into an actual [`Device`].
    pub fn resolve(self) -> anyhow::Result<Device> {
        match self {
            DeviceRequest::Default => load_device_with(None),
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => load_device_with(Some(i)),
            DeviceRequest::Explicit(d) => Ok(d),
        }
    }
}

/// Device selection methods shared by pipeline builders.
pub trait DeviceSelectable: Sized {
    fn device_request_mut(&mut self) -> &mut DeviceRequest;

    /// Force the pipeline to run on CPU.
    fn cpu(mut self) -> Self {
        *self.device_request_mut() = DeviceRequest::Cpu;
        self
    }

    /// Select a specific CUDA device by index.
    fn cuda_device(mut self, index: usize) -> Self {
        *self.device_request_mut() = DeviceRequest::Cuda(index);
        self
    }

    /// Provide an explicit [`Device`].
    fn device(mut self, device: Device) -> Self {
        *self.device_request_mut() = DeviceRequest::Explicit(device);
        self
    }
}

/// Cache key combining model options and device location.
pub fn build_cache_key<O: ModelOptions>(options: &O, device: &Device) -> String {
    format!("{}-{:?}", options.cache_key(), device.location())
}
