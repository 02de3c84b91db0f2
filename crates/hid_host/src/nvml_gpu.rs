//! NVIDIA GPU via NVML (nvidia-ml).
//!
//! Carrega `nvml.dll` dinamicamente — funciona com qualquer driver NVIDIA.
//! Sem GPU NVIDIA? `try_new()` retorna `None` e o módulo é desativado.

use nvml_wrapper::Nvml;
use tracing::{debug, info};

/// Monitor de GPU NVIDIA via NVML.
pub struct NvmlMonitor {
    nvml: Nvml,
    count: u32,
}

impl NvmlMonitor {
    /// Tenta inicializar NVML. Retorna `None` se não houver GPU NVIDIA.
    pub fn try_new() -> Option<Self> {
        match Nvml::init() {
            Ok(nvml) => {
                let count = nvml.device_count().unwrap_or(0);
                if count > 0 {
                    if let Ok(dev) = nvml.device_by_index(0) {
                        let name = dev.name().unwrap_or_else(|_| "Unknown".into());
                        info!("✓ NVML: {name} ({count} GPU(s))");
                    } else {
                        info!("✓ NVML: {count} GPU(s) NVIDIA");
                    }
                    Some(Self { nvml, count })
                } else {
                    debug!("NVML init OK mas nenhuma GPU encontrada");
                    None
                }
            }
            Err(e) => {
                debug!("NVML não disponível: {e}");
                None
            }
        }
    }

    /// Maior utilização (%) entre todas as GPUs NVIDIA.
    pub fn max_load(&self) -> i32 {
        (0..self.count)
            .filter_map(|index| self.nvml.device_by_index(index).ok())
            .filter_map(|device| device.utilization_rates().ok())
            .map(|util| util.gpu as i32)
            .max()
            .unwrap_or(0)
    }
}
