//! Hardware Monitor – fonte de métricas com fallback chain.
//!
//! - `sysinfo` — CPU, RAM, disco do sistema (sempre disponível)
//! - `nvml-wrapper` — GPU NVIDIA (Windows)
//! - WMI `GPUEngine` — GPU genérica (Windows, fallback do NVML)
//! - Core Audio — volume mestre (Windows)
//!
//! Fora do Windows GPU e volume retornam 0. Cada fonte indisponível gera
//! um único `warn!`.

use chrono::{Local, NaiveDateTime};
use std::time::Duration;
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};
use telemetry_core::TelemetrySource;
use tracing::{debug, info, warn};

#[cfg(windows)]
use {
    crate::nvml_gpu::NvmlMonitor,
    crate::volume::MasterVolume,
    crate::wmi_sensors,
    wmi::{COMLibrary, WMIConnection},
};

/// Janela de medição do uso de CPU.
const CPU_SAMPLE_WINDOW: Duration = Duration::from_secs(1);

/// Monitor de hardware principal.
pub struct SystemMonitor {
    sys: System,
    disks: Disks,
    /// Já avisou que a GPU não tem backend
    gpu_warned: bool,
    /// Já avisou que o volume não está disponível
    volume_warned: bool,

    // ── Fontes avançadas (Windows) ──
    #[cfg(windows)]
    nvml: Option<NvmlMonitor>,
    #[cfg(windows)]
    wmi_cimv2: Option<WMIConnection>,
    #[cfg(windows)]
    volume: Result<MasterVolume, String>,
}

impl SystemMonitor {
    /// Cria um novo monitor e detecta fontes de sensores disponíveis.
    pub fn new() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
                .with_memory(MemoryRefreshKind::nothing().with_ram()),
        );

        #[cfg(windows)]
        let nvml = NvmlMonitor::try_new();

        #[cfg(windows)]
        let wmi_cimv2 = COMLibrary::new()
            .ok()
            .and_then(|com| WMIConnection::new(com).ok())
            .filter(|wmi| {
                let ok = wmi_sensors::gpu_counters_available(wmi);
                if ok {
                    info!("✓ WMI GPUEngine: disponível");
                }
                ok
            });

        #[cfg(windows)]
        let volume = MasterVolume::new().map_err(|e| e.to_string());

        let disks = Disks::new_with_refreshed_list();
        match system_disk(&disks) {
            Some(disk) => info!("Disco monitorado: {}", disk.mount_point().display()),
            None => warn!("✗ Nenhum disco encontrado, uso de disco será 0"),
        }

        Self {
            sys,
            disks,
            gpu_warned: false,
            volume_warned: false,
            #[cfg(windows)]
            nvml,
            #[cfg(windows)]
            wmi_cimv2,
            #[cfg(windows)]
            volume,
        }
    }

    #[cfg(windows)]
    fn gpu_from_backends(&self) -> Option<i32> {
        if let Some(ref nvml) = self.nvml {
            return Some(nvml.max_load());
        }
        self.wmi_cimv2.as_ref().map(wmi_sensors::query_gpu_load)
    }

    #[cfg(not(windows))]
    fn gpu_from_backends(&self) -> Option<i32> {
        None
    }

    #[cfg(windows)]
    fn volume_from_backend(&self) -> Result<i32, String> {
        match &self.volume {
            Ok(volume) => volume.percent().map_err(|e| e.to_string()),
            Err(e) => Err(e.clone()),
        }
    }

    #[cfg(not(windows))]
    fn volume_from_backend(&self) -> Result<i32, String> {
        Err("API de áudio não suportada nesta plataforma".into())
    }
}

impl TelemetrySource for SystemMonitor {
    /// Bloqueia por [`CPU_SAMPLE_WINDOW`]: o uso é o delta entre dois refreshes.
    fn cpu_percent(&mut self) -> i32 {
        self.sys.refresh_cpu_usage();
        std::thread::sleep(CPU_SAMPLE_WINDOW.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
        self.sys.refresh_cpu_usage();
        self.sys.global_cpu_usage() as i32
    }

    fn ram_percent(&mut self) -> i32 {
        self.sys.refresh_memory();
        let total = self.sys.total_memory() as f64;
        let used = self.sys.used_memory() as f64;
        if total > 0.0 {
            (used / total * 100.0) as i32
        } else {
            0
        }
    }

    fn disk_percent(&mut self) -> i32 {
        self.disks.refresh(true);
        let Some(disk) = system_disk(&self.disks) else {
            return 0;
        };
        let total = disk.total_space() as f64;
        let used = total - disk.available_space() as f64;
        if total > 0.0 {
            (used / total * 100.0) as i32
        } else {
            0
        }
    }

    fn gpu_percent(&mut self) -> i32 {
        match self.gpu_from_backends() {
            Some(load) => load,
            None => {
                if !self.gpu_warned {
                    warn!("✗ GPU: nenhum backend suportado, enviando 0");
                    self.gpu_warned = true;
                }
                0
            }
        }
    }

    fn volume_percent(&mut self) -> i32 {
        match self.volume_from_backend() {
            Ok(v) => v,
            Err(e) => {
                if !self.volume_warned {
                    warn!("✗ Volume indisponível ({e}), enviando 0");
                    self.volume_warned = true;
                } else {
                    debug!("Volume: {e}");
                }
                0
            }
        }
    }

    fn now(&mut self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

/// Disco do sistema (`/` ou `C:\`), ou o primeiro listado.
fn system_disk(disks: &Disks) -> Option<&sysinfo::Disk> {
    disks
        .iter()
        .find(|d| {
            let mount = d.mount_point().to_string_lossy();
            mount == "/" || mount.eq_ignore_ascii_case("C:\\")
        })
        .or_else(|| disks.iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_and_disk_are_percentages() {
        let mut monitor = SystemMonitor::new();
        assert!((0..=100).contains(&monitor.ram_percent()));
        assert!((0..=100).contains(&monitor.disk_percent()));
    }

    #[test]
    fn now_is_local_time() {
        let mut monitor = SystemMonitor::new();
        let drift = Local::now().naive_local() - monitor.now();
        assert!(drift.num_seconds().abs() < 5);
    }
}
