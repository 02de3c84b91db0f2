//! Uso de GPU via contadores de desempenho WMI (fallback quando NVML não
//! está disponível: AMD, Intel, iGPU).
//!
//! Fonte: `root\CIMv2` → `Win32_PerfFormattedData_GPUPerformanceCounters_GPUEngine`.
//! Cada instância é um motor de um processo; só as `engtype_3D` contam.

use serde::{Deserialize, Deserializer};
use tracing::debug;
use wmi::WMIConnection;

// ──────────────────────────────────────────────
// WMI Query structs
// ──────────────────────────────────────────────

#[derive(Deserialize, Debug)]
#[serde(rename = "Win32_PerfFormattedData_GPUPerformanceCounters_GPUEngine")]
#[serde(rename_all = "PascalCase")]
struct GpuEngine {
    name: Option<String>,
    #[serde(default, deserialize_with = "uint64_counter")]
    utilization_percentage: u64,
}

/// WMI entrega `uint64` como string; aceita as duas formas.
fn uint64_counter<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    Ok(match Raw::deserialize(d)? {
        Raw::Number(n) => n,
        Raw::Text(s) => s.trim().parse().unwrap_or(0),
    })
}

// ──────────────────────────────────────────────
// API pública
// ──────────────────────────────────────────────

/// `true` se a classe de contadores de GPU existe nesta máquina.
pub fn gpu_counters_available(wmi: &WMIConnection) -> bool {
    wmi.raw_query::<GpuEngine>(
        "SELECT Name, UtilizationPercentage FROM Win32_PerfFormattedData_GPUPerformanceCounters_GPUEngine",
    )
    .map(|engines| !engines.is_empty())
    .unwrap_or(false)
}

/// Maior utilização (%) entre os motores 3D.
pub fn query_gpu_load(wmi: &WMIConnection) -> i32 {
    match wmi.raw_query::<GpuEngine>(
        "SELECT Name, UtilizationPercentage FROM Win32_PerfFormattedData_GPUPerformanceCounters_GPUEngine",
    ) {
        Ok(engines) => engines
            .iter()
            .filter(|e| {
                e.name
                    .as_deref()
                    .is_some_and(|n| n.contains("engtype_3D"))
            })
            .map(|e| e.utilization_percentage)
            .max()
            .unwrap_or(0)
            .min(100) as i32,
        Err(e) => {
            debug!("WMI GPUEngine: {e}");
            0
        }
    }
}
