//! Fonte de métricas do host.
//!
//! A implementação real (sysinfo, NVML, WMI, Core Audio) vive no binário.
//! Backends indisponíveis retornam 0, que não é erro.

use crate::types::{FieldSelection, MetricsSnapshot};
use chrono::NaiveDateTime;

pub trait TelemetrySource {
    /// Uso de CPU. Pode bloquear durante a janela de medição.
    fn cpu_percent(&mut self) -> i32;
    fn ram_percent(&mut self) -> i32;
    fn disk_percent(&mut self) -> i32;
    fn gpu_percent(&mut self) -> i32;
    fn volume_percent(&mut self) -> i32;
    /// Data/hora local.
    fn now(&mut self) -> NaiveDateTime;

    /// Coleta uma amostra, consultando só as métricas ativadas.
    fn sample(&mut self, fields: &FieldSelection) -> MetricsSnapshot {
        MetricsSnapshot {
            cpu_percent: if fields.cpu { self.cpu_percent() } else { 0 },
            ram_percent: if fields.ram { self.ram_percent() } else { 0 },
            disk_percent: if fields.disk { self.disk_percent() } else { 0 },
            gpu_percent: if fields.gpu { self.gpu_percent() } else { 0 },
            volume_percent: if fields.volume { self.volume_percent() } else { 0 },
            timestamp: self.now(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FixedSource;
    use super::*;

    #[test]
    fn sample_reads_enabled_metrics() {
        let mut source = FixedSource::new(45, 78, 12, 60, 30);
        let snap = source.sample(&FieldSelection::default());
        assert_eq!(snap, source.snapshot);
        assert_eq!(source.queries, 5);
    }

    #[test]
    fn disabled_metrics_are_not_queried() {
        let mut source = FixedSource::new(45, 78, 12, 60, 30);
        let fields = FieldSelection {
            gpu: false,
            volume: false,
            ..Default::default()
        };
        let snap = source.sample(&fields);
        assert_eq!(snap.gpu_percent, 0);
        assert_eq!(snap.volume_percent, 0);
        assert_eq!(snap.cpu_percent, 45);
        assert_eq!(source.queries, 3);
    }
}
