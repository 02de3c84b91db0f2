//! Loop principal: amostra → relatório → caminho → envio → espera.
//!
//! Sequencial, uma thread. Handles HID nunca sobrevivem a um ciclo e o
//! único estado entre ciclos é o [`PathCache`]. Nenhum erro de dispositivo
//! derruba o loop: sem display, o ciclo é pulado e o próximo tenta de novo.

use crate::cache::PathCache;
use crate::config::HostSettings;
use crate::hid::HidBackend;
use crate::protocol::{encode_report, test_pattern};
use crate::resolver::resolve_writeable_path;
use crate::source::TelemetrySource;
use crate::transmitter::{self, SendOutcome};
use crate::types::{DevicePath, Report};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Granularidade com que a espera verifica o pedido de parada.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// O que cada ciclo envia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Métricas do host no layout do firmware.
    #[default]
    Telemetry,
    /// Padrão `0, 1, 2, …` para depurar o firmware.
    TestPattern,
}

/// Resultado de um ciclo, para logs e testes.
#[derive(Debug)]
pub enum CycleOutcome {
    Sent { path: DevicePath, bytes: usize },
    SendFailed { path: DevicePath, outcome: SendOutcome },
    NoDevice,
    EncodeFailed,
}

pub struct PollingLoop<S, B> {
    source: S,
    backend: B,
    settings: HostSettings,
    mode: RunMode,
    cache: PathCache,
}

impl<S: TelemetrySource, B: HidBackend> PollingLoop<S, B> {
    pub fn new(source: S, backend: B, settings: HostSettings) -> Self {
        Self {
            source,
            backend,
            settings,
            mode: RunMode::default(),
            cache: PathCache::new(),
        }
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn cache(&self) -> &PathCache {
        &self.cache
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Roda até `shutdown` ser sinalizado. A parada é observada entre
    /// ciclos e durante a espera, nunca no meio de uma escrita.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        let interval = self.settings.interval.max(Duration::from_secs(1));
        info!(
            "Loop iniciado: {} a cada {}s, revalidação a cada {} ciclos",
            self.settings.identity,
            interval.as_secs(),
            self.settings.recheck_interval
        );

        while !shutdown.load(Ordering::SeqCst) {
            self.run_cycle();
            sleep_unless_shutdown(interval, shutdown);
        }

        info!("Parada solicitada, encerrando loop");
    }

    /// Um ciclo completo, sem a espera.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let Some(report) = self.build_report() else {
            return CycleOutcome::EncodeFailed;
        };

        let identity = self.settings.identity;
        let backend = &mut self.backend;
        let path = self
            .cache
            .get_or_resolve(self.settings.recheck_interval, || {
                resolve_writeable_path(backend, &identity, report.as_bytes())
            });

        let Some(path) = path else {
            warn!("Nenhum HID gravável para {identity}. Está conectado?");
            return CycleOutcome::NoDevice;
        };

        match transmitter::send(&self.backend, &path, &report) {
            SendOutcome::Sent(bytes) => {
                debug!("→ {bytes} bytes para {path}");
                CycleOutcome::Sent { path, bytes }
            }
            outcome => {
                match &outcome {
                    SendOutcome::Rejected => warn!("Escrita em {path} retornou 0 bytes"),
                    SendOutcome::Failed(e) => warn!("{e}"),
                    SendOutcome::Sent(_) => {}
                }
                // Próximo ciclo revalida em vez de confiar no caminho
                self.cache.invalidate();
                CycleOutcome::SendFailed { path, outcome }
            }
        }
    }

    fn build_report(&mut self) -> Option<Report> {
        match self.mode {
            RunMode::TestPattern => Some(test_pattern(self.settings.report_size)),
            RunMode::Telemetry => {
                let snapshot = self.source.sample(&self.settings.fields);
                match encode_report(&snapshot, &self.settings.fields, self.settings.report_size) {
                    Ok(report) => {
                        info!(
                            "CPU {}% | RAM {}% | GPU {}% | Disk {}% | Vol {}% | {}",
                            snapshot.cpu_percent,
                            snapshot.ram_percent,
                            snapshot.gpu_percent,
                            snapshot.disk_percent,
                            snapshot.volume_percent,
                            snapshot.timestamp.format("%d/%m/%y %H:%M"),
                        );
                        Some(report)
                    }
                    Err(e) => {
                        error!("Erro ao codificar relatório: {e}");
                        None
                    }
                }
            }
        }
    }
}

/// Dorme `total` em fatias, retornando cedo se `shutdown` for sinalizado.
///
/// Sem prazo representável (`total` enorme), dorme até a parada.
fn sleep_unless_shutdown(total: Duration, shutdown: &AtomicBool) {
    let deadline = Instant::now().checked_add(total);
    loop {
        if shutdown.load(Ordering::SeqCst) {
            return;
        }
        let slice = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return;
                }
                (deadline - now).min(SHUTDOWN_POLL)
            }
            None => SHUTDOWN_POLL,
        };
        std::thread::sleep(slice);
    }
}
