//! # HID Host
//!
//! Coleta métricas de hardware e envia para um display via raw HID.
//! A interface gravável é descoberta por escrita de teste e mantida em
//! cache, revalidada a cada `recheck_interval` ciclos.
//!
//! ## Uso
//! ```bash
//! hid_host                        # Normal
//! hid_host --config outro.toml    # Config fora do diretório do executável
//! hid_host --test-pattern         # Envia 0,1,2,… para depurar o firmware
//! hid_host --list                 # Lista as interfaces do VID/PID, sem escrever
//! ```

mod hid_backend;
mod monitor;
#[cfg(windows)]
pub(crate) mod nvml_gpu;
#[cfg(windows)]
pub(crate) mod volume;
#[cfg(windows)]
pub(crate) mod wmi_sensors;

use hid_backend::HidApiBackend;
use monitor::SystemMonitor;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use telemetry_core::config::HostConfig;
use telemetry_core::resolver::is_input_interface;
use telemetry_core::{DeviceIdentity, HidBackend, HostSettings, PollingLoop, RunMode};
use tracing::{error, info, warn};

fn main() -> ExitCode {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let test_mode = args
        .iter()
        .any(|a| a == "--test-pattern" || a.eq_ignore_ascii_case("test"));
    let list_mode = args.iter().any(|a| a == "--list");

    // ── Carregar config ──
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .unwrap_or_else(HostConfig::default_path);

    let settings = match HostConfig::load_or_create(&config_path).and_then(HostConfig::into_settings)
    {
        Ok(settings) => settings,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // ── HID ──
    let mut backend = match HidApiBackend::new() {
        Ok(backend) => backend,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if list_mode {
        list_interfaces(&mut backend, &settings.identity);
        return ExitCode::SUCCESS;
    }

    // ── Ctrl+C ──
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!("Não foi possível instalar handler de Ctrl+C: {e}");
    }

    // ── Hardware Monitor ──
    let monitor = SystemMonitor::new();
    info!("Hardware monitor inicializado");

    let mode = if test_mode {
        RunMode::TestPattern
    } else {
        RunMode::Telemetry
    };
    print_banner(&settings, mode);

    // ── Loop principal ──
    PollingLoop::new(monitor, backend, settings)
        .with_mode(mode)
        .run(&shutdown);

    ExitCode::SUCCESS
}

fn print_banner(settings: &HostSettings, mode: RunMode) {
    println!();
    println!("══════════════════════════════════════════════");
    println!("   ⚡ HID HOST – ATIVO (Rust)");
    println!("══════════════════════════════════════════════");
    println!("  Dispositivo: {}", settings.identity);
    println!("  Relatório:   {} bytes", settings.report_size);
    println!("  Intervalo:   {}s", settings.interval.as_secs());
    println!("  Revalidação: a cada {} ciclos", settings.recheck_interval);
    if mode == RunMode::TestPattern {
        println!("  Modo:        TESTE (0, 1, 2, …)");
    }
    println!("══════════════════════════════════════════════");
    println!();
}

/// Diagnóstico: mostra as interfaces do VID/PID sem escrever em nenhuma.
fn list_interfaces<B: HidBackend>(backend: &mut B, identity: &DeviceIdentity) {
    let interfaces = match backend.enumerate() {
        Ok(all) => all
            .into_iter()
            .filter(|iface| iface.matches(identity))
            .collect::<Vec<_>>(),
        Err(e) => {
            error!("{e}");
            return;
        }
    };

    println!("{} interface(s) para {identity}:", interfaces.len());
    for (i, iface) in interfaces.iter().enumerate() {
        println!("  {i}: {}", iface.path);
        println!(
            "      Usage Page: 0x{:04X}, Usage: 0x{:02X}, Interface: {}{}",
            iface.usage_page,
            iface.usage,
            iface.interface_number,
            if is_input_interface(&iface.path) {
                "  (teclado/mouse, ignorada)"
            } else {
                ""
            }
        );
    }
}
