//! Descoberta da interface HID gravável.
//!
//! Um mesmo VID/PID expõe várias interfaces (teclado, mouse, controle e a
//! interface raw de dados). Os metadados não distinguem a certa, então
//! cada candidata recebe uma escrita de teste e a primeira que aceitar
//! vence. Interfaces de teclado/mouse nunca são testadas: escrever nelas
//! pode injetar teclas.

use crate::hid::{HidBackend, HidHandle};
use crate::types::{DeviceIdentity, DevicePath, InterfaceDescriptor};
use tracing::{debug, info, warn};

/// Marcadores de interfaces de entrada no caminho (sem diferenciar caixa).
pub const INPUT_INTERFACE_MARKERS: &[&str] = &["kbd", "keyboard", "mouse"];

/// `true` se o caminho parece de teclado ou mouse.
pub fn is_input_interface(path: &DevicePath) -> bool {
    INPUT_INTERFACE_MARKERS
        .iter()
        .any(|marker| path.contains_ignore_case(marker))
}

/// Interfaces do VID/PID que podem ser testadas, em ordem de enumeração.
pub fn candidate_interfaces<B: HidBackend>(
    backend: &mut B,
    identity: &DeviceIdentity,
) -> Vec<InterfaceDescriptor> {
    let all = match backend.enumerate() {
        Ok(all) => all,
        Err(e) => {
            warn!("{e}");
            return Vec::new();
        }
    };

    all.into_iter()
        .filter(|iface| iface.matches(identity))
        .filter(|iface| {
            let skip = is_input_interface(&iface.path);
            if skip {
                debug!("Ignorando {} (teclado/mouse)", iface.path);
            }
            !skip
        })
        .collect()
}

/// Testa as candidatas com `probe` e retorna a primeira gravável.
///
/// `None` é esperado (display desconectado). Erros de abrir/escrever em uma
/// candidata só a desqualificam.
pub fn resolve_writeable_path<B: HidBackend>(
    backend: &mut B,
    identity: &DeviceIdentity,
    probe: &[u8],
) -> Option<DevicePath> {
    debug!("Procurando interface gravável para {identity}");

    let candidates = candidate_interfaces(backend, identity);
    if candidates.is_empty() {
        warn!("Nenhuma interface HID encontrada para {identity}. Está conectado?");
        return None;
    }

    for iface in &candidates {
        debug!(
            "Testando {} (usage_page=0x{:04X} usage=0x{:02X} interface={})",
            iface.path, iface.usage_page, iface.usage, iface.interface_number
        );
        if probe_write(backend, &iface.path, probe) {
            info!("✓ Interface gravável: {}", iface.path);
            return Some(iface.path.clone());
        }
    }

    warn!(
        "Nenhuma das {} interfaces de {identity} aceitou escrita",
        candidates.len()
    );
    None
}

/// Abre, escreve uma vez e fecha (no `drop`), qualquer que seja o resultado.
fn probe_write<B: HidBackend>(backend: &B, path: &DevicePath, probe: &[u8]) -> bool {
    let mut handle = match backend.open(path) {
        Ok(handle) => handle,
        Err(e) => {
            debug!("  → não gravável: {e}");
            return false;
        }
    };

    match handle.write(probe) {
        Ok(n) if n > 0 => {
            debug!("  → gravável ({n} bytes)");
            true
        }
        Ok(_) => {
            debug!("  → não gravável (0 bytes escritos)");
            false
        }
        Err(e) => {
            debug!("  → não gravável: {e}");
            false
        }
    }
}
