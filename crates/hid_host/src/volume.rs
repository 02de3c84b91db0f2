//! Volume mestre do dispositivo de saída padrão (Core Audio).
//!
//! `IAudioEndpointVolume::GetMasterVolumeLevelScalar` retorna 0.0–1.0.
//! COM é inicializado uma vez por [`MasterVolume`] e liberado no `drop`.

use windows::Win32::Media::Audio::Endpoints::IAudioEndpointVolume;
use windows::Win32::Media::Audio::{IMMDeviceEnumerator, MMDeviceEnumerator, eConsole, eRender};
use windows::Win32::System::Com::{
    CLSCTX_ALL, COINIT_MULTITHREADED, CoCreateInstance, CoInitializeEx, CoUninitialize,
};

/// Inicialização COM da thread atual, pareada com `CoUninitialize`.
struct ComGuard {
    initialized: bool,
}

impl ComGuard {
    fn new() -> Self {
        // S_OK/S_FALSE contam uma referência; RPC_E_CHANGED_MODE não
        let initialized = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) }.is_ok();
        Self { initialized }
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.initialized {
            unsafe { CoUninitialize() };
        }
    }
}

/// Leitor do volume mestre. Deve ser usado na thread que o criou.
pub struct MasterVolume {
    // Declarado antes do guard: é liberado antes do CoUninitialize
    enumerator: IMMDeviceEnumerator,
    _com: ComGuard,
}

impl MasterVolume {
    pub fn new() -> windows::core::Result<Self> {
        let com = ComGuard::new();
        let enumerator: IMMDeviceEnumerator =
            unsafe { CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)? };
        Ok(Self {
            enumerator,
            _com: com,
        })
    }

    /// Volume atual em %. O endpoint padrão é consultado a cada chamada,
    /// então trocar a saída de áudio não exige reiniciar.
    pub fn percent(&self) -> windows::core::Result<i32> {
        unsafe {
            let device = self.enumerator.GetDefaultAudioEndpoint(eRender, eConsole)?;
            let endpoint: IAudioEndpointVolume = device.Activate(CLSCTX_ALL, None)?;
            let level = endpoint.GetMasterVolumeLevelScalar()?;
            Ok((level * 100.0).round() as i32)
        }
    }
}
