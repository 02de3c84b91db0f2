//! Cache do caminho gravável com revalidação periódica.
//!
//! Enumerar e testar interfaces é caro e escreve em dispositivos, então o
//! caminho confirmado é reutilizado por `recheck_interval` ciclos antes de
//! ser revalidado. Caminhos HID ficam estáveis enquanto o dispositivo está
//! conectado; se ele sair, o envio falha e o cache é invalidado.

use crate::types::DevicePath;
use tracing::debug;

/// Estado do cache.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CacheState {
    /// Precisa resolver no próximo uso.
    #[default]
    Empty,
    /// Caminho confirmado há `hits` ciclos.
    Cached { path: DevicePath, hits: u32 },
}

/// Um único caminho em cache, pertencente ao loop de envio.
#[derive(Debug, Default)]
pub struct PathCache {
    state: CacheState,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CacheState {
        &self.state
    }

    pub fn cached_path(&self) -> Option<&DevicePath> {
        match &self.state {
            CacheState::Cached { path, .. } => Some(path),
            CacheState::Empty => None,
        }
    }

    /// Retorna o caminho em cache ou chama `resolve`.
    ///
    /// O caminho é servido enquanto `hits < recheck_interval`; depois disso
    /// (ou com o cache vazio) `resolve` roda exatamente uma vez. Sucesso
    /// reinicia o contador, `None` esvazia o cache.
    pub fn get_or_resolve<F>(&mut self, recheck_interval: u32, resolve: F) -> Option<DevicePath>
    where
        F: FnOnce() -> Option<DevicePath>,
    {
        if let CacheState::Cached { path, hits } = &mut self.state {
            if *hits < recheck_interval {
                *hits += 1;
                return Some(path.clone());
            }
            debug!("Revalidando {path} após {hits} ciclos");
        }

        match resolve() {
            Some(path) => {
                self.state = CacheState::Cached {
                    path: path.clone(),
                    hits: 0,
                };
                Some(path)
            }
            None => {
                self.state = CacheState::Empty;
                None
            }
        }
    }

    /// Força resolução no próximo ciclo.
    pub fn invalidate(&mut self) {
        self.state = CacheState::Empty;
    }
}
