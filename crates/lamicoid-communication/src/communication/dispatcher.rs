//! Network dispatcher
//!
//! Sends a print file to an engraver at an IP address, addressed by device
//! model. One transfer attempt per call; there is no retry.

use std::ffi::CString;
use std::net::IpAddr;

use lamicoid_core::{DeviceModel, DispatchError};

use crate::engine::PrintEngine;

/// Sends print files through the engine's transfer call.
#[derive(Debug)]
pub struct NetworkDispatcher<'e, E: PrintEngine> {
    engine: &'e E,
}

impl<'e, E: PrintEngine> NetworkDispatcher<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    /// Send `payload`; `false` on any failure.
    pub fn send(&self, model: DeviceModel, payload: &[u8], ip_address: &str) -> bool {
        self.try_send(model, payload, ip_address).is_ok()
    }

    /// Send `payload`, reporting why a transfer did not happen.
    pub fn try_send(
        &self,
        model: DeviceModel,
        payload: &[u8],
        ip_address: &str,
    ) -> Result<(), DispatchError> {
        let address = ip_address.trim();
        let ip: IpAddr = address.parse().map_err(|_| {
            tracing::error!("Refusing to send to invalid address '{}'", ip_address);
            DispatchError::InvalidAddress {
                address: ip_address.to_string(),
            }
        })?;

        if payload.is_empty() {
            tracing::error!("Refusing to send an empty print file to {}", ip);
            return Err(DispatchError::EmptyPayload);
        }

        // Parsed addresses never contain NUL.
        let c_address = CString::new(ip.to_string()).map_err(|_| DispatchError::InvalidAddress {
            address: ip_address.to_string(),
        })?;

        tracing::info!("Sending {} bytes to {} at {}", payload.len(), model, ip);
        if self.engine.send_file(model, payload, &c_address) {
            tracing::info!("Print file delivered to {} at {}", model, ip);
            Ok(())
        } else {
            tracing::error!("Transfer to {} at {} failed", model, ip);
            Err(DispatchError::TransferFailed {
                model: model.to_string(),
                address: ip.to_string(),
            })
        }
    }
}
