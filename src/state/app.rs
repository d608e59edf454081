use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::datagram_service::DatagramSender;

/// Shared state handed to every HTTP handler.
///
/// Holds no storage handle: the front end only talks to the receiver
/// through the datagram channel.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sender: DatagramSender,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let sender = DatagramSender::new(config.datagram_addr, config.max_datagram_size);
        Self {
            config: Arc::new(config),
            sender,
        }
    }
}
