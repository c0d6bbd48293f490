use crate::models::AppData;
use std::{
    path::PathBuf,
    sync::{Arc, atomic::AtomicBool},
};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    pub authenticated: Arc<AtomicBool>,
    pub passphrase: Arc<String>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData, passphrase: String) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            authenticated: Arc::new(AtomicBool::new(false)),
            passphrase: Arc::new(passphrase),
        }
    }
}
