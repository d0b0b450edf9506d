// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use std::thread::JoinHandle;
use tracing::info;
use waves_chain_exports::{ChainCommand, ChainManager};
use waves_channel::sender::WavesSender;

pub(crate) struct ChainManagerImpl {
    pub(crate) chain_thread: Option<(WavesSender<ChainCommand>, JoinHandle<()>)>,
}

impl ChainManager for ChainManagerImpl {
    fn stop(&mut self) {
        info!("stopping chain worker...");
        if let Some((tx, join_handle)) = self.chain_thread.take() {
            // the in-flight command finishes before the stop is honored
            let _ = tx.send(ChainCommand::Stop);
            drop(tx);
            join_handle
                .join()
                .expect("chain worker thread panicked on try to join");
        }
        info!("chain worker stopped");
    }
}
