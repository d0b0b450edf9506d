// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::controller_impl::{FeedControllerImpl, FeedManagerImpl, FeedSinkImpl};
use crate::state::{FeedShared, FeedState};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use waves_feed_exports::{FeedConfig, FeedController, FeedError, FeedManager, FeedSink};
use waves_state_exports::StateStore;

/// Start the L2 feed.
///
/// # Arguments
/// * `config`: feed configuration, including the durable cursor path
/// * `store`: the state store committed blocks are rebuilt from
///
/// # Returns
/// * the manager used to stop the feed
/// * the sink handed to the applier
/// * the controller handed to the subscriber surface
#[allow(clippy::type_complexity)]
pub fn start_feed_worker(
    config: FeedConfig,
    store: Box<dyn StateStore>,
) -> Result<(Box<dyn FeedManager>, Box<dyn FeedSink>, Box<dyn FeedController>), FeedError> {
    let state = FeedState::new(config, store)?;
    let shared = Arc::new(FeedShared {
        mutex: Mutex::new(state),
        condvar: Condvar::new(),
    });
    let manager = FeedManagerImpl {
        shared: shared.clone(),
    };
    let sink = FeedSinkImpl {
        shared: shared.clone(),
    };
    let controller = FeedControllerImpl { shared };
    Ok((Box::new(manager), Box::new(sink), Box::new(controller)))
}
