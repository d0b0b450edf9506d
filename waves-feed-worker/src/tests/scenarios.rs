// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use super::tools::FeedFixture;
use crate::start_feed_worker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use waves_feed_exports::{BlockInfoRecord, FeedCursor, FeedError, FeedRecord, RollbackRecord};
use waves_hash::Hash;
use waves_models::block_id::BlockId;
use waves_state_exports::StateStore;

const BATCH: usize = 64;
const WAIT: Duration = Duration::from_millis(500);

fn shape(records: &[FeedRecord]) -> Vec<(&'static str, u64)> {
    records
        .iter()
        .map(|record| match record {
            FeedRecord::BlockInfo(r) => ("block", r.height),
            FeedRecord::DataEntries(r) => ("data", r.height),
            FeedRecord::Rollback(r) => ("rollback", r.height),
        })
        .collect()
}

#[test]
fn fresh_subscription_streams_the_whole_chain() {
    let fixture = FeedFixture::with_chain(4);
    let (_manager, _sink, controller) =
        start_feed_worker(fixture.config(), fixture.store.clone_box()).unwrap();

    let mut session = controller.subscribe(0, None).unwrap();
    let records = session.next(BATCH, WAIT).unwrap();
    assert_eq!(
        shape(&records),
        vec![
            ("block", 1),
            ("data", 1),
            ("block", 2),
            ("data", 2),
            ("block", 3),
            ("data", 3),
            ("block", 4),
            ("data", 4),
        ]
    );
    // data entries come through in write order with their payload
    if let FeedRecord::DataEntries(entries) = &records[3] {
        assert_eq!(entries.data_entries.len(), 1);
        assert_eq!(entries.data_entries[0].key, "height_2");
    } else {
        panic!("expected a data entries record");
    }
}

#[test]
fn s6_resume_after_crash_redelivers_uncommitted_heights() {
    // the process died mid-application of block 105: only 104 committed
    let fixture = FeedFixture::with_chain(104);
    FeedCursor {
        last_delivered_height: 100,
        last_delivered_block_id: fixture.block(100).id,
    }
    .store(&fixture.cursor_path())
    .unwrap();

    let (_manager, _sink, controller) =
        start_feed_worker(fixture.config(), fixture.store.clone_box()).unwrap();
    let mut session = controller
        .subscribe(100, Some(fixture.block(100).id))
        .unwrap();
    let records = session.next(BATCH, WAIT).unwrap();
    assert_eq!(
        shape(&records),
        vec![
            ("block", 101),
            ("data", 101),
            ("block", 102),
            ("data", 102),
            ("block", 103),
            ("data", 103),
            ("block", 104),
            ("data", 104),
        ]
    );
}

#[test]
fn redelivery_after_restart_is_byte_identical() {
    let fixture = FeedFixture::with_chain(6);
    let first_run = {
        let (_manager, _sink, controller) =
            start_feed_worker(fixture.config(), fixture.store.clone_box()).unwrap();
        let mut session = controller.subscribe(2, Some(fixture.block(2).id)).unwrap();
        // delivered but never acked before the crash
        session.next(BATCH, WAIT).unwrap()
    };

    let (_manager, _sink, controller) =
        start_feed_worker(fixture.config(), fixture.store.clone_box()).unwrap();
    let mut session = controller.subscribe(2, Some(fixture.block(2).id)).unwrap();
    let second_run = session.next(BATCH, WAIT).unwrap();

    let encode = |records: &[FeedRecord]| {
        let mut buffer = Vec::new();
        for record in records {
            record.encode_framed(&mut buffer).unwrap();
        }
        buffer
    };
    assert_eq!(encode(&first_run), encode(&second_run));
}

#[test]
fn stale_fork_subscription_rewinds_first() {
    let fixture = FeedFixture::with_chain(6);
    // the feed had acknowledged up to 3 on the canonical chain
    FeedCursor {
        last_delivered_height: 3,
        last_delivered_block_id: fixture.block(3).id,
    }
    .store(&fixture.cursor_path())
    .unwrap();

    let (_manager, _sink, controller) =
        start_feed_worker(fixture.config(), fixture.store.clone_box()).unwrap();
    // the subscriber claims a block 5 we never produced
    let mut session = controller
        .subscribe(5, Some(BlockId(Hash::compute_from(b"other-fork"))))
        .unwrap();
    let records = session.next(BATCH, WAIT).unwrap();
    assert_eq!(
        shape(&records),
        vec![
            ("rollback", 4),
            ("rollback", 3),
            ("block", 4),
            ("data", 4),
            ("block", 5),
            ("data", 5),
            ("block", 6),
            ("data", 6),
        ]
    );
}

#[test]
fn ack_persists_the_cursor() {
    let fixture = FeedFixture::with_chain(3);
    let (_manager, _sink, controller) =
        start_feed_worker(fixture.config(), fixture.store.clone_box()).unwrap();
    let mut session = controller.subscribe(0, None).unwrap();
    let _ = session.next(BATCH, WAIT).unwrap();

    session.ack(2, fixture.block(2).id).unwrap();
    assert_eq!(
        FeedCursor::load(&fixture.cursor_path()).unwrap(),
        Some(FeedCursor {
            last_delivered_height: 2,
            last_delivered_block_id: fixture.block(2).id,
        })
    );

    // acking a non-canonical pair must not move the cursor
    let bogus = session.ack(3, BlockId(Hash::compute_from(b"not-canonical")));
    assert!(matches!(bogus, Err(FeedError::BadAck(_))));
    assert_eq!(
        FeedCursor::load(&fixture.cursor_path())
            .unwrap()
            .unwrap()
            .last_delivered_height,
        2
    );
}

#[test]
fn next_blocks_until_a_publisher_arrives() {
    let fixture = FeedFixture::with_chain(1);
    let (_manager, sink, controller) =
        start_feed_worker(fixture.config(), fixture.store.clone_box()).unwrap();
    let mut session = controller.subscribe(1, Some(fixture.block(1).id)).unwrap();

    // nothing committed past genesis yet
    assert_eq!(session.next(BATCH, Duration::from_millis(50)), Err(FeedError::Cancelled));

    let publisher = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        sink.publish(vec![FeedRecord::Rollback(RollbackRecord { height: 1 })])
            .unwrap();
    });
    let records = session.next(BATCH, Duration::from_secs(2)).unwrap();
    assert_eq!(shape(&records), vec![("rollback", 1)]);
    publisher.join().unwrap();
}

#[test]
fn publisher_is_back_pressured_past_the_ack_window() {
    let fixture = FeedFixture::with_chain(4);
    let (_manager, sink, controller) =
        start_feed_worker(fixture.config_with_window(2), fixture.store.clone_box()).unwrap();
    let mut session = controller.subscribe(1, Some(fixture.block(1).id)).unwrap();
    // the rebuilt buffer already sits 3 blocks past the last ack (height 1)

    let finished = Arc::new(AtomicBool::new(false));
    let finished_in_thread = finished.clone();
    let block5 = BlockInfoRecord {
        height: 5,
        vrf: vec![0; 32],
        block_id: vec![1; 32],
        block_header: None,
    };
    let publisher = std::thread::spawn(move || {
        sink.publish(vec![FeedRecord::BlockInfo(block5)]).unwrap();
        finished_in_thread.store(true, Ordering::SeqCst);
    });

    std::thread::sleep(Duration::from_millis(200));
    assert!(
        !finished.load(Ordering::SeqCst),
        "publish must block while the window is exceeded"
    );

    // drain and acknowledge: the window opens and the publisher completes
    let _ = session.next(BATCH, WAIT).unwrap();
    session.ack(4, fixture.block(4).id).unwrap();
    publisher.join().unwrap();
    assert!(finished.load(Ordering::SeqCst));
}

#[test]
fn a_new_subscription_invalidates_the_old_session() {
    let fixture = FeedFixture::with_chain(3);
    let (_manager, _sink, controller) =
        start_feed_worker(fixture.config(), fixture.store.clone_box()).unwrap();
    let mut first = controller.subscribe(0, None).unwrap();
    let _second = controller.subscribe(0, None).unwrap();

    assert_eq!(
        first.next(BATCH, WAIT),
        Err(FeedError::AlreadySubscribed)
    );
}

#[test]
fn subscribing_past_the_tip_is_rejected() {
    let fixture = FeedFixture::with_chain(3);
    let (_manager, _sink, controller) =
        start_feed_worker(fixture.config(), fixture.store.clone_box()).unwrap();
    assert!(matches!(
        controller.subscribe(10, None),
        Err(FeedError::UnknownResumePoint(_))
    ));
}

#[test]
fn stop_wakes_blocked_calls() {
    let fixture = FeedFixture::with_chain(1);
    let (mut manager, _sink, controller) =
        start_feed_worker(fixture.config(), fixture.store.clone_box()).unwrap();
    let mut session = controller.subscribe(1, Some(fixture.block(1).id)).unwrap();

    let waiter = std::thread::spawn(move || session.next(BATCH, Duration::from_secs(5)));
    std::thread::sleep(Duration::from_millis(100));
    manager.stop();
    assert_eq!(waiter.join().unwrap(), Err(FeedError::Disconnected));
}
