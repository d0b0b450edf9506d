// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! # Chain worker scenarios
//!
//! End-to-end tests of the applier over a real UTX pool and memory state
//! store: linear application, arrival-order independence, reorganizations
//! with their feed emission pattern, the rollback depth bound and the admin
//! paths.

mod tools;
