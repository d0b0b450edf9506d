// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! UTX pool worker: admission, fee-density ordering, block candidate
//! selection and housekeeping behind a single write thread.

mod controller_impl;
mod pool;
mod types;
mod worker;

pub use worker::start_utx_controller;

#[cfg(test)]
mod tests;
