// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! Protocol constants and configuration loading.

mod constants;
mod waves_settings;

pub use constants::*;
pub use waves_settings::build_waves_settings;
