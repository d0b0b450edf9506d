// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

mod scenarios;
