// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod bot;
pub mod expenses;
pub mod exporter;
pub mod serve;
pub mod stats;
