// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Recipe builders shared by the integration tests

#![allow(dead_code)]

#[path = "../../src/fixtures.rs"]
mod fixtures;

pub use fixtures::*;
