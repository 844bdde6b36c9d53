// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Small pure helpers shared by the models and the UI.

pub mod color;
pub mod geometry;
pub mod time;
