// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spread pipeline — border sampling, pair classification, compositing and the
// sequence cursor that ties them together.

pub mod border;
pub mod classifier;
pub mod fuser;
pub mod merger;
pub mod page;
