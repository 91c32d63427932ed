// Copyright 2026 the Linear IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conformance tests for `linear_ir` live in `tests/`.
