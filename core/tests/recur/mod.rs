// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Rule iterator integration tests.

mod bounds;
mod resume;
mod scenarios;
