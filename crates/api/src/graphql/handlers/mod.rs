// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod challenges;
pub mod comments;
pub mod ctfs;
pub mod sessions;
pub mod teams;
pub mod users;
