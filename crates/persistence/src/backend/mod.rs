// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database backend-specific code.
//!
//! Only what cannot be expressed in Diesel DSL lives here: connection
//! initialization, migrations, PRAGMA configuration and
//! `last_insert_rowid()`. Queries and mutations live in `queries/` and
//! `mutations/`.

pub mod sqlite;
