//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `softwares` table (catalog entries; array-valued fields stored as JSON text)
/// - `comparison_groups` table (named comparison sets)
/// - `comparison_group_softwares` join table (one (group_id, software_id) per row)
/// - `comparison_analyses` table (one analysis text per group)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Software catalog
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS softwares (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    icon TEXT NOT NULL DEFAULT '',
    license TEXT NOT NULL DEFAULT '',
    systems TEXT NOT NULL DEFAULT '[]', -- JSON array of strings
    website TEXT NOT NULL DEFAULT '',
    pros TEXT NOT NULL DEFAULT '[]', -- JSON array of strings
    cons TEXT NOT NULL DEFAULT '[]', -- JSON array of strings
    download_links TEXT NOT NULL DEFAULT '[]', -- JSON array
    secrets TEXT NOT NULL DEFAULT '[]', -- JSON array, values encrypted
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_softwares_category ON softwares(category);
CREATE INDEX IF NOT EXISTS idx_softwares_created_at ON softwares(created_at);

-- ---------------------------------------------------------------------------
-- Comparison groups
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS comparison_groups (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

CREATE TABLE IF NOT EXISTS comparison_group_softwares (
    id INTEGER PRIMARY KEY NOT NULL,
    group_id INTEGER NOT NULL REFERENCES comparison_groups(id) ON DELETE CASCADE,
    software_id INTEGER NOT NULL REFERENCES softwares(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL, -- RFC3339
    UNIQUE(group_id, software_id)
);

CREATE INDEX IF NOT EXISTS idx_cgs_software_id ON comparison_group_softwares(software_id);

CREATE TABLE IF NOT EXISTS comparison_analyses (
    id INTEGER PRIMARY KEY NOT NULL,
    group_id INTEGER NOT NULL UNIQUE REFERENCES comparison_groups(id) ON DELETE CASCADE,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);
"#;
