//! Database schema for the variant tracker.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: u32 = 1;

/// SQL schema for the tracker database.
pub const SCHEMA: &str = r"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY NOT NULL,
    patient_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    date_of_birth TEXT,
    sex TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS variants (
    id TEXT PRIMARY KEY NOT NULL,
    patient_id TEXT NOT NULL,
    gene TEXT NOT NULL,
    hgvs TEXT NOT NULL,
    chromosome TEXT,
    position INTEGER,
    reference TEXT,
    alternate TEXT,
    classification TEXT NOT NULL DEFAULT 'VUS',
    uniprot_id TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (patient_id, gene, hgvs),
    FOREIGN KEY (patient_id) REFERENCES patients(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS predictions (
    id TEXT PRIMARY KEY NOT NULL,
    variant_id TEXT NOT NULL,
    model_name TEXT NOT NULL,
    model_version TEXT,
    score REAL NOT NULL,
    label TEXT,
    details TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (variant_id) REFERENCES variants(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS risk_assessments (
    id TEXT PRIMARY KEY NOT NULL,
    patient_id TEXT NOT NULL,
    risk_level TEXT NOT NULL,
    score REAL,
    notes TEXT,
    assessed_by TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (patient_id) REFERENCES patients(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY NOT NULL,
    variant_id TEXT NOT NULL,
    author TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (variant_id) REFERENCES variants(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS shares (
    id TEXT PRIMARY KEY NOT NULL,
    variant_id TEXT NOT NULL,
    shared_by TEXT NOT NULL,
    shared_with TEXT NOT NULL,
    permission TEXT NOT NULL DEFAULT 'view',
    created_at TEXT NOT NULL,
    FOREIGN KEY (variant_id) REFERENCES variants(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS protein_structures (
    uniprot_id TEXT PRIMARY KEY NOT NULL,
    source TEXT NOT NULL,
    file_path TEXT NOT NULL,
    model_url TEXT,
    fetched_at TEXT NOT NULL
);

-- Append-only: nothing in the application updates or deletes these rows
CREATE TABLE IF NOT EXISTS audit_logs (
    id TEXT PRIMARY KEY NOT NULL,
    action TEXT NOT NULL,
    entity_id TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    old_values TEXT,
    new_values TEXT,
    user_id TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_variants_patient_id ON variants(patient_id);
CREATE INDEX IF NOT EXISTS idx_predictions_variant_id ON predictions(variant_id);
CREATE INDEX IF NOT EXISTS idx_risk_assessments_patient_id ON risk_assessments(patient_id);
CREATE INDEX IF NOT EXISTS idx_comments_variant_id ON comments(variant_id);
CREATE INDEX IF NOT EXISTS idx_shares_variant_id ON shares(variant_id);
CREATE INDEX IF NOT EXISTS idx_audit_logs_created_at ON audit_logs(created_at);
CREATE INDEX IF NOT EXISTS idx_audit_logs_entity_type ON audit_logs(entity_type);
";
