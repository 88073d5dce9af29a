//! Database schema definitions

/// Version stamped into `PRAGMA user_version` on first initialization
pub const SCHEMA_VERSION: i64 = 1;

/// SQL to create the safety-data-sheet table
///
/// `AUTOINCREMENT` keeps ids monotonic so id order is insertion order.
pub const CREATE_CHEMICALS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS chemicals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    name_en TEXT,
    cas TEXT,
    un_number TEXT,
    formula TEXT,
    molecular_weight REAL,
    melting_point REAL,
    boiling_point REAL,
    flash_point REAL,
    density REAL,
    vapor_pressure REAL,
    physical_state TEXT,
    appearance TEXT,
    hazard_category TEXT,
    health_hazard TEXT,
    environmental_hazard TEXT,
    first_aid TEXT,
    fire_fighting TEXT,
    handling_storage TEXT,
    source TEXT,
    imported_at TEXT
)
"#;

/// SQL to create the exposure-limit table
pub const CREATE_EXPOSURE_LIMITS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS exposure_limits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cas TEXT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    name_en TEXT,
    mac REAL,
    pc_twa REAL,
    pc_stel REAL,
    health_effect TEXT,
    remarks TEXT,
    organs TEXT NOT NULL DEFAULT '[]',
    skin_absorption INTEGER NOT NULL DEFAULT 0,
    sensitizer INTEGER NOT NULL DEFAULT 0,
    carcinogen TEXT,
    source TEXT,
    imported_at TEXT
)
"#;

/// SQL to create the import batch metadata table
pub const CREATE_IMPORT_BATCHES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS import_batches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    dataset TEXT NOT NULL,
    source TEXT NOT NULL,
    imported_at TEXT NOT NULL,
    total INTEGER NOT NULL,
    status TEXT NOT NULL
)
"#;

/// SQL to create indexes (all non-unique)
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_chemicals_cas ON chemicals(cas)",
    "CREATE INDEX IF NOT EXISTS idx_chemicals_un_number ON chemicals(un_number)",
    "CREATE INDEX IF NOT EXISTS idx_chemicals_name ON chemicals(name)",
    "CREATE INDEX IF NOT EXISTS idx_exposure_limits_cas ON exposure_limits(cas)",
    "CREATE INDEX IF NOT EXISTS idx_exposure_limits_name ON exposure_limits(name)",
    "CREATE INDEX IF NOT EXISTS idx_import_batches_dataset ON import_batches(dataset)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_CHEMICALS_TABLE,
        CREATE_EXPOSURE_LIMITS_TABLE,
        CREATE_IMPORT_BATCHES_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
