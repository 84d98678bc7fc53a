//! SQL schema for the cytometry store.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS projects (
    project_id   TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    description  TEXT,
    created_date TEXT DEFAULT CURRENT_DATE
);

CREATE TABLE IF NOT EXISTS subjects (
    subject_id  TEXT PRIMARY KEY,
    project_id  TEXT NOT NULL REFERENCES projects(project_id),
    condition   TEXT NOT NULL,
    age         INTEGER NOT NULL,
    sex         TEXT NOT NULL CHECK (sex IN ('M', 'F')),
    treatment   TEXT NOT NULL,
    response    TEXT CHECK (response IN ('yes', 'no'))   -- NULL when unknown
);

CREATE TABLE IF NOT EXISTS samples (
    sample_id                 TEXT PRIMARY KEY,
    subject_id                TEXT NOT NULL REFERENCES subjects(subject_id),
    sample_type               TEXT NOT NULL,
    time_from_treatment_start INTEGER NOT NULL,
    collection_date           TEXT
);

-- Fixed reference rows, upserted at startup.
CREATE TABLE IF NOT EXISTS cell_populations (
    population_id TEXT PRIMARY KEY,
    display_name  TEXT NOT NULL,
    description   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cell_counts (
    sample_id     TEXT NOT NULL REFERENCES samples(sample_id),
    population_id TEXT NOT NULL REFERENCES cell_populations(population_id),
    count         INTEGER NOT NULL CHECK (count >= 0),
    PRIMARY KEY (sample_id, population_id)
);

CREATE INDEX IF NOT EXISTS subjects_condition_treatment
    ON subjects(condition, treatment);
CREATE INDEX IF NOT EXISTS samples_time_type
    ON samples(time_from_treatment_start, sample_type);
CREATE INDEX IF NOT EXISTS cell_counts_sample
    ON cell_counts(sample_id);
";

/// Every table `SCHEMA` creates.
pub const TABLES: [&str; 5] =
  ["projects", "subjects", "samples", "cell_populations", "cell_counts"];

/// Tables cleared by a reload, children first.
pub const RELOAD_TABLES: [&str; 4] = ["cell_counts", "samples", "subjects", "projects"];
