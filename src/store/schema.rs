pub const SCHEMA: &str = r#"
-- Accounts; email doubles as the login identifier
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,       -- argon2id hash with embedded salt
    organization TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Repositories; exactly one owner, fixed at creation
CREATE TABLE IF NOT EXISTS repos (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,

    -- Current tracked files (paths relative to the data dir)
    srs_file TEXT,
    source_file TEXT,

    -- Outcome of the latest extraction run; NULL before the first upload
    extraction_status TEXT,

    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Membership set; the owner's row is inserted together with the repo
CREATE TABLE IF NOT EXISTS repo_members (
    repo_id TEXT NOT NULL REFERENCES repos(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    added_at TEXT DEFAULT (datetime('now')),
    PRIMARY KEY (repo_id, user_id)
);

-- Pending access requests; a user must never be in here and in
-- repo_members for the same repo at the same time
CREATE TABLE IF NOT EXISTS repo_requests (
    repo_id TEXT NOT NULL REFERENCES repos(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    requested_at TEXT DEFAULT (datetime('now')),
    PRIMARY KEY (repo_id, user_id)
);

-- Append-only upload audit log; rows are never updated or deleted
CREATE TABLE IF NOT EXISTS upload_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    repo_id TEXT NOT NULL REFERENCES repos(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    kind TEXT NOT NULL,       -- 'srs' | 'sourceCode'
    action TEXT NOT NULL,     -- recorded label, e.g. 'Uploaded SRS'
    file TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_repos_owner ON repos(owner_id);
CREATE INDEX IF NOT EXISTS idx_members_user ON repo_members(user_id);
CREATE INDEX IF NOT EXISTS idx_requests_user ON repo_requests(user_id);
CREATE INDEX IF NOT EXISTS idx_history_repo ON upload_history(repo_id);
"#;
