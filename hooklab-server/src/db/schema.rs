/// SQL schema for the Hooklab database
/// Creates all tables with proper constraints, foreign keys, and indexes
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT UNIQUE NOT NULL,
    is_admin INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

-- Content items (hooks, bridges and follow-ups) with their derived vote statistics
CREATE TABLE IF NOT EXISTS content_items (
    id TEXT PRIMARY KEY,
    text TEXT NOT NULL CHECK(length(text) <= 1000),
    content_type TEXT NOT NULL DEFAULT 'hook' CHECK(content_type IN ('hook', 'bridge', 'followup')),
    total_votes INTEGER NOT NULL DEFAULT 0,
    positive_votes INTEGER NOT NULL DEFAULT 0,
    negative_votes INTEGER NOT NULL DEFAULT 0,
    positive_percentage REAL NOT NULL DEFAULT 0 CHECK(positive_percentage BETWEEN 0 AND 100),
    is_flagged INTEGER NOT NULL DEFAULT 0,
    created_by TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CHECK(positive_votes + negative_votes = total_votes),
    FOREIGN KEY (created_by) REFERENCES users(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_content_items_type ON content_items(content_type);
CREATE INDEX IF NOT EXISTS idx_content_items_created_at ON content_items(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_content_items_flagged ON content_items(is_flagged);

-- Vote events (append-only)
CREATE TABLE IF NOT EXISTS votes (
    id TEXT PRIMARY KEY,
    content_item_id TEXT NOT NULL,
    vote_type TEXT NOT NULL CHECK(vote_type IN ('positive', 'negative', 'star')),
    session_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (content_item_id) REFERENCES content_items(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_votes_content_item_id ON votes(content_item_id);
CREATE INDEX IF NOT EXISTS idx_votes_session_id ON votes(session_id);
CREATE INDEX IF NOT EXISTS idx_votes_created_at ON votes(created_at);

-- Saved items (user bookmarks)
CREATE TABLE IF NOT EXISTS saved_items (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    content_item_id TEXT NOT NULL,
    content_type TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (user_id, content_item_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (content_item_id) REFERENCES content_items(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_saved_items_user ON saved_items(user_id);
CREATE INDEX IF NOT EXISTS idx_saved_items_type ON saved_items(content_type);

-- Login sessions
CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
"#;

/// Demo data for local development: one admin, one voter and a few snippets
/// of each content type
pub const DEMO_DATA: &str = r#"
INSERT OR IGNORE INTO users (id, email, is_admin, created_at) VALUES
    ('7f1c2a3e-0000-4000-8000-000000000001', 'admin@hooklab.local', 1, '2024-01-01T00:00:00+00:00'),
    ('7f1c2a3e-0000-4000-8000-000000000002', 'voter@hooklab.local', 0, '2024-01-01T00:00:00+00:00');

INSERT OR IGNORE INTO content_items (id, text, content_type, created_by, created_at, updated_at) VALUES
    ('9a4d6b10-0000-4000-8000-000000000001', 'Most people waste their first 10 seconds. Here is how not to.', 'hook', '7f1c2a3e-0000-4000-8000-000000000001', '2024-01-02T00:00:00+00:00', '2024-01-02T00:00:00+00:00'),
    ('9a4d6b10-0000-4000-8000-000000000002', 'I tested 40 headlines so you do not have to.', 'hook', '7f1c2a3e-0000-4000-8000-000000000001', '2024-01-02T00:01:00+00:00', '2024-01-02T00:01:00+00:00'),
    ('9a4d6b10-0000-4000-8000-000000000003', 'Stop writing intros. Start with the punchline.', 'hook', '7f1c2a3e-0000-4000-8000-000000000001', '2024-01-02T00:02:00+00:00', '2024-01-02T00:02:00+00:00'),
    ('9a4d6b10-0000-4000-8000-000000000004', 'Which is exactly why the next part matters.', 'bridge', '7f1c2a3e-0000-4000-8000-000000000001', '2024-01-02T00:03:00+00:00', '2024-01-02T00:03:00+00:00'),
    ('9a4d6b10-0000-4000-8000-000000000005', 'But here is the twist nobody mentions.', 'bridge', '7f1c2a3e-0000-4000-8000-000000000001', '2024-01-02T00:04:00+00:00', '2024-01-02T00:04:00+00:00'),
    ('9a4d6b10-0000-4000-8000-000000000006', 'Did you try it yet? Reply with your result.', 'followup', '7f1c2a3e-0000-4000-8000-000000000001', '2024-01-02T00:05:00+00:00', '2024-01-02T00:05:00+00:00'),
    ('9a4d6b10-0000-4000-8000-000000000007', 'Quick reminder: the offer closes tonight.', 'followup', '7f1c2a3e-0000-4000-8000-000000000001', '2024-01-02T00:06:00+00:00', '2024-01-02T00:06:00+00:00');
"#;
