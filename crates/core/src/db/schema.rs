pub const SCHEMA: &str = "
-- Core prompts table
CREATE TABLE IF NOT EXISTS prompts (
    id TEXT PRIMARY KEY,                    -- UUID v4 string, never reused
    title TEXT NOT NULL,                    -- Display title
    content TEXT NOT NULL DEFAULT '',       -- The prompt text
    category TEXT NOT NULL DEFAULT 'General',
    tags TEXT NOT NULL DEFAULT '[]',        -- JSON array of strings: [\"code\", \"debug\"]
    created_at TEXT NOT NULL                -- RFC 3339 UTC, fixed precision so it sorts as text
);

-- Listing is always newest first
CREATE INDEX IF NOT EXISTS idx_prompts_created ON prompts(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_prompts_category ON prompts(category);
";
