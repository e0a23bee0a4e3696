//! Table definitions.

/// DDL applied in order by [`super::Database::init_schema`].
pub(super) const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        name TEXT NOT NULL,
        profile_pic TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS teams (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        league TEXT NOT NULL,
        season INTEGER NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS players (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        number TEXT NOT NULL,
        position TEXT NOT NULL,
        profile_pic TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS games (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        date TEXT NOT NULL,
        opponent TEXT NOT NULL,
        at_bats INTEGER NOT NULL DEFAULT 0 CHECK (at_bats >= 0),
        hits INTEGER NOT NULL DEFAULT 0 CHECK (hits >= 0),
        doubles INTEGER NOT NULL DEFAULT 0 CHECK (doubles >= 0),
        triples INTEGER NOT NULL DEFAULT 0 CHECK (triples >= 0),
        home_runs INTEGER NOT NULL DEFAULT 0 CHECK (home_runs >= 0),
        runs INTEGER NOT NULL DEFAULT 0 CHECK (runs >= 0),
        rbis INTEGER NOT NULL DEFAULT 0 CHECK (rbis >= 0),
        walks INTEGER NOT NULL DEFAULT 0 CHECK (walks >= 0),
        strikeouts INTEGER NOT NULL DEFAULT 0 CHECK (strikeouts >= 0),
        stolen_bases INTEGER NOT NULL DEFAULT 0 CHECK (stolen_bases >= 0),
        caught_stealing INTEGER NOT NULL DEFAULT 0 CHECK (caught_stealing >= 0),
        hit_by_pitch INTEGER NOT NULL DEFAULT 0 CHECK (hit_by_pitch >= 0),
        sacrifice_flies INTEGER NOT NULL DEFAULT 0 CHECK (sacrifice_flies >= 0),
        sacrifice_bunts INTEGER NOT NULL DEFAULT 0 CHECK (sacrifice_bunts >= 0),
        ground_into_dp INTEGER NOT NULL DEFAULT 0 CHECK (ground_into_dp >= 0),
        errors INTEGER NOT NULL DEFAULT 0 CHECK (errors >= 0),
        putouts INTEGER NOT NULL DEFAULT 0 CHECK (putouts >= 0),
        assists INTEGER NOT NULL DEFAULT 0 CHECK (assists >= 0),
        innings_pitched REAL NOT NULL DEFAULT 0 CHECK (innings_pitched >= 0),
        pitches_thrown INTEGER NOT NULL DEFAULT 0 CHECK (pitches_thrown >= 0),
        strikeouts_pitched INTEGER NOT NULL DEFAULT 0 CHECK (strikeouts_pitched >= 0),
        walks_allowed INTEGER NOT NULL DEFAULT 0 CHECK (walks_allowed >= 0),
        hits_allowed INTEGER NOT NULL DEFAULT 0 CHECK (hits_allowed >= 0),
        runs_allowed INTEGER NOT NULL DEFAULT 0 CHECK (runs_allowed >= 0),
        earned_runs INTEGER NOT NULL DEFAULT 0 CHECK (earned_runs >= 0),
        home_runs_allowed INTEGER NOT NULL DEFAULT 0 CHECK (home_runs_allowed >= 0),
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_teams_user_id ON teams(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_players_team_id ON players(team_id)",
    "CREATE INDEX IF NOT EXISTS idx_games_player_date ON games(player_id, date)",
];

/// Counting-stat columns of `games`, in bind order.
pub(super) const GAME_STAT_COLUMNS: &[&str] = &[
    "at_bats",
    "hits",
    "doubles",
    "triples",
    "home_runs",
    "runs",
    "rbis",
    "walks",
    "strikeouts",
    "stolen_bases",
    "caught_stealing",
    "hit_by_pitch",
    "sacrifice_flies",
    "sacrifice_bunts",
    "ground_into_dp",
    "errors",
    "putouts",
    "assists",
    "innings_pitched",
    "pitches_thrown",
    "strikeouts_pitched",
    "walks_allowed",
    "hits_allowed",
    "runs_allowed",
    "earned_runs",
    "home_runs_allowed",
];
