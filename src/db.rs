use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::Result;
use crate::record::CleanRecord;

pub fn connect(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    info!(path = %path.display(), "database opened");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS movies (
            id              INTEGER PRIMARY KEY,
            title           TEXT,
            title_localized TEXT,
            synopsis        TEXT,
            poster_url      TEXT,
            press_rating    REAL,
            public_rating   REAL,
            metadata        TEXT,
            release_date    TEXT,
            runtime_minutes INTEGER,
            visa            TEXT,
            film_type       TEXT,
            color           TEXT,
            budget          TEXT,
            awards          TEXT,
            production_year INTEGER,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            CHECK (title IS NOT NULL OR title_localized IS NOT NULL),
            UNIQUE(title_localized, release_date)
        );

        CREATE TABLE IF NOT EXISTS persons (
            id   INTEGER PRIMARY KEY,
            name TEXT UNIQUE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS companies (
            id   INTEGER PRIMARY KEY,
            name TEXT UNIQUE NOT NULL
        );

        -- Movie-keyed sets
        CREATE TABLE IF NOT EXISTS movie_genres (
            movie_id INTEGER NOT NULL REFERENCES movies(id),
            genre    TEXT NOT NULL,
            UNIQUE(movie_id, genre)
        );
        CREATE INDEX IF NOT EXISTS idx_genres_genre ON movie_genres(genre);

        CREATE TABLE IF NOT EXISTS movie_countries (
            movie_id INTEGER NOT NULL REFERENCES movies(id),
            country  TEXT NOT NULL,
            kind     TEXT NOT NULL CHECK(kind IN ('release','nationality')),
            UNIQUE(movie_id, country, kind)
        );
        CREATE INDEX IF NOT EXISTS idx_countries_country ON movie_countries(country);

        CREATE TABLE IF NOT EXISTS movie_languages (
            movie_id INTEGER NOT NULL REFERENCES movies(id),
            language TEXT NOT NULL,
            UNIQUE(movie_id, language)
        );

        -- Associations
        CREATE TABLE IF NOT EXISTS movie_actors (
            movie_id  INTEGER NOT NULL REFERENCES movies(id),
            person_id INTEGER NOT NULL REFERENCES persons(id),
            role      TEXT,
            UNIQUE(movie_id, person_id)
        );
        CREATE INDEX IF NOT EXISTS idx_actors_person ON movie_actors(person_id);

        CREATE TABLE IF NOT EXISTS movie_directors (
            movie_id  INTEGER NOT NULL REFERENCES movies(id),
            person_id INTEGER NOT NULL REFERENCES persons(id),
            UNIQUE(movie_id, person_id)
        );

        CREATE TABLE IF NOT EXISTS movie_screenwriters (
            movie_id  INTEGER NOT NULL REFERENCES movies(id),
            person_id INTEGER NOT NULL REFERENCES persons(id),
            UNIQUE(movie_id, person_id)
        );

        CREATE TABLE IF NOT EXISTS movie_distributors (
            movie_id   INTEGER NOT NULL REFERENCES movies(id),
            company_id INTEGER NOT NULL REFERENCES companies(id),
            UNIQUE(movie_id, company_id)
        );
        ",
    )?;
    Ok(())
}

// ── Lookups ──

/// Movie identity is the localized title plus the release date; a missing
/// date only matches a missing date.
pub fn get_movie_id(
    conn: &Connection,
    title_localized: &str,
    release_date: Option<&str>,
) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM movies WHERE title_localized = ?1 AND release_date IS ?2",
            params![title_localized, release_date],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Names that are not stored yet are absent from the map.
pub fn get_person_ids<S: AsRef<str>>(conn: &Connection, names: &[S]) -> Result<BTreeMap<String, i64>> {
    ids_by_name(conn, "persons", names)
}

pub fn get_company_ids<S: AsRef<str>>(conn: &Connection, names: &[S]) -> Result<BTreeMap<String, i64>> {
    ids_by_name(conn, "companies", names)
}

fn ids_by_name<S: AsRef<str>>(
    conn: &Connection,
    table: &str,
    names: &[S],
) -> Result<BTreeMap<String, i64>> {
    let mut stmt = conn.prepare(&format!("SELECT id FROM {} WHERE name = ?1", table))?;
    let mut ids = BTreeMap::new();
    for name in names {
        let name = name.as_ref();
        if let Some(id) = stmt.query_row([name], |row| row.get(0)).optional()? {
            ids.insert(name.to_string(), id);
        }
    }
    Ok(ids)
}

fn ensure_names<S: AsRef<str>>(
    conn: &Connection,
    table: &str,
    names: &[S],
) -> Result<BTreeMap<String, i64>> {
    {
        let mut stmt = conn.prepare(&format!("INSERT OR IGNORE INTO {} (name) VALUES (?1)", table))?;
        for name in names {
            stmt.execute([name.as_ref()])?;
        }
    }
    ids_by_name(conn, table, names)
}

// ── Saving ──

/// Store one cleaned movie and everything attached to it. Saving the same
/// movie again updates its columns and adds only the missing association rows.
pub fn save_movie(conn: &Connection, movie: &CleanRecord) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    let t = &movie.technical;

    let existing = match movie.title_localized.as_deref() {
        Some(title) => get_movie_id(&tx, title, movie.release_date.as_deref())?,
        None => None,
    };
    let movie_id = match existing {
        Some(id) => {
            tx.execute(
                "UPDATE movies SET
                 title=?2, synopsis=?3, poster_url=?4, press_rating=?5, public_rating=?6,
                 metadata=?7, runtime_minutes=?8, visa=?9, film_type=?10, color=?11,
                 budget=?12, awards=?13, production_year=?14
                 WHERE id=?1",
                params![
                    id, movie.title, movie.synopsis, movie.poster_url, movie.press_rating,
                    movie.public_rating, movie.metadata, movie.runtime_minutes, t.visa,
                    t.film_type, t.color, t.budget, t.awards, t.production_year,
                ],
            )?;
            debug!(movie_id = id, "movie updated");
            id
        }
        None => {
            tx.execute(
                "INSERT INTO movies
                 (title, title_localized, synopsis, poster_url, press_rating, public_rating,
                  metadata, release_date, runtime_minutes, visa, film_type, color, budget,
                  awards, production_year)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)",
                params![
                    movie.title, movie.title_localized, movie.synopsis, movie.poster_url,
                    movie.press_rating, movie.public_rating, movie.metadata, movie.release_date,
                    movie.runtime_minutes, t.visa, t.film_type, t.color, t.budget, t.awards,
                    t.production_year,
                ],
            )?;
            tx.last_insert_rowid()
        }
    };

    insert_values(&tx, "movie_genres", "genre", movie_id, &movie.genres)?;
    insert_values(&tx, "movie_languages", "language", movie_id, &t.languages)?;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO movie_countries (movie_id, country, kind) VALUES (?1, ?2, ?3)",
        )?;
        for country in &movie.release_places {
            stmt.execute(params![movie_id, country, "release"])?;
        }
        for country in &t.nationalities {
            stmt.execute(params![movie_id, country, "nationality"])?;
        }
    }

    link_persons(&tx, "movie_directors", movie_id, &movie.directors)?;
    link_persons(&tx, "movie_screenwriters", movie_id, &movie.screenwriters)?;

    let actor_names: Vec<&str> = movie.casting.iter().map(|m| m.name.as_str()).collect();
    let actor_ids = ensure_names(&tx, "persons", &actor_names)?;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO movie_actors (movie_id, person_id, role) VALUES (?1, ?2, ?3)",
        )?;
        for member in &movie.casting {
            if let Some(person_id) = actor_ids.get(&member.name) {
                stmt.execute(params![movie_id, person_id, member.role])?;
            }
        }
    }

    let distributors: Vec<&String> = t.distributors.iter().collect();
    let company_ids = ensure_names(&tx, "companies", &distributors)?;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO movie_distributors (movie_id, company_id) VALUES (?1, ?2)",
        )?;
        for company_id in company_ids.values() {
            stmt.execute(params![movie_id, company_id])?;
        }
    }

    tx.commit()?;
    debug!(
        movie_id,
        title = movie.title_localized.as_deref().unwrap_or("?"),
        "movie saved"
    );
    Ok(movie_id)
}

fn insert_values(
    conn: &Connection,
    table: &str,
    column: &str,
    movie_id: i64,
    values: &BTreeSet<String>,
) -> Result<()> {
    let mut stmt = conn.prepare(&format!(
        "INSERT OR IGNORE INTO {} (movie_id, {}) VALUES (?1, ?2)",
        table, column
    ))?;
    for value in values {
        stmt.execute(params![movie_id, value])?;
    }
    Ok(())
}

fn link_persons(conn: &Connection, table: &str, movie_id: i64, names: &[String]) -> Result<()> {
    let ids = ensure_names(conn, "persons", names)?;
    let mut stmt = conn.prepare(&format!(
        "INSERT OR IGNORE INTO {} (movie_id, person_id) VALUES (?1, ?2)",
        table
    ))?;
    for name in names {
        if let Some(person_id) = ids.get(name) {
            stmt.execute(params![movie_id, person_id])?;
        }
    }
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CastMember, TechnicalData};

    fn db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn movie() -> CleanRecord {
        CleanRecord {
            title: Some("The Bikeriders".into()),
            title_localized: Some("The Bikeriders".into()),
            release_date: Some("2024/06/19".into()),
            runtime_minutes: Some(116),
            press_rating: Some(3.6),
            directors: vec!["Jeff Nichols".into()],
            screenwriters: vec!["Jeff Nichols".into()],
            genres: ["Drame", "Thriller"].iter().map(|s| s.to_string()).collect(),
            release_places: ["États-Unis"].iter().map(|s| s.to_string()).collect(),
            technical: TechnicalData {
                nationalities: ["U.S.A."].iter().map(|s| s.to_string()).collect(),
                distributors: ["Universal Pictures International France"].iter().map(|s| s.to_string()).collect(),
                languages: ["Anglais"].iter().map(|s| s.to_string()).collect(),
                production_year: Some(2023),
                ..Default::default()
            },
            casting: vec![
                CastMember { name: "Austin Butler".into(), role: Some("Benny".into()) },
                CastMember { name: "Michael Shannon".into(), role: None },
            ],
            ..Default::default()
        }
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = db();
        init_schema(&conn).unwrap();
        assert_eq!(count(&conn, "movies"), 0);
    }

    #[test]
    fn save_and_look_up() {
        let conn = db();
        let id = save_movie(&conn, &movie()).unwrap();

        assert_eq!(get_movie_id(&conn, "The Bikeriders", Some("2024/06/19")).unwrap(), Some(id));
        assert_eq!(get_movie_id(&conn, "The Bikeriders", None).unwrap(), None);

        let persons = get_person_ids(&conn, &["Jeff Nichols", "Austin Butler", "Nobody"]).unwrap();
        assert_eq!(persons.len(), 2);
        assert!(!persons.contains_key("Nobody"));

        let companies = get_company_ids(&conn, &["Universal Pictures International France"]).unwrap();
        assert_eq!(companies.len(), 1);

        assert_eq!(count(&conn, "persons"), 3);
        assert_eq!(count(&conn, "movie_genres"), 2);
        assert_eq!(count(&conn, "movie_countries"), 2);
        assert_eq!(count(&conn, "movie_directors"), 1);
        assert_eq!(count(&conn, "movie_screenwriters"), 1);

        let role: Option<String> = conn
            .query_row(
                "SELECT role FROM movie_actors a JOIN persons p ON p.id = a.person_id
                 WHERE p.name = 'Michael Shannon'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(role, None);
    }

    #[test]
    fn saving_twice_adds_nothing() {
        let conn = db();
        let first = save_movie(&conn, &movie()).unwrap();
        let mut again = movie();
        again.public_rating = Some(3.4);
        let second = save_movie(&conn, &again).unwrap();

        assert_eq!(first, second);
        assert_eq!(count(&conn, "movies"), 1);
        assert_eq!(count(&conn, "movie_actors"), 2);
        assert_eq!(count(&conn, "movie_distributors"), 1);
        let public: Option<f64> = conn
            .query_row("SELECT public_rating FROM movies WHERE id = ?1", [first], |r| r.get(0))
            .unwrap();
        assert_eq!(public, Some(3.4));
    }

    #[test]
    fn movie_without_any_title_is_rejected() {
        let conn = db();
        let untitled = CleanRecord::default();
        assert!(save_movie(&conn, &untitled).is_err());
        assert_eq!(count(&conn, "movies"), 0);
    }
}
