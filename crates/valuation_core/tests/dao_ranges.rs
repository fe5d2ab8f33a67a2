use rusqlite::types::Value;
use rusqlite::Connection;
use valuation_core::db::open_db_in_memory;
use valuation_core::{Country, CountryDao, DaoError};

const SEED: &[(&str, &str)] = &[
    ("ar", "Argentina"),
    ("bo", "Bolivia"),
    ("cl", "Chile"),
    ("co", "Colombia"),
    ("ec", "Ecuador"),
    ("pe", "Peru"),
];

fn seeded() -> Connection {
    let conn = open_db_in_memory().unwrap();
    {
        let dao = CountryDao::try_new(&conn).unwrap();
        // Reverse order so results prove key ordering, not insertion order.
        for (code, name) in SEED.iter().rev() {
            dao.insert(Country::new(*code, *name)).unwrap();
        }
    }
    conn
}

fn codes(countries: &[Country]) -> Vec<&str> {
    countries.iter().map(Country::code).collect()
}

#[test]
fn get_all_returns_every_record_in_key_order() {
    let conn = seeded();
    let dao = CountryDao::try_new(&conn).unwrap();

    let all = dao.get_all().unwrap();
    assert_eq!(codes(&all), vec!["ar", "bo", "cl", "co", "ec", "pe"]);
    assert_eq!(dao.count().unwrap(), all.len() as u64);
}

#[test]
fn get_all_in_returns_requested_slice() {
    let conn = seeded();
    let dao = CountryDao::try_new(&conn).unwrap();

    let page = dao.get_all_in(2, 3).unwrap();
    assert_eq!(codes(&page), vec!["cl", "co", "ec"]);
}

#[test]
fn get_all_in_treats_non_positive_arguments_as_unbounded() {
    let conn = seeded();
    let dao = CountryDao::try_new(&conn).unwrap();

    assert_eq!(dao.get_all_in(0, 0).unwrap().len(), SEED.len());
    assert_eq!(dao.get_all_in(-5, -1).unwrap().len(), SEED.len());
    assert_eq!(codes(&dao.get_all_in(0, 2).unwrap()), vec!["ar", "bo"]);
    assert_eq!(codes(&dao.get_all_in(4, -1).unwrap()), vec!["ec", "pe"]);
}

#[test]
fn get_all_in_past_the_end_is_empty() {
    let conn = seeded();
    let dao = CountryDao::try_new(&conn).unwrap();

    assert!(dao.get_all_in(10, 3).unwrap().is_empty());
}

#[test]
fn find_range_matches_get_all_in_with_span() {
    let conn = seeded();
    let dao = CountryDao::try_new(&conn).unwrap();

    for (start, end) in [(0, 2), (1, 4), (3, 6), (5, 9)] {
        assert_eq!(
            codes(&dao.find_range([start, end]).unwrap()),
            codes(&dao.get_all_in(start, end - start).unwrap()),
            "range [{start}, {end})"
        );
    }
}

#[test]
fn find_range_rejects_reversed_bounds() {
    let conn = seeded();
    let dao = CountryDao::try_new(&conn).unwrap();

    let err = dao.find_range([4, 1]).unwrap_err();
    assert!(matches!(err, DaoError::InvalidRange { start: 4, end: 1 }));
}

#[test]
fn query_by_range_pages_arbitrary_sql() {
    let conn = seeded();
    let dao = CountryDao::try_new(&conn).unwrap();

    let rows = dao
        .query_by_range("SELECT code, name FROM countries ORDER BY name DESC;", 1, 2)
        .unwrap();
    assert_eq!(
        rows,
        vec![
            vec![Value::Text("ec".into()), Value::Text("Ecuador".into())],
            vec![Value::Text("co".into()), Value::Text("Colombia".into())],
        ]
    );

    let unbounded = dao
        .query_by_range("SELECT COUNT(*) FROM countries", 0, 0)
        .unwrap();
    assert_eq!(unbounded, vec![vec![Value::Integer(SEED.len() as i64)]]);
}

#[test]
fn query_by_bounds_converts_range_to_page() {
    let conn = seeded();
    let dao = CountryDao::try_new(&conn).unwrap();

    let rows = dao
        .query_by_bounds("SELECT code FROM countries ORDER BY code", [1, 3])
        .unwrap();
    assert_eq!(
        rows,
        vec![vec![Value::Text("bo".into())], vec![Value::Text("cl".into())]]
    );

    assert!(matches!(
        dao.query_by_bounds("SELECT code FROM countries", [3, 1]),
        Err(DaoError::InvalidRange { .. })
    ));
}

#[test]
fn query_by_range_propagates_syntax_errors() {
    let conn = seeded();
    let dao = CountryDao::try_new(&conn).unwrap();

    let err = dao.query_by_range("SELEC nonsense", -1, -1).unwrap_err();
    assert!(matches!(err, DaoError::Db(_)));
}

#[test]
fn query_by_range_pages_sql_ending_in_comment_or_repeated_terminators() {
    let conn = seeded();
    let dao = CountryDao::try_new(&conn).unwrap();

    let commented = "SELECT code FROM countries ORDER BY code -- every country";
    assert_eq!(dao.query_by_range(commented, 0, 0).unwrap().len(), SEED.len());
    assert_eq!(
        dao.query_by_range(commented, 0, 1).unwrap(),
        vec![vec![Value::Text("ar".into())]]
    );

    let terminated = dao
        .query_by_range("SELECT code FROM countries ORDER BY code ; ;", 1, 1)
        .unwrap();
    assert_eq!(terminated, vec![vec![Value::Text("bo".into())]]);
}

#[test]
fn find_range_with_overflowing_span_is_rejected() {
    let conn = seeded();
    let dao = CountryDao::try_new(&conn).unwrap();

    assert!(matches!(
        dao.find_range([-1, i64::MAX]),
        Err(DaoError::InvalidRange { start: -1, .. })
    ));
    assert_eq!(dao.find_range([0, i64::MAX]).unwrap().len(), SEED.len());
}
