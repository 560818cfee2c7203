use flix_core::db::migrations::latest_version;
use flix_core::{
    populate, CatalogRepository, Genre, SessionFactory, SqliteCatalogRepository, UnitOfWork,
};
use std::path::PathBuf;

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/data")
}

#[test]
fn sessions_share_one_migrated_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let factory = SessionFactory::open(dir.path().join("flix.db")).unwrap();

    {
        let session = factory.session().unwrap();
        let version: u32 = session
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, latest_version());
        populate(&session, fixture_dir()).unwrap();
    }

    let first = factory.session().unwrap();
    let second = factory.session().unwrap();
    let first_repo = SqliteCatalogRepository::try_new(&first).unwrap();
    let second_repo = SqliteCatalogRepository::try_new(&second).unwrap();

    first_repo.add_genre(&Genre::new("Motoring")).unwrap();
    assert!(second_repo
        .get_genres()
        .unwrap()
        .iter()
        .any(|genre| genre.name == "Motoring"));
    assert_eq!(second_repo.get_number_of_movies().unwrap(), 14);
}

#[test]
fn pooled_sessions_enforce_foreign_keys() {
    let factory = SessionFactory::open_in_memory().unwrap();
    let session = factory.session().unwrap();

    let foreign_keys: i64 = session
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[test]
fn in_memory_factory_keeps_data_between_sessions() {
    let factory = SessionFactory::open_in_memory().unwrap();

    {
        let session = factory.session().unwrap();
        let repo = SqliteCatalogRepository::try_new(&session).unwrap();
        repo.add_genre(&Genre::new("Drama")).unwrap();
    }

    let session = factory.session().unwrap();
    let repo = SqliteCatalogRepository::try_new(&session).unwrap();
    assert_eq!(repo.get_genres().unwrap().len(), 1);
}

#[test]
fn unit_of_work_rolls_back_unless_committed() {
    let factory = SessionFactory::open_in_memory().unwrap();
    let session = factory.session().unwrap();

    {
        let uow = UnitOfWork::begin(&session, "discarded").unwrap();
        uow.execute("INSERT INTO genres (name) VALUES ('Discarded');", [])
            .unwrap();
    }
    {
        let uow = UnitOfWork::begin(&session, "kept").unwrap();
        uow.execute("INSERT INTO genres (name) VALUES ('Kept');", [])
            .unwrap();
        uow.commit().unwrap();
    }

    let mut stmt = session.prepare("SELECT name FROM genres;").unwrap();
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(names, ["Kept"]);
}
