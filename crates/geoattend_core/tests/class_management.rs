use geoattend_core::db::open_db_in_memory;
use geoattend_core::{
    Actor, ClassLookup, ClassService, ClassServiceError, Coordinate, GeofenceDefinition,
    NewClass, NewUser, SqliteClassRepository, SqliteUserRepository, User, UserRepository,
    UserRole,
};
use rusqlite::Connection;

fn seed_user(conn: &Connection, username: &str, role: UserRole) -> User {
    SqliteUserRepository::new(conn)
        .create_user(&NewUser {
            email: format!("{username}@example.com"),
            username: username.to_string(),
            full_name: format!("{username} full name"),
            role,
            password_hash: "opaque".to_string(),
        })
        .unwrap()
}

fn physics(code: &str) -> NewClass {
    NewClass {
        name: "Physics".to_string(),
        code: code.to_string(),
        description: Some("Mechanics".to_string()),
        geofence: GeofenceDefinition::new(Coordinate::new(6.5244, 3.3792), 100.0),
    }
}

#[test]
fn lecturer_creates_and_reads_class() {
    let conn = open_db_in_memory().unwrap();
    let lecturer = Actor::from(&seed_user(&conn, "lect", UserRole::Lecturer));
    let service = ClassService::new(SqliteClassRepository::new(&conn));

    let created = service.create(&lecturer, &physics(" PHY101 ")).unwrap();
    assert_eq!(created.code, "PHY101");
    assert_eq!(created.lecturer_id, lecturer.user_id);
    assert_eq!(created.geofence.radius_meters, 100.0);

    assert_eq!(service.get(&lecturer, created.id).unwrap(), created);
    assert_eq!(service.get_by_code(&lecturer, "PHY101").unwrap(), created);
    assert_eq!(service.list(&lecturer).unwrap(), vec![created.clone()]);

    let geofence = SqliteClassRepository::new(&conn)
        .geofence_for(created.id)
        .unwrap()
        .unwrap();
    assert_eq!(geofence, created.geofence);
}

#[test]
fn only_lecturers_create_classes() {
    let conn = open_db_in_memory().unwrap();
    let student = Actor::from(&seed_user(&conn, "stud", UserRole::Student));
    let admin = Actor::from(&seed_user(&conn, "boss", UserRole::Admin));
    let service = ClassService::new(SqliteClassRepository::new(&conn));

    for actor in [student, admin] {
        let err = service.create(&actor, &physics("PHY101")).unwrap_err();
        assert!(matches!(err, ClassServiceError::Forbidden(_)));
    }
    assert!(service.list(&student).unwrap().is_empty());
}

#[test]
fn duplicate_code_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let lecturer = Actor::from(&seed_user(&conn, "lect", UserRole::Lecturer));
    let service = ClassService::new(SqliteClassRepository::new(&conn));

    service.create(&lecturer, &physics("PHY101")).unwrap();
    let err = service.create(&lecturer, &physics("PHY101")).unwrap_err();
    assert!(matches!(err, ClassServiceError::CodeTaken(code) if code == "PHY101"));
}

#[test]
fn invalid_geofence_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let lecturer = Actor::from(&seed_user(&conn, "lect", UserRole::Lecturer));
    let service = ClassService::new(SqliteClassRepository::new(&conn));

    let mut input = physics("PHY101");
    input.geofence.radius_meters = 0.0;
    let err = service.create(&lecturer, &input).unwrap_err();
    assert!(matches!(err, ClassServiceError::Invalid(_)));
}

#[test]
fn missing_class_lookups_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let student = Actor::from(&seed_user(&conn, "stud", UserRole::Student));
    let service = ClassService::new(SqliteClassRepository::new(&conn));

    assert!(matches!(
        service.get(&student, 77).unwrap_err(),
        ClassServiceError::ClassNotFound(77)
    ));
    assert!(matches!(
        service.get_by_code(&student, "NOPE").unwrap_err(),
        ClassServiceError::CodeNotFound(code) if code == "NOPE"
    ));
    assert!(SqliteClassRepository::new(&conn)
        .geofence_for(77)
        .unwrap()
        .is_none());
}

#[test]
fn only_owner_deletes_class() {
    let conn = open_db_in_memory().unwrap();
    let owner = Actor::from(&seed_user(&conn, "owner", UserRole::Lecturer));
    let other = Actor::from(&seed_user(&conn, "other", UserRole::Lecturer));
    let service = ClassService::new(SqliteClassRepository::new(&conn));
    let class = service.create(&owner, &physics("PHY101")).unwrap();

    let err = service.delete(&other, class.id).unwrap_err();
    assert!(matches!(err, ClassServiceError::NotOwner { class_id, .. } if class_id == class.id));

    service.delete(&owner, class.id).unwrap();
    assert!(matches!(
        service.delete(&owner, class.id).unwrap_err(),
        ClassServiceError::ClassNotFound(_)
    ));
}

#[test]
fn lecturer_without_account_cannot_create_class() {
    let conn = open_db_in_memory().unwrap();
    let service = ClassService::new(SqliteClassRepository::new(&conn));

    let err = service
        .create(&Actor::new(999, UserRole::Lecturer), &physics("PHY101"))
        .unwrap_err();
    assert!(matches!(err, ClassServiceError::LecturerNotFound(999)));
    assert!(service
        .list(&Actor::new(999, UserRole::Lecturer))
        .unwrap()
        .is_empty());
}
